//! Broadcast dispatcher
//!
//! Formats outgoing lines and routes them to one connection, one room, or
//! every registered connection. Delivery is best effort: a closed channel is
//! logged and skipped, and the owning handler reports the disconnect.

use std::sync::Arc;

use tracing::warn;

use crate::clock::Clock;
use crate::connection::Connection;
use crate::directory::RoomDirectory;
use crate::registry::Registry;
use crate::types::{ConnectionId, RoomName};

pub struct Dispatcher {
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// `[HH:MM:SS] <username>: <message>`
    pub fn chat_line(&self, username: &str, message: &str) -> String {
        format!("[{}] {}: {}", self.clock.stamp(), username, message)
    }

    /// `[HH:MM:SS] <username> joined the room`
    pub fn join_line(&self, username: &str) -> String {
        format!("[{}] {} joined the room", self.clock.stamp(), username)
    }

    /// `[HH:MM:SS] <username> left the room <room>`
    pub fn leave_line(&self, username: &str, room: &RoomName) -> String {
        format!("[{}] {} left the room {}", self.clock.stamp(), username, room)
    }

    /// Send `text` to every member of `room` except `exclude`
    ///
    /// Returns the number of members the line was queued for.
    pub fn to_room(
        &self,
        registry: &Registry,
        directory: &RoomDirectory,
        room: &RoomName,
        text: &str,
        exclude: Option<ConnectionId>,
    ) -> usize {
        directory
            .members(room)
            .into_iter()
            .filter(|id| Some(*id) != exclude)
            .filter_map(|id| registry.get(id))
            .filter(|conn| deliver(conn, text))
            .count()
    }

    /// Send `text` to every registered connection regardless of room
    pub fn to_all(&self, registry: &Registry, text: &str) -> usize {
        registry
            .registered()
            .filter(|conn| deliver(conn, text))
            .count()
    }

    /// Send `text` to exactly one connection
    pub fn to_one(&self, registry: &Registry, id: ConnectionId, text: &str) -> bool {
        registry.get(id).is_some_and(|conn| deliver(conn, text))
    }
}

fn deliver(conn: &Connection, text: &str) -> bool {
    match conn.send(text) {
        Ok(()) => true,
        Err(e) => {
            warn!("Dropping line for {} ({}): {}", conn.id, conn.display_name(), e);
            false
        }
    }
}
