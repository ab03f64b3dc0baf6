//! Room directory
//!
//! Maps room names to rooms and connections to their current room. Rooms are
//! created on first join and deleted when their last member leaves.

use std::collections::HashMap;

use tracing::debug;

use crate::elector::elect;
use crate::registry::Registry;
use crate::room::{Leader, Room};
use crate::types::{ConnectionId, RoomName};

/// Result of leaving a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Room that was left
    pub room: RoomName,
    /// Whether the departing connection led the room
    pub was_leader: bool,
    /// Leader after the departure (None if the room was deleted)
    pub new_leader: Option<String>,
    /// Whether the room was deleted because it became empty
    pub room_closed: bool,
}

/// Result of joining a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    /// Previous room, left before joining
    pub left: Option<Departure>,
    /// Room that was joined
    pub room: RoomName,
    /// Whether the join created the room
    pub created: bool,
    /// Leader after the join
    pub leader: Option<String>,
}

#[derive(Debug, Default)]
pub struct RoomDirectory {
    /// All live rooms: RoomName -> Room
    rooms: HashMap<RoomName, Room>,
    /// Connection to room mapping: ConnectionId -> RoomName
    memberships: HashMap<ConnectionId, RoomName>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a connection into `room`
    ///
    /// Any current room is fully left first (including re-election), even when
    /// it has the same name. The election then runs over the new member set:
    /// an existing leader is kept unless the joiner connected earlier.
    pub fn join(&mut self, id: ConnectionId, room: RoomName, registry: &Registry) -> Arrival {
        let left = self.leave(id, registry);

        let created = !self.rooms.contains_key(&room);
        let entry = self
            .rooms
            .entry(room.clone())
            .or_insert_with(|| Room::new(room.clone()));
        entry.add_member(id);
        self.memberships.insert(id, room.clone());

        entry.leader = elect_from(entry, registry);
        let leader = entry.leader.as_ref().map(|l| l.username.clone());

        debug!("Room {} now has {} members", room, entry.member_count());

        Arrival {
            left,
            room,
            created,
            leader,
        }
    }

    /// Remove a connection from its current room
    ///
    /// Returns None if the connection had no room.
    pub fn leave(&mut self, id: ConnectionId, registry: &Registry) -> Option<Departure> {
        let name = self.memberships.remove(&id)?;
        let room = self.rooms.get_mut(&name)?;

        let was_leader = room.is_led_by(id);
        if room.remove_member(id) {
            self.rooms.remove(&name);
            debug!("Room {} deleted (empty)", name);
            return Some(Departure {
                room: name,
                was_leader,
                new_leader: None,
                room_closed: true,
            });
        }

        if was_leader {
            room.leader = elect_from(room, registry);
        }

        Some(Departure {
            new_leader: room.leader.as_ref().map(|l| l.username.clone()),
            room: name,
            was_leader,
            room_closed: false,
        })
    }

    pub fn current_room(&self, id: ConnectionId) -> Option<&RoomName> {
        self.memberships.get(&id)
    }

    /// Leader username of `room`, or None if the room does not exist
    pub fn leader_of(&self, room: &RoomName) -> Option<&str> {
        self.rooms
            .get(room)
            .and_then(|r| r.leader.as_ref())
            .map(|l| l.username.as_str())
    }

    pub fn room(&self, room: &RoomName) -> Option<&Room> {
        self.rooms.get(room)
    }

    /// Member handles of `room` (empty if the room does not exist)
    pub fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|r| r.members().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

/// Run the election over a room's members as currently registered
fn elect_from(room: &Room, registry: &Registry) -> Option<Leader> {
    let winner = elect(room.members().filter_map(|id| registry.get(id)))?;
    Some(Leader {
        id: winner.id,
        username: winner.display_name().to_string(),
    })
}
