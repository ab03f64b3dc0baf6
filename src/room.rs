//! Room struct definition
//!
//! Represents a named chat room with its member set and current leader.

use std::collections::BTreeSet;

use crate::types::{ConnectionId, RoomName};

/// Elected leader of a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    pub id: ConnectionId,
    pub username: String,
}

/// Chat room
///
/// A room exists only while it has at least one member. The leader, when
/// set, is always one of the current members.
#[derive(Debug)]
pub struct Room {
    /// Room name for identification
    pub name: RoomName,
    /// Current members
    members: BTreeSet<ConnectionId>,
    /// Current leader
    pub leader: Option<Leader>,
}

impl Room {
    /// Create a new, empty room with no leader
    pub fn new(name: RoomName) -> Self {
        Self {
            name,
            members: BTreeSet::new(),
            leader: None,
        }
    }

    /// Add a member. Returns false if it was already present.
    pub fn add_member(&mut self, id: ConnectionId) -> bool {
        self.members.insert(id)
    }

    /// Remove a member
    ///
    /// Returns true if the room should be deleted (no members left).
    /// A departing leader is cleared; re-election is up to the caller.
    pub fn remove_member(&mut self, id: ConnectionId) -> bool {
        self.members.remove(&id);
        if self.is_led_by(id) {
            self.leader = None;
        }
        self.members.is_empty()
    }

    /// Check if a connection is in this room
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.contains(&id)
    }

    pub fn is_led_by(&self, id: ConnectionId) -> bool {
        self.leader.as_ref().is_some_and(|l| l.id == id)
    }

    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().copied()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
