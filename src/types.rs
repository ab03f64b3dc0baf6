//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ConnectionId`: monotonically issued connection handle
//! - `RoomName`: user-supplied, case-sensitive room name

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque connection handle (newtype pattern)
///
/// Issued once per accepted socket. Handles are never reused, so their
/// ordering doubles as the registration order of connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Issue the next connection handle
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Room name
///
/// Arbitrary text taken verbatim from `/join <name>`. Unlike most user input,
/// it is compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomName(pub String);

impl RoomName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_unique_and_increasing() {
        let id1 = ConnectionId::next();
        let id2 = ConnectionId::next();
        assert_ne!(id1, id2);
        assert!(id1 < id2);
    }

    #[test]
    fn test_room_name_case_sensitive() {
        assert_ne!(RoomName::new("Main"), RoomName::new("main"));
        assert_eq!(RoomName::new("main").to_string(), "main");
    }
}
