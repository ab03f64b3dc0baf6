//! Connection registry
//!
//! Owns every live connection, keyed by handle. Iteration follows handle
//! order, which is the order connections were accepted.

use std::collections::BTreeMap;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::debug;

use crate::connection::Connection;
use crate::error::AppError;
use crate::types::ConnectionId;

/// All live connections: ConnectionId -> Connection
#[derive(Debug, Default)]
pub struct Registry {
    connections: BTreeMap<ConnectionId, Connection>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly accepted, not yet registered connection
    pub fn accept(&mut self, id: ConnectionId, connected_at: Instant, sender: mpsc::UnboundedSender<String>) {
        self.connections
            .insert(id, Connection::new(id, connected_at, sender));
        debug!("Registry holds {} connections", self.connections.len());
    }

    /// Interpret the first line of a connection as its username
    ///
    /// The line is trimmed; an empty result is rejected. Usernames are not
    /// required to be unique.
    pub fn register(&mut self, id: ConnectionId, first_line: &str) -> Result<String, AppError> {
        let conn = self
            .connections
            .get_mut(&id)
            .ok_or(AppError::UnknownConnection(id))?;

        let username = first_line.trim();
        if username.is_empty() {
            return Err(AppError::EmptyUsername);
        }

        conn.username = Some(username.to_string());
        Ok(username.to_string())
    }

    /// Drop a connection. Removing an unknown handle is a no-op.
    ///
    /// Room membership is not touched here; callers leave the room first.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.remove(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Usernames of registered connections, in accept order
    pub fn list_usernames(&self) -> Vec<String> {
        self.connections
            .values()
            .filter_map(|c| c.username.clone())
            .collect()
    }

    /// Registered connections, in accept order
    pub fn registered(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(|c| c.is_registered())
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(registry: &mut Registry) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConnectionId::next();
        registry.accept(id, Instant::now(), tx);
        (id, rx)
    }

    #[test]
    fn test_register_trims_username() {
        let mut registry = Registry::new();
        let (id, _rx) = accept(&mut registry);

        assert_eq!(registry.register(id, "  alice \r").unwrap(), "alice");
        assert_eq!(registry.get(id).unwrap().display_name(), "alice");
    }

    #[test]
    fn test_register_rejects_blank() {
        let mut registry = Registry::new();
        let (id, _rx) = accept(&mut registry);

        assert!(matches!(registry.register(id, "   "), Err(AppError::EmptyUsername)));
        assert!(!registry.get(id).unwrap().is_registered());
    }

    #[test]
    fn test_register_unknown_connection() {
        let mut registry = Registry::new();
        let id = ConnectionId::next();

        assert!(matches!(
            registry.register(id, "alice"),
            Err(AppError::UnknownConnection(_))
        ));
    }

    #[test]
    fn test_list_usernames_skips_unregistered_and_allows_duplicates() {
        let mut registry = Registry::new();
        let (a, _ra) = accept(&mut registry);
        let (_pending, _rp) = accept(&mut registry);
        let (b, _rb) = accept(&mut registry);

        registry.register(a, "alice").unwrap();
        registry.register(b, "alice").unwrap();

        assert_eq!(registry.list_usernames(), vec!["alice", "alice"]);
        assert_eq!(registry.registered().count(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = Registry::new();
        let (id, _rx) = accept(&mut registry);

        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert!(registry.is_empty());
    }
}
