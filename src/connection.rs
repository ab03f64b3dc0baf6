//! Connection struct definition
//!
//! Represents one accepted socket with its identity and outbound channel.

use std::time::Instant;

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::types::ConnectionId;

/// Connected peer information
///
/// Holds the handle, the username (set once by registration), the instant the
/// socket was accepted, and the channel feeding the socket's writer.
#[derive(Debug)]
pub struct Connection {
    /// Handle issued at accept time
    pub id: ConnectionId,
    /// Username (None while awaiting the first line)
    pub username: Option<String>,
    /// Monotonic accept instant, used for leader election
    pub connected_at: Instant,
    /// Server → socket line channel
    pub sender: mpsc::UnboundedSender<String>,
}

impl Connection {
    /// Create a new, unregistered connection
    pub fn new(id: ConnectionId, connected_at: Instant, sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id,
            username: None,
            connected_at,
            sender,
        }
    }

    /// Queue one line for this connection
    ///
    /// The trailing newline is appended by the socket writer.
    pub fn send(&self, line: impl Into<String>) -> Result<(), SendError> {
        self.sender
            .send(line.into())
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Get the display name for this connection
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("Unknown")
    }

    /// Check if the first line (username) has been received
    pub fn is_registered(&self) -> bool {
        self.username.is_some()
    }
}
