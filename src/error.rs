//! Error types for the chat server
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::ConnectionId;

/// Application-level errors
///
/// Covers both fatal errors (startup or connection termination) and
/// protocol-input errors (answered with a one-line reply).
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on a single connection (fatal for that connection only)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The listening socket could not be bound (fatal for the process)
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Channel send error (fatal - coordinator is gone)
    #[error("Channel send error")]
    ChannelSend,

    /// First line was empty or whitespace-only
    #[error("Username must not be empty")]
    EmptyUsername,

    /// `/join` was sent without a room name
    #[error("Missing room name")]
    MissingRoomName,

    /// Connection handle is not in the registry
    #[error("Unknown connection {0}")]
    UnknownConnection(ConnectionId),
}

/// Message send errors
///
/// Occurs when attempting to send lines through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
