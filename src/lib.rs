//! Multi-room TCP Chat Server Library
//!
//! A line-oriented chat server built on tokio using the Actor pattern for
//! state management.
//!
//! # Features
//! - Username registration from the first line
//! - Named rooms created on first join, removed when empty
//! - Deterministic per-room leader (earliest connection wins)
//! - Timestamped chat, join and leave notifications
//! - `/users`, `/room`, `/join <room>`, `/leader` commands
//! - Graceful shutdown
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the registry, rooms and dispatcher
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use room_chat_server::serve;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:7777").await.unwrap();
//!     serve(listener, async { tokio::signal::ctrl_c().await.ok(); }).await.unwrap();
//! }
//! ```

pub mod clock;
pub mod config;
pub mod connection;
pub mod directory;
pub mod dispatcher;
pub mod elector;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod room;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ServerConfig;
pub use connection::Connection;
pub use directory::RoomDirectory;
pub use error::{AppError, SendError};
pub use handler::handle_connection;
pub use protocol::{Command, Input, Reply};
pub use registry::Registry;
pub use room::Room;
pub use server::{serve, ChatServer, ServerCommand};
pub use types::{ConnectionId, RoomName};
