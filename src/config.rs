//! Server configuration
//!
//! The bind address comes from the first command-line argument, then the
//! `CHAT_SERVER_ADDR` environment variable, then the default.

use std::env;

/// Default server address
pub const DEFAULT_ADDR: &str = "0.0.0.0:7777";

/// Environment variable overriding the bind address
pub const ADDR_ENV_VAR: &str = "CHAT_SERVER_ADDR";

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "room_chat_server=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl ServerConfig {
    /// Build the config from the process arguments and environment
    pub fn from_env() -> Self {
        Self::resolve(env::args().nth(1), env::var(ADDR_ENV_VAR).ok())
    }

    fn resolve(arg: Option<String>, env_addr: Option<String>) -> Self {
        let addr = arg
            .or(env_addr)
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        Self { addr }
    }
}
