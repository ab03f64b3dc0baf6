//! Line protocol definitions
//!
//! Newline-delimited UTF-8 text in both directions. Inbound lines after the
//! username are commands, a quit keyword, or chat text. Outbound replies to
//! commands are single unstamped lines.

use crate::error::AppError;
use crate::types::RoomName;

/// Client → Server line, after registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A `/`-prefixed command
    Command(Command),
    /// `quit` or `exit`
    Quit,
    /// Anything else
    Chat(String),
    /// Whitespace-only line (ignored)
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List all registered usernames
    Users,
    /// Show the current room
    Room,
    /// Join (or create) a room, leaving the current one
    Join(RoomName),
    /// Show the current room's leader
    Leader,
    /// Any other `/`-prefixed text
    Unknown(String),
}

impl Input {
    /// Parse one inbound line
    ///
    /// Surrounding whitespace is ignored. `/join` takes the rest of the line,
    /// trimmed, as the room name and fails if it is empty.
    pub fn parse(line: &str) -> Result<Self, AppError> {
        let line = line.trim();

        if line.is_empty() {
            return Ok(Input::Blank);
        }
        if line == "quit" || line == "exit" {
            return Ok(Input::Quit);
        }
        if !line.starts_with('/') {
            return Ok(Input::Chat(line.to_string()));
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        let command = match (word, rest) {
            ("/users", "") => Command::Users,
            ("/room", "") => Command::Room,
            ("/leader", "") => Command::Leader,
            ("/join", "") => return Err(AppError::MissingRoomName),
            ("/join", name) => Command::Join(RoomName::new(name)),
            _ => Command::Unknown(line.to_string()),
        };
        Ok(Input::Command(command))
    }
}

/// Server → Client reply (sent unstamped to one connection)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Sent once the username is accepted
    Welcome,
    /// `/users`
    Users(Vec<String>),
    /// `/room` while in a room
    InRoom(RoomName),
    /// `/room` while unaffiliated
    NotInRoom,
    /// `/leader` while in a room
    Leader { room: RoomName, username: String },
    /// `/leader` while unaffiliated
    NoLeader,
    /// `/join` without a room name
    JoinUsage,
    /// Unrecognized command
    UnknownCommand,
    /// Any other rejected request
    Error(String),
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Welcome => f.write_str("Welcome to the chat server!"),
            Reply::Users(names) => write!(f, "Users: {}", names.join(", ")),
            Reply::InRoom(room) => write!(f, "You are in room {}", room),
            Reply::NotInRoom => f.write_str("You are not in any room"),
            Reply::Leader { room, username } => write!(f, "Leader of room {}: {}", room, username),
            Reply::NoLeader => f.write_str("No leader (join a room first)"),
            Reply::JoinUsage => f.write_str("Usage: /join <room>"),
            Reply::UnknownCommand => f.write_str("Unknown command"),
            Reply::Error(message) => f.write_str(message),
        }
    }
}

/// Convert AppError to a Reply for client notification
impl From<&AppError> for Reply {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::MissingRoomName => Reply::JoinUsage,
            AppError::EmptyUsername => Reply::Error("Username must not be empty".to_string()),
            // Internal failures are not described to clients
            _ => Reply::Error("Internal error".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Input {
        Input::parse(line).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("/users"), Input::Command(Command::Users));
        assert_eq!(parse("/room\r"), Input::Command(Command::Room));
        assert_eq!(parse("  /leader "), Input::Command(Command::Leader));
        assert_eq!(
            parse("/join  main hall "),
            Input::Command(Command::Join(RoomName::new("main hall")))
        );
    }

    #[test]
    fn test_parse_join_without_name() {
        assert!(matches!(Input::parse("/join"), Err(AppError::MissingRoomName)));
        assert!(matches!(Input::parse("/join   "), Err(AppError::MissingRoomName)));
    }

    #[test]
    fn test_parse_unknown_commands() {
        assert_eq!(
            parse("/dance now"),
            Input::Command(Command::Unknown("/dance now".to_string()))
        );
        assert_eq!(
            parse("/joinmain"),
            Input::Command(Command::Unknown("/joinmain".to_string()))
        );
        assert_eq!(
            parse("/users extra"),
            Input::Command(Command::Unknown("/users extra".to_string()))
        );
    }

    #[test]
    fn test_parse_quit_is_exact() {
        assert_eq!(parse("quit"), Input::Quit);
        assert_eq!(parse("exit\n"), Input::Quit);
        assert_eq!(parse("Quit"), Input::Chat("Quit".to_string()));
        assert_eq!(parse("exit now"), Input::Chat("exit now".to_string()));
    }

    #[test]
    fn test_parse_chat_and_blank() {
        assert_eq!(parse("  hello world "), Input::Chat("hello world".to_string()));
        assert_eq!(parse(" \t "), Input::Blank);
    }

    #[test]
    fn test_reply_text() {
        assert_eq!(
            Reply::Users(vec!["a".to_string(), "b".to_string()]).to_string(),
            "Users: a, b"
        );
        assert_eq!(
            Reply::Leader {
                room: RoomName::new("main"),
                username: "B".to_string()
            }
            .to_string(),
            "Leader of room main: B"
        );
        assert_eq!(Reply::NoLeader.to_string(), "No leader (join a room first)");
        assert_eq!(Reply::from(&AppError::MissingRoomName), Reply::JoinUsage);
    }
}
