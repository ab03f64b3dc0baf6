//! ChatServer Actor implementation
//!
//! The central actor that owns all state: the connection registry, the room
//! directory and the dispatcher. Connection handlers reach it only through
//! the command channel, so every join/leave/elect sequence runs to completion
//! before the next command is looked at.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::directory::RoomDirectory;
use crate::dispatcher::Dispatcher;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::protocol::{Command, Input, Reply};
use crate::registry::Registry;
use crate::types::{ConnectionId, RoomName};

/// Channel buffer size for server commands
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New socket accepted
    Connect {
        id: ConnectionId,
        connected_at: Instant,
        sender: mpsc::UnboundedSender<String>,
    },
    /// One line read from a socket
    Line { id: ConnectionId, line: String },
    /// Socket closed or failed
    Disconnect { id: ConnectionId },
    /// Close every connection and stop
    Shutdown,
}

/// Whether the actor keeps running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// The main ChatServer actor
pub struct ChatServer {
    registry: Registry,
    directory: RoomDirectory,
    dispatcher: Dispatcher,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer stamping lines with local time
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self::with_clock(receiver, Arc::new(SystemClock))
    }

    pub fn with_clock(receiver: mpsc::Receiver<ServerCommand>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: Registry::new(),
            directory: RoomDirectory::new(),
            dispatcher: Dispatcher::new(clock),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Processes commands until `Shutdown` arrives or all senders are dropped,
    /// then closes whatever connections remain.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            if self.handle_command(cmd) == Flow::Stop {
                break;
            }
        }

        self.close_all();
        info!("ChatServer shutting down");
    }

    /// Process a single command
    pub fn handle_command(&mut self, cmd: ServerCommand) -> Flow {
        match cmd {
            ServerCommand::Connect {
                id,
                connected_at,
                sender,
            } => {
                self.handle_connect(id, connected_at, sender);
            }
            ServerCommand::Line { id, line } => {
                self.handle_line(id, &line);
            }
            ServerCommand::Disconnect { id } => {
                self.close(id);
            }
            ServerCommand::Shutdown => {
                info!("Shutdown requested, closing {} connections", self.registry.len());
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.directory
    }

    /// Handle a freshly accepted socket (awaiting its username)
    fn handle_connect(&mut self, id: ConnectionId, connected_at: Instant, sender: mpsc::UnboundedSender<String>) {
        self.registry.accept(id, connected_at, sender);
        debug!(
            "Total connections: {}, Total rooms: {}",
            self.registry.len(),
            self.directory.room_count()
        );
    }

    fn handle_line(&mut self, id: ConnectionId, line: &str) {
        let Some(conn) = self.registry.get(id) else {
            // Lines may still arrive after the connection was closed
            return;
        };

        if !conn.is_registered() {
            self.handle_register(id, line);
            return;
        }

        debug!("Received from {}: {}", id, line);

        match Input::parse(line) {
            Ok(Input::Blank) => {}
            Ok(Input::Quit) => self.close(id),
            Ok(Input::Chat(text)) => self.handle_chat(id, &text),
            Ok(Input::Command(command)) => self.handle_command_line(id, command),
            Err(e) => {
                warn!("Rejected input from {}: {}", id, e);
                self.reply(id, Reply::from(&e));
            }
        }
    }

    /// First line: username
    fn handle_register(&mut self, id: ConnectionId, line: &str) {
        match self.registry.register(id, line) {
            Ok(username) => {
                info!("Connection {} registered as '{}'", id, username);
                self.reply(id, Reply::Welcome);
            }
            Err(e) => {
                warn!("Closing connection {}: {}", id, e);
                self.reply(id, Reply::from(&e));
                self.close(id);
            }
        }
    }

    fn handle_command_line(&mut self, id: ConnectionId, command: Command) {
        match command {
            Command::Users => {
                let users = self.registry.list_usernames();
                self.reply(id, Reply::Users(users));
            }
            Command::Room => {
                let reply = match self.directory.current_room(id) {
                    Some(room) => Reply::InRoom(room.clone()),
                    None => Reply::NotInRoom,
                };
                self.reply(id, reply);
            }
            Command::Join(room) => self.handle_join(id, room),
            Command::Leader => {
                let reply = self
                    .directory
                    .current_room(id)
                    .and_then(|room| {
                        self.directory.leader_of(room).map(|username| Reply::Leader {
                            room: room.clone(),
                            username: username.to_string(),
                        })
                    })
                    .unwrap_or(Reply::NoLeader);
                self.reply(id, reply);
            }
            Command::Unknown(text) => {
                debug!("Unknown command from {}: {}", id, text);
                self.reply(id, Reply::UnknownCommand);
            }
        }
    }

    /// `/join <room>`: leave the current room (if any), then join
    fn handle_join(&mut self, id: ConnectionId, room: RoomName) {
        let username = self.username(id);
        let arrival = self.directory.join(id, room, &self.registry);

        if let Some(departure) = &arrival.left {
            info!("{} left room {}", username, departure.room);
            let line = self.dispatcher.leave_line(&username, &departure.room);
            self.dispatcher.to_all(&self.registry, &line);
            if departure.was_leader {
                log_leader(&departure.room, departure.new_leader.as_deref());
            }
        }

        info!("{} joined room {}", username, arrival.room);
        if let Some(leader) = &arrival.leader {
            debug!("Leader of room {} is {}", arrival.room, leader);
        }

        let line = self.dispatcher.join_line(&username);
        self.dispatcher
            .to_room(&self.registry, &self.directory, &arrival.room, &line, None);
    }

    /// Chat text goes to the rest of the sender's room; without a room it is
    /// dropped.
    fn handle_chat(&mut self, id: ConnectionId, text: &str) {
        let Some(room) = self.directory.current_room(id) else {
            debug!("Dropping chat from {} (no room)", id);
            return;
        };

        let line = self.dispatcher.chat_line(&self.username(id), text);
        self.dispatcher
            .to_room(&self.registry, &self.directory, room, &line, Some(id));
    }

    /// Close a connection: leave its room, drop it from the registry, and
    /// tell everyone still connected. Closing twice is a no-op.
    fn close(&mut self, id: ConnectionId) {
        let departure = self.directory.leave(id, &self.registry);
        let Some(conn) = self.registry.remove(id) else {
            return;
        };

        info!("Connection {} ({}) closed", id, conn.display_name());

        if let Some(departure) = departure {
            let line = self
                .dispatcher
                .leave_line(conn.display_name(), &departure.room);
            self.dispatcher.to_all(&self.registry, &line);
            if departure.was_leader {
                log_leader(&departure.room, departure.new_leader.as_deref());
            }
        }

        debug!(
            "Total connections: {}, Total rooms: {}",
            self.registry.len(),
            self.directory.room_count()
        );
    }

    fn close_all(&mut self) {
        for id in self.registry.ids() {
            self.close(id);
        }
    }

    fn reply(&self, id: ConnectionId, reply: Reply) {
        self.dispatcher.to_one(&self.registry, id, &reply.to_string());
    }

    fn username(&self, id: ConnectionId) -> String {
        self.registry
            .get(id)
            .map(|c| c.display_name().to_string())
            .unwrap_or_default()
    }
}

fn log_leader(room: &RoomName, leader: Option<&str>) {
    match leader {
        Some(leader) => info!("Leader of room {} is now {}", room, leader),
        None => info!("Room {} closed", room),
    }
}

/// Accept connections until `shutdown` resolves, then close them all
///
/// Spawns the ChatServer actor and one handler task per accepted socket.
pub async fn serve<F>(listener: TcpListener, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()>,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let server = tokio::spawn(ChatServer::new(cmd_rx).run());

    tokio::pin!(shutdown);

    // Connection accept loop
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!("New connection from {}", addr);
                    let cmd_tx = cmd_tx.clone();

                    // Spawn handler task for each connection
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, cmd_tx).await {
                            error!("Connection handler error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    drop(listener);
    cmd_tx
        .send(ServerCommand::Shutdown)
        .await
        .map_err(|_| AppError::ChannelSend)?;
    drop(cmd_tx);

    if let Err(e) = server.await {
        error!("ChatServer task failed: {}", e);
    }
    Ok(())
}
