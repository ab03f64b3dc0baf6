//! TCP connection handler
//!
//! Handles individual sockets: splits the stream into newline-delimited
//! lines for the ChatServer and writes back whatever the ChatServer queues
//! for this connection.

use std::time::Instant;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::server::ServerCommand;
use crate::types::ConnectionId;

/// Handle a new TCP connection
///
/// Registers the socket with the ChatServer, then forwards inbound lines and
/// writes outbound lines until the peer goes away, an I/O error occurs, or
/// the ChatServer drops the connection (quit, rejected username, shutdown).
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    // Chat lines are small; don't hold them back for coalescing
    stream.set_nodelay(true)?;

    let id = ConnectionId::next();
    let connected_at = Instant::now();
    info!("Connection {} accepted from {}", id, peer_addr);

    // Channel for server -> socket lines
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();

    cmd_tx
        .send(ServerCommand::Connect {
            id,
            connected_at,
            sender: line_tx,
        })
        .await
        .map_err(|_| AppError::ChannelSend)?;

    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        tokio::select! {
            inbound = lines.next_line() => match inbound {
                Ok(Some(line)) => {
                    if cmd_tx.send(ServerCommand::Line { id, line }).await.is_err() {
                        debug!("Server closed, ending connection {}", id);
                        break;
                    }
                }
                Ok(None) => {
                    debug!("Connection {} closed by peer", id);
                    break;
                }
                Err(e) => {
                    warn!("Read error on connection {}: {}", id, e);
                    break;
                }
            },
            outbound = line_rx.recv() => match outbound {
                Some(line) => {
                    if let Err(e) = write_line(&mut writer, &line).await {
                        warn!("Write error on connection {}: {}", id, e);
                        break;
                    }
                }
                None => {
                    debug!("Connection {} closed by server", id);
                    break;
                }
            },
        }
    }

    // Removal is idempotent, so this is safe even after a server-side close
    let _ = cmd_tx.send(ServerCommand::Disconnect { id }).await;
    let _ = writer.shutdown().await;

    info!("Connection {} from {} disconnected", id, peer_addr);

    Ok(())
}

/// Write one newline-terminated line
async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
