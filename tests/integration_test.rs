//! End-to-end tests over real TCP sockets.

use std::net::SocketAddr;
use std::time::Duration;

use room_chat_server::serve;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr, username: &str) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        let mut client = Self {
            lines: BufReader::new(reader).lines(),
            writer,
        };
        client.send(username).await;
        assert_eq!(client.recv().await, "Welcome to the chat server!");
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn recv(&mut self) -> String {
        timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("connection closed")
    }

    /// Next line with the `[HH:MM:SS] ` stamp checked and removed
    async fn recv_stamped(&mut self) -> String {
        let line = self.recv().await;
        let (stamp, body) = line.split_at(11);
        let bytes = stamp.as_bytes();
        assert_eq!(bytes[0], b'[', "bad stamp in {line:?}");
        assert_eq!(&stamp[9..], "] ", "bad stamp in {line:?}");
        assert_eq!(bytes[3], b':');
        assert_eq!(bytes[6], b':');
        body.to_string()
    }

    async fn expect_closed(&mut self) {
        let next = timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for close");
        assert!(matches!(next, Ok(None) | Err(_)), "expected close, got {next:?}");
    }
}

async fn start() -> (SocketAddr, oneshot::Sender<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        serve(listener, async {
            let _ = stop_rx.await;
        })
        .await
        .unwrap();
    });
    (addr, stop_tx, server)
}

#[tokio::test]
async fn test_room_chat_and_leader_failover() {
    let (addr, stop, server) = start().await;

    let mut a = TestClient::connect(addr, "A").await;
    let mut b = TestClient::connect(addr, "B").await;
    let mut c = TestClient::connect(addr, "C").await;

    a.send("/join main").await;
    assert_eq!(a.recv_stamped().await, "A joined the room");
    b.send("/join main").await;
    assert_eq!(a.recv_stamped().await, "B joined the room");
    assert_eq!(b.recv_stamped().await, "B joined the room");
    c.send("/join main").await;
    for client in [&mut a, &mut b, &mut c] {
        assert_eq!(client.recv_stamped().await, "C joined the room");
    }

    c.send("/leader").await;
    assert_eq!(c.recv().await, "Leader of room main: A");

    b.send("hello room").await;
    assert_eq!(a.recv_stamped().await, "B: hello room");
    assert_eq!(c.recv_stamped().await, "B: hello room");

    drop(a);
    assert_eq!(b.recv_stamped().await, "A left the room main");
    assert_eq!(c.recv_stamped().await, "A left the room main");

    c.send("/leader").await;
    assert_eq!(c.recv().await, "Leader of room main: B");

    c.send("/users").await;
    assert_eq!(c.recv().await, "Users: B, C");

    stop.send(()).unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_empty_username_is_rejected() {
    let (addr, stop, server) = start().await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    writer.write_all(b"   \n").await.unwrap();

    let reply = timeout(WAIT, lines.next_line()).await.unwrap().unwrap();
    assert_eq!(reply.as_deref(), Some("Username must not be empty"));
    let mut client = TestClient { lines, writer };
    client.expect_closed().await;

    stop.send(()).unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_quit_and_shutdown_close_connections() {
    let (addr, stop, server) = start().await;

    let mut a = TestClient::connect(addr, "A").await;
    let mut b = TestClient::connect(addr, "B").await;

    a.send("/join lobby").await;
    assert_eq!(a.recv_stamped().await, "A joined the room");

    a.send("quit").await;
    a.expect_closed().await;
    assert_eq!(b.recv_stamped().await, "A left the room lobby");

    // Unaffiliated chat is dropped; the next reply is the command's
    b.send("is anyone here").await;
    b.send("/room").await;
    assert_eq!(b.recv().await, "You are not in any room");

    stop.send(()).unwrap();
    b.expect_closed().await;
    server.await.unwrap();
}
