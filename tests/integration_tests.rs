//! Integration tests for the match server over real loopback UDP sockets.

use server::network::Server;
use server::session::SessionConfig;
use shared::{Coord, Direction, GameEnd, Map, Message, Player, Role};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

const TEST_MAP: &str = "\
WWWWWWWWWWWW
WCFFFFFFFFSW
WPPPPPPPPPPW
WPPPPPPPPPPW
WPPPPPPPPPPW
WPPPPPPPPPPW
WWWWWWWWWWWW
";

async fn start_server(config: SessionConfig) -> SocketAddr {
    let map = Map::parse(TEST_MAP).unwrap();
    let mut server = Server::new("127.0.0.1:0", map, Duration::from_millis(20), config)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

fn fast_end() -> SessionConfig {
    SessionConfig {
        end_broadcasts: 2,
        end_interval: Duration::from_millis(50),
    }
}

struct TestClient {
    socket: UdpSocket,
    server: SocketAddr,
}

impl TestClient {
    async fn new(server: SocketAddr) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        Self { socket, server }
    }

    async fn send(&self, message: Message) {
        let data = message.encode().unwrap();
        tokio_test::assert_ok!(self.socket.send_to(&data, self.server).await);
    }

    async fn recv(&self) -> Message {
        let mut buf = [0u8; 1024];
        let (len, _) = timeout(Duration::from_secs(2), self.socket.recv_from(&mut buf))
            .await
            .expect("timed out waiting for server")
            .unwrap();
        Message::decode(&buf[..len]).unwrap()
    }

    async fn recv_state(&self) -> shared::GameStateUpdate {
        match self.recv().await {
            Message::GameStateUpdate(update) => update,
            other => panic!("Expected state update, got {:?}", other),
        }
    }

    async fn join(&self, role: Role) -> Message {
        self.send(Message::join(role)).await;
        self.recv().await
    }
}

/// Watcher, Cman and Spirit join; the match starts and a move reaches everyone.
#[tokio::test]
async fn match_starts_and_moves_are_broadcast() {
    let server = start_server(SessionConfig::default()).await;
    let watcher = TestClient::new(server).await;
    let cman = TestClient::new(server).await;
    let spirit = TestClient::new(server).await;

    assert!(matches!(
        watcher.join(Role::Watcher).await,
        Message::GameStateUpdate(_)
    ));
    let idle = match cman.join(Role::Cman).await {
        Message::GameStateUpdate(update) => update,
        other => panic!("Unexpected {:?}", other),
    };
    assert_eq!(idle.freeze, 1);

    spirit.send(Message::join(Role::Spirit)).await;
    for client in [&watcher, &cman, &spirit] {
        let state = client.recv_state().await;
        assert_eq!(state.attempts, 0);
        assert_eq!(state.collected, 0);
        assert_eq!(state.cman, Coord::new(1, 1));
        assert_eq!(state.spirit, Coord::new(1, 10));
    }

    cman.send(Message::movement(Direction::Down)).await;
    for (client, freeze) in [(&watcher, 1), (&cman, 0), (&spirit, 0)] {
        let state = client.recv_state().await;
        assert_eq!(state.cman, Coord::new(2, 1));
        assert_eq!(state.collected, 1);
        assert_eq!(state.freeze, freeze);
    }

    let late = TestClient::new(server).await;
    assert_eq!(
        late.join(Role::Cman).await,
        Message::error("game has already started")
    );
}

/// A second Cman is turned away while the match is idle.
#[tokio::test]
async fn role_is_taken() {
    let server = start_server(SessionConfig::default()).await;
    let first = TestClient::new(server).await;
    let second = TestClient::new(server).await;

    first.join(Role::Cman).await;
    assert_eq!(second.join(Role::Cman).await, Message::error("role is taken"));

    first.send(Message::Quit).await;
    assert!(matches!(
        second.join(Role::Cman).await,
        Message::GameStateUpdate(_)
    ));
}

/// Cman quitting mid-match hands Spirit the win, then the server resets.
#[tokio::test]
async fn quit_forces_win_and_reset() {
    let server = start_server(fast_end()).await;
    let watcher = TestClient::new(server).await;
    let cman = TestClient::new(server).await;
    let spirit = TestClient::new(server).await;

    watcher.join(Role::Watcher).await;
    cman.join(Role::Cman).await;
    spirit.send(Message::join(Role::Spirit)).await;
    for client in [&watcher, &cman, &spirit] {
        client.recv_state().await;
    }

    cman.send(Message::Quit).await;
    let expected = Message::GameEnd(GameEnd::new(Player::Spirit, 0, 0));
    for _ in 0..2 {
        assert_eq!(spirit.recv().await, expected);
        assert_eq!(watcher.recv().await, expected);
    }

    // Only the watcher survives the reset.
    let reset = watcher.recv_state().await;
    assert_eq!(reset.freeze, 1);
    assert_eq!(reset.cman, Coord::new(1, 1));

    assert!(matches!(
        spirit.join(Role::Spirit).await,
        Message::GameStateUpdate(_)
    ));
}

/// Junk datagrams are dropped without disturbing the loop.
#[tokio::test]
async fn malformed_datagrams_are_ignored() {
    let server = start_server(SessionConfig::default()).await;
    let client = TestClient::new(server).await;

    for junk in [&[0x42u8][..], &[0x00, 1, 2][..], &[0x80, 0][..]] {
        client.socket.send_to(junk, server).await.unwrap();
    }
    client.send(Message::JoinRequest { role: 1 }).await;
    assert!(matches!(client.recv().await, Message::GameStateUpdate(_)));
}

/// A joined player that sends junk loses its slot.
#[tokio::test]
async fn malformed_datagram_frees_player_slot() {
    let server = start_server(SessionConfig::default()).await;
    let broken = TestClient::new(server).await;
    let next = TestClient::new(server).await;

    broken.join(Role::Cman).await;
    broken.socket.send_to(&[0x80], server).await.unwrap();

    assert!(matches!(
        next.join(Role::Cman).await,
        Message::GameStateUpdate(_)
    ));
}

/// Out-of-range request bytes get an Error reply rather than silence.
#[tokio::test]
async fn invalid_role_gets_error() {
    let server = start_server(SessionConfig::default()).await;
    let client = TestClient::new(server).await;

    client.socket.send_to(&[0x00, 5], server).await.unwrap();
    assert_eq!(client.recv().await, Message::error("role does not exist"));
}
