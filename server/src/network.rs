//! Server network layer: one UDP socket, one loop, no background tasks

use crate::session::{Outgoing, Session, SessionConfig};
use log::{error, info, warn};
use shared::protocol::MAX_DATAGRAM_LEN;
use shared::Map;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::{interval, MissedTickBehavior};

/// Default receive timeout, which is also the freeze/sync tick
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// What woke the loop up
#[derive(Debug)]
enum Event {
    Datagram { len: usize, addr: SocketAddr },
    ReceiveFailed(std::io::Error),
    Tick,
}

/// Match server: owns the socket and the session it drives
pub struct Server {
    socket: UdpSocket,
    session: Session,
    tick_duration: Duration,
}

impl Server {
    pub async fn new(
        addr: &str,
        map: Map,
        tick_duration: Duration,
        config: SessionConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind(addr).await?;
        info!("Server listening on {}", socket.local_addr()?);

        Ok(Server {
            socket,
            session: Session::new(Arc::new(map), config),
            tick_duration,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Sends queued datagrams. A peer whose send fails is dropped as if it had
    /// quit, and whatever that triggers is sent as well.
    async fn dispatch(&mut self, outgoing: Vec<Outgoing>) {
        let mut queue = VecDeque::from(outgoing);

        while let Some(Outgoing { addr, message }) = queue.pop_front() {
            let data = match message.encode() {
                Ok(data) => data,
                Err(e) => {
                    error!("Failed to encode {:?} for {}: {}", message, addr, e);
                    continue;
                }
            };

            if let Err(e) = self.socket.send_to(&data, addr).await {
                warn!("Failed to send to {}: {}, dropping client", addr, e);
                queue.retain(|pending| pending.addr != addr);
                queue.extend(self.session.disconnect(addr, Instant::now()));
            }
        }
    }

    /// Main server loop
    ///
    /// Waits for a datagram or the next tick, whichever comes first, hands it
    /// to the session and sends the result. Nothing a client sends can stop it.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut buffer = [0u8; 1024];

        info!("Server started successfully");

        loop {
            let event = tokio::select! {
                result = self.socket.recv_from(&mut buffer) => match result {
                    Ok((len, addr)) => Event::Datagram { len, addr },
                    Err(e) => Event::ReceiveFailed(e),
                },
                _ = tick_interval.tick() => Event::Tick,
            };

            let now = Instant::now();
            let outgoing = match event {
                Event::Datagram { len, addr } => {
                    if len > MAX_DATAGRAM_LEN {
                        warn!("Oversized datagram ({} bytes) from {}", len, addr);
                        self.session.disconnect(addr, now)
                    } else {
                        self.session.handle_datagram(addr, &buffer[..len], now)
                    }
                }
                Event::ReceiveFailed(e) => {
                    error!("Error receiving packet: {}", e);
                    continue;
                }
                Event::Tick => self.session.on_tick(now),
            };

            self.dispatch(outgoing).await;
        }
    }
}
