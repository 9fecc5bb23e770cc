use crate::game::ClientGameState;
use crate::input::InputManager;
use crate::rendering::Renderer;
use log::{debug, info, warn};
use macroquad::prelude::*;
use shared::map::render;
use shared::{Map, Message, Role};
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Instant;

const CELL_SIZE: f32 = 28.0;

/// Game client bound to one server.
///
/// The socket is a non-blocking std `UdpSocket` drained once per frame, since
/// macroquad drives the async main loop and no tokio reactor is running.
pub struct Client {
    socket: UdpSocket,
    server_addr: SocketAddr,
    map: Map,

    game_state: ClientGameState,
    input_manager: InputManager,
    renderer: Renderer,
}

impl Client {
    pub fn new(server_addr: &str, role: Role, map: Map) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr = server_addr
            .to_socket_addrs()?
            .next()
            .ok_or("server address did not resolve")?;
        let bind_addr = if server_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_nonblocking(true)?;

        Ok(Client {
            socket,
            server_addr,
            map,
            game_state: ClientGameState::new(role),
            input_manager: InputManager::new(),
            renderer: Renderer::new(CELL_SIZE),
        })
    }

    fn send_message(&self, message: &Message) -> Result<(), Box<dyn std::error::Error>> {
        let data = message.encode()?;
        self.socket.send_to(&data, self.server_addr)?;
        Ok(())
    }

    /// Drains every datagram that has arrived since the last frame.
    fn poll_socket(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut buffer = [0u8; 1024];
        loop {
            match self.socket.recv_from(&mut buffer) {
                Ok((len, from)) => {
                    if from != self.server_addr {
                        debug!("Ignoring datagram from {}", from);
                        continue;
                    }
                    match Message::decode(&buffer[..len]) {
                        Ok(message) => self.game_state.apply_message(message),
                        Err(e) => warn!("Dropping bad datagram: {}", e),
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Runs until the user quits or the socket fails.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        prevent_quit();
        let (width, height) = self
            .renderer
            .window_size(self.map.width(), self.map.height());
        request_new_screen_size(width, height);

        info!(
            "Joining {} as {}",
            self.server_addr,
            self.game_state.role()
        );
        self.send_message(&Message::join(self.game_state.role()))?;

        loop {
            if self.input_manager.quit_requested() {
                info!("Leaving game");
                self.send_message(&Message::Quit)?;
                break;
            }

            self.poll_socket()?;

            if self.game_state.can_move() {
                if let Some(direction) = self.input_manager.poll_direction(Instant::now()) {
                    self.send_message(&Message::movement(direction))?;
                }
            }

            let grid = render(&self.map, &self.game_state.overlay(&self.map));
            self.renderer.render(&grid, &self.game_state.status_line());

            next_frame().await;
        }

        Ok(())
    }
}
