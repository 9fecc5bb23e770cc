//! Request routing for a single match.
//!
//! [`Session`] owns the engine and the session table and turns every incoming
//! datagram or timer tick into the list of datagrams to send. It never touches a
//! socket, so the network layer stays a thin send/receive loop.

use crate::client_manager::ClientManager;
use crate::game::{Game, MatchState};
use log::{debug, info, warn};
use shared::{Direction, GameEnd, GameStateUpdate, Map, Message, Role, MAX_LIVES};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tunables for the end-of-match sequence.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How many times GameEnd is broadcast before the match resets.
    pub end_broadcasts: u8,
    pub end_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            end_broadcasts: 10,
            end_interval: Duration::from_secs(1),
        }
    }
}

/// A datagram the network layer should send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub addr: SocketAddr,
    pub message: Message,
}

#[derive(Debug)]
struct EndOfMatch {
    result: GameEnd,
    remaining: u8,
    next_at: Instant,
}

pub struct Session {
    map: Arc<Map>,
    game: Game,
    clients: ClientManager,
    config: SessionConfig,
    ending: Option<EndOfMatch>,
}

fn reply_error(addr: SocketAddr, text: &str) -> Vec<Outgoing> {
    debug!("Rejecting request from {}: {}", addr, text);
    vec![Outgoing {
        addr,
        message: Message::error(text),
    }]
}

impl Session {
    pub fn new(map: Arc<Map>, config: SessionConfig) -> Self {
        Self {
            game: Game::new(Arc::clone(&map)),
            map,
            clients: ClientManager::new(),
            config,
            ending: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    /// True while GameEnd is being repeated.
    pub fn is_ending(&self) -> bool {
        self.ending.is_some()
    }

    /// Decodes and dispatches one datagram. Malformed input is dropped, and a
    /// known sender of it is disconnected.
    pub fn handle_datagram(&mut self, addr: SocketAddr, data: &[u8], now: Instant) -> Vec<Outgoing> {
        match Message::decode(data) {
            Ok(message) => self.handle_message(addr, message, now),
            Err(e) => {
                warn!("Dropping datagram from {}: {}", addr, e);
                self.disconnect(addr, now)
            }
        }
    }

    pub fn handle_message(&mut self, addr: SocketAddr, message: Message, now: Instant) -> Vec<Outgoing> {
        match message {
            Message::JoinRequest { role } => self.handle_join(addr, role),
            Message::PlayerMovement { direction } => self.handle_move(addr, direction, now),
            Message::Quit => self.handle_quit(addr, now),
            Message::GameStateUpdate(_) | Message::GameEnd(_) | Message::Error { .. } => {
                warn!("Unexpected server-bound message from {}", addr);
                Vec::new()
            }
        }
    }

    /// Periodic work: lifts capture freezes and drives the end-of-match cadence.
    pub fn on_tick(&mut self, now: Instant) -> Vec<Outgoing> {
        let mut outgoing = Vec::new();
        if self.game.tick() {
            outgoing.extend(self.broadcast_state());
        }
        outgoing.extend(self.advance_end_of_match(now));
        outgoing
    }

    /// Removes `addr` as if it had quit, without replying to it.
    pub fn disconnect(&mut self, addr: SocketAddr, now: Instant) -> Vec<Outgoing> {
        let Some(role) = self.clients.remove_client(addr) else {
            return Vec::new();
        };
        match role.player() {
            Some(player) if self.game.state() == MatchState::Active => {
                info!("{} left mid-match", role);
                self.game.declare_winner(player.opponent());
                self.begin_end_of_match(now)
            }
            _ => Vec::new(),
        }
    }

    fn handle_join(&mut self, addr: SocketAddr, role: u8) -> Vec<Outgoing> {
        let Ok(role) = Role::try_from(role) else {
            return reply_error(addr, "role does not exist");
        };

        if let Some(current) = self.clients.role_of(addr) {
            if current == role {
                return vec![self.state_for(addr, role)];
            }
            return reply_error(addr, "already joined as another role");
        }

        if let Some(player) = role.player() {
            if self.game.state() != MatchState::Idle {
                return reply_error(addr, "game has already started");
            }
            if self.clients.holder(player).is_some() {
                return reply_error(addr, "role is taken");
            }
            self.clients.add_client(addr, role);
            if self.clients.players_ready() && self.game.start() {
                return self.broadcast_state();
            }
        } else {
            self.clients.add_client(addr, role);
        }

        vec![self.state_for(addr, role)]
    }

    fn handle_move(&mut self, addr: SocketAddr, direction: u8, now: Instant) -> Vec<Outgoing> {
        let Some(role) = self.clients.role_of(addr) else {
            return reply_error(addr, "client is not a player");
        };
        let Some(player) = role.player() else {
            return reply_error(addr, "watchers cannot move");
        };
        let Ok(direction) = Direction::try_from(direction) else {
            return reply_error(addr, "direction does not exist");
        };
        if self.game.state() != MatchState::Active {
            return reply_error(addr, "game is not active");
        }

        if !self.game.apply_move(player, direction) {
            return vec![self.state_for(addr, role)];
        }

        let mut outgoing = self.broadcast_state();
        if self.game.state() == MatchState::Won {
            outgoing.extend(self.begin_end_of_match(now));
        }
        outgoing
    }

    fn handle_quit(&mut self, addr: SocketAddr, now: Instant) -> Vec<Outgoing> {
        if self.clients.role_of(addr).is_none() {
            return reply_error(addr, "client is not connected");
        }
        self.disconnect(addr, now)
    }

    fn begin_end_of_match(&mut self, now: Instant) -> Vec<Outgoing> {
        let Some(winner) = self.game.winner() else {
            return Vec::new();
        };
        let (lives, points) = self.game.game_progress();
        let result = GameEnd::new(winner, MAX_LIVES - lives, points);
        info!(
            "Match over: {:?} wins (spirit {}, cman {})",
            winner, result.spirit_score, result.cman_score
        );
        self.ending = Some(EndOfMatch {
            result,
            remaining: self.config.end_broadcasts,
            next_at: now,
        });
        self.advance_end_of_match(now)
    }

    fn advance_end_of_match(&mut self, now: Instant) -> Vec<Outgoing> {
        let Some(ending) = self.ending.as_mut() else {
            return Vec::new();
        };
        if now < ending.next_at {
            return Vec::new();
        }
        if ending.remaining == 0 {
            self.ending = None;
            return self.reset();
        }
        ending.remaining -= 1;
        ending.next_at = now + self.config.end_interval;
        let message = Message::GameEnd(ending.result.clone());
        self.broadcast(&message)
    }

    fn reset(&mut self) -> Vec<Outgoing> {
        self.game = Game::new(Arc::clone(&self.map));
        self.clients.clear_players();
        info!("Match reset, {} watcher(s) kept", self.clients.len());
        self.broadcast_state()
    }

    fn state_message(&self, role: Role) -> Message {
        let can_move = role
            .player()
            .is_some_and(|player| self.game.can_move(player));
        let (cman, spirit) = self.game.positions();
        Message::GameStateUpdate(GameStateUpdate {
            freeze: u8::from(!can_move),
            cman,
            spirit,
            attempts: self.game.attempts(),
            collected: self.game.collected(),
        })
    }

    fn state_for(&self, addr: SocketAddr, role: Role) -> Outgoing {
        Outgoing {
            addr,
            message: self.state_message(role),
        }
    }

    fn broadcast_state(&self) -> Vec<Outgoing> {
        self.clients
            .client_addrs()
            .into_iter()
            .map(|(addr, role)| self.state_for(addr, role))
            .collect()
    }

    fn broadcast(&self, message: &Message) -> Vec<Outgoing> {
        self.clients
            .client_addrs()
            .into_iter()
            .map(|(addr, _)| Outgoing {
                addr,
                message: message.clone(),
            })
            .collect()
    }
}
