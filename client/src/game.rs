//! Client-side view of the match, built only from what the server sends

use log::warn;
use shared::{GameEnd, GameStateUpdate, Map, Message, Overlay, Player, Role, MAX_LIVES, MAX_POINTS};

pub struct ClientGameState {
    role: Role,
    latest: Option<GameStateUpdate>,
    outcome: Option<GameEnd>,
    last_error: Option<String>,
}

impl ClientGameState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            latest: None,
            outcome: None,
            last_error: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn latest(&self) -> Option<&GameStateUpdate> {
        self.latest.as_ref()
    }

    pub fn outcome(&self) -> Option<&GameEnd> {
        self.outcome.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Folds one server message into the local view.
    pub fn apply_message(&mut self, message: Message) {
        match message {
            Message::GameStateUpdate(update) => {
                // A state update after GameEnd means a new match was set up.
                self.outcome = None;
                self.latest = Some(update);
            }
            Message::GameEnd(end) => self.outcome = Some(end),
            Message::Error { message } => {
                warn!("Server: {}", message);
                self.last_error = Some(message);
            }
            other => warn!("Unexpected client-bound message {:?}", other),
        }
    }

    /// True when the last state says this client is an unfrozen player.
    pub fn can_move(&self) -> bool {
        self.role.player().is_some()
            && self.outcome.is_none()
            && self.latest.as_ref().is_some_and(|state| state.freeze == 0)
    }

    /// Positions and collected points to draw, falling back to the start cells.
    pub fn overlay(&self, map: &Map) -> Overlay {
        match &self.latest {
            Some(state) => Overlay {
                cman: state.cman,
                spirit: state.spirit,
                collected: state.collected,
            },
            None => Overlay {
                cman: map.start(Player::Cman),
                spirit: map.start(Player::Spirit),
                collected: 0,
            },
        }
    }

    pub fn status_line(&self) -> String {
        let mut status = format!("{}", self.role);
        match &self.latest {
            Some(state) => status.push_str(&format!(
                " | attempts {}/{} | points {}/{}",
                state.attempts,
                MAX_LIVES,
                state.collected.count_ones(),
                MAX_POINTS
            )),
            None => status.push_str(" | waiting for server"),
        }
        if let Some(end) = &self.outcome {
            let winner = match end.winner() {
                Some(Player::Cman) => "Cman",
                Some(Player::Spirit) => "Spirit",
                None => "nobody",
            };
            status.push_str(&format!(
                " | {} wins (spirit {}, cman {})",
                winner, end.spirit_score, end.cman_score
            ));
        }
        if let Some(error) = &self.last_error {
            status.push_str(&format!(" | {}", error));
        }
        status
    }
}
