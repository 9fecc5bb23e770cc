//! Authoritative match state and movement rules.

use log::info;
use shared::{Cell, Coord, Direction, Map, Player, MAX_LIVES};
use std::sync::Arc;

/// Number of sync ticks both players stay frozen after a capture.
pub const CAPTURE_FREEZE_TICKS: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Waiting for both player slots to fill.
    Idle,
    Active,
    /// Terminal; a new match is a new `Game`.
    Won,
}

#[derive(Debug, Clone)]
pub struct Game {
    map: Arc<Map>,
    state: MatchState,
    cman: Coord,
    spirit: Coord,
    lives: u8,
    collected: u64,
    /// Remaining frozen ticks, indexed by [`slot`].
    frozen: [u8; 2],
    winner: Option<Player>,
}

fn slot(player: Player) -> usize {
    match player {
        Player::Cman => 0,
        Player::Spirit => 1,
    }
}

impl Game {
    pub fn new(map: Arc<Map>) -> Self {
        Self {
            cman: map.start(Player::Cman),
            spirit: map.start(Player::Spirit),
            map,
            state: MatchState::Idle,
            lives: MAX_LIVES,
            collected: 0,
            frozen: [0; 2],
            winner: None,
        }
    }

    pub fn map(&self) -> &Arc<Map> {
        &self.map
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Moves an idle match to active. Returns false if it was not idle.
    pub fn start(&mut self) -> bool {
        if self.state != MatchState::Idle {
            return false;
        }
        self.state = MatchState::Active;
        info!("Match started");
        true
    }

    pub fn position(&self, player: Player) -> Coord {
        match player {
            Player::Cman => self.cman,
            Player::Spirit => self.spirit,
        }
    }

    /// Current (Cman, Spirit) coordinates.
    pub fn positions(&self) -> (Coord, Coord) {
        (self.cman, self.spirit)
    }

    pub fn collected(&self) -> u64 {
        self.collected
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    /// Captures so far.
    pub fn attempts(&self) -> u8 {
        MAX_LIVES - self.lives
    }

    /// (lives remaining, points collected)
    pub fn game_progress(&self) -> (u8, u8) {
        (self.lives, self.collected.count_ones() as u8)
    }

    /// Set once the match is won.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn can_move(&self, player: Player) -> bool {
        self.state == MatchState::Active && self.frozen[slot(player)] == 0
    }

    /// Ends the match in `player`'s favour regardless of the board.
    pub fn declare_winner(&mut self, player: Player) {
        self.state = MatchState::Won;
        self.winner = Some(player);
        info!("{:?} declared winner", player);
    }

    /// Advances freeze timers by one sync tick. Returns true if a freeze was lifted.
    pub fn tick(&mut self) -> bool {
        let mut released = false;
        for ticks in self.frozen.iter_mut().filter(|ticks| **ticks > 0) {
            *ticks -= 1;
            released |= *ticks == 0;
        }
        released
    }

    /// Applies one step for `player`. Returns true iff the move was legal and
    /// state changed, even when it ended in a capture or a win.
    pub fn apply_move(&mut self, player: Player, direction: Direction) -> bool {
        if !self.can_move(player) {
            return false;
        }
        let Some(target) = self.map.step(self.position(player), direction) else {
            return false;
        };
        if !self.map.cell(target).is_some_and(Cell::is_passable) {
            return false;
        }

        match player {
            Player::Cman => {
                self.cman = target;
                self.collect(target);
            }
            Player::Spirit => self.spirit = target,
        }

        if self.cman == self.spirit {
            self.capture();
        }
        // Lives running out above takes precedence over the last point.
        if self.state == MatchState::Active && self.collected == self.map.all_points_mask() {
            self.state = MatchState::Won;
            self.winner = Some(Player::Cman);
            info!("Cman collected every point");
        }
        true
    }

    fn collect(&mut self, coord: Coord) {
        if let Some(bit) = self.map.point_index(coord) {
            self.collected |= 1 << bit;
        }
    }

    fn capture(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        info!("Cman captured at {:?}, {} lives left", self.cman, self.lives);
        if self.lives == 0 {
            self.state = MatchState::Won;
            self.winner = Some(Player::Spirit);
            return;
        }
        self.cman = self.map.start(Player::Cman);
        self.frozen = [CAPTURE_FREEZE_TICKS; 2];
    }
}
