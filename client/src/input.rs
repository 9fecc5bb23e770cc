//! Keyboard polling and move throttling

use macroquad::prelude::*;
use shared::Direction;
use std::time::{Duration, Instant};

/// Minimum time between two movement requests.
pub const MOVE_INTERVAL: Duration = Duration::from_millis(100);

/// Keys polled for movement, in priority order.
pub const MOVEMENT_KEYS: [KeyCode; 8] = [
    KeyCode::W,
    KeyCode::Up,
    KeyCode::A,
    KeyCode::Left,
    KeyCode::S,
    KeyCode::Down,
    KeyCode::D,
    KeyCode::Right,
];

/// Returns the subset of `candidates` that is currently held down.
pub fn pressed_keys(candidates: &[KeyCode]) -> Vec<KeyCode> {
    candidates
        .iter()
        .copied()
        .filter(|key| is_key_down(*key))
        .collect()
}

/// Maps held keys to a single direction; the first mapped key wins.
pub fn direction_for(keys: &[KeyCode]) -> Option<Direction> {
    keys.iter().find_map(|key| match key {
        KeyCode::W | KeyCode::Up => Some(Direction::Up),
        KeyCode::A | KeyCode::Left => Some(Direction::Left),
        KeyCode::S | KeyCode::Down => Some(Direction::Down),
        KeyCode::D | KeyCode::Right => Some(Direction::Right),
        _ => None,
    })
}

pub struct InputManager {
    last_move_sent: Option<Instant>,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            last_move_sent: None,
        }
    }

    /// Q, Escape, or closing the window.
    pub fn quit_requested(&self) -> bool {
        is_key_pressed(KeyCode::Q) || is_key_pressed(KeyCode::Escape) || is_quit_requested()
    }

    /// Direction to send now, if a movement key is held and the throttle allows it.
    pub fn poll_direction(&mut self, now: Instant) -> Option<Direction> {
        let direction = direction_for(&pressed_keys(&MOVEMENT_KEYS))?;
        self.throttle(direction, now)
    }

    fn throttle(&mut self, direction: Direction, now: Instant) -> Option<Direction> {
        if let Some(last) = self.last_move_sent {
            if now.duration_since(last) < MOVE_INTERVAL {
                return None;
            }
        }
        self.last_move_sent = Some(now);
        Some(direction)
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_mapping() {
        assert_eq!(direction_for(&[KeyCode::W]), Some(Direction::Up));
        assert_eq!(direction_for(&[KeyCode::Left]), Some(Direction::Left));
        assert_eq!(direction_for(&[KeyCode::S]), Some(Direction::Down));
        assert_eq!(direction_for(&[KeyCode::Right]), Some(Direction::Right));
        assert_eq!(direction_for(&[]), None);
        assert_eq!(direction_for(&[KeyCode::Space]), None);
    }

    #[test]
    fn test_first_key_wins() {
        assert_eq!(
            direction_for(&[KeyCode::Space, KeyCode::D, KeyCode::W]),
            Some(Direction::Right)
        );
    }

    #[test]
    fn test_throttle() {
        let mut input = InputManager::new();
        let start = Instant::now();
        assert_eq!(input.throttle(Direction::Up, start), Some(Direction::Up));
        assert_eq!(
            input.throttle(Direction::Up, start + Duration::from_millis(50)),
            None
        );
        assert_eq!(
            input.throttle(Direction::Left, start + MOVE_INTERVAL),
            Some(Direction::Left)
        );
    }
}
