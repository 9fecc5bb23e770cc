//! Types shared by the C-Man server and client: the binary wire protocol, the
//! maze model, and the small role/direction vocabulary both sides speak.

pub mod map;
pub mod protocol;

pub use map::{Cell, Coord, Map, MapError, Overlay};
pub use protocol::{DecodeError, EncodeError, GameEnd, GameStateUpdate, Message};

pub const DEFAULT_PORT: u16 = 1337;
/// Number of point cells every map must contain; also the width of the collected bitmask.
pub const MAX_POINTS: usize = 40;
pub const MAX_LIVES: u8 = 3;

/// One of the two in-game players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Cman,
    Spirit,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::Cman => Player::Spirit,
            Player::Spirit => Player::Cman,
        }
    }

    pub fn role(self) -> Role {
        match self {
            Player::Cman => Role::Cman,
            Player::Spirit => Role::Spirit,
        }
    }

    /// Winner byte used by the GameEnd message.
    pub fn wire_id(self) -> u8 {
        self.role() as u8
    }

    pub fn from_wire_id(id: u8) -> Option<Player> {
        match Role::try_from(id).ok()? {
            Role::Watcher => None,
            Role::Cman => Some(Player::Cman),
            Role::Spirit => Some(Player::Spirit),
        }
    }
}

/// Role a client asks for when joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Role {
    Watcher = 0,
    Cman = 1,
    Spirit = 2,
}

impl Role {
    /// The in-game player this role controls, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Role::Watcher => None,
            Role::Cman => Some(Player::Cman),
            Role::Spirit => Some(Player::Spirit),
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Watcher),
            1 => Ok(Role::Cman),
            2 => Ok(Role::Spirit),
            other => Err(other),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "watcher" => Ok(Role::Watcher),
            "cman" => Ok(Role::Cman),
            "spirit" => Ok(Role::Spirit),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Watcher => "watcher",
            Role::Cman => "cman",
            Role::Spirit => "spirit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Left = 1,
    Down = 2,
    Right = 3,
}

impl Direction {
    /// Row/column delta of one step in this direction.
    pub fn delta(self) -> (i16, i16) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
            Direction::Right => (0, 1),
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Left),
            2 => Ok(Direction::Down),
            3 => Ok(Direction::Right),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_byte_mapping() {
        for byte in 0..=2u8 {
            let role = Role::try_from(byte).unwrap();
            assert_eq!(role as u8, byte);
        }
        assert_eq!(Role::try_from(3), Err(3));
        assert_eq!(Role::try_from(255), Err(255));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("cman".parse::<Role>(), Ok(Role::Cman));
        assert_eq!("Spirit".parse::<Role>(), Ok(Role::Spirit));
        assert_eq!("watcher".parse::<Role>(), Ok(Role::Watcher));
        assert!("ghost".parse::<Role>().is_err());
    }

    #[test]
    fn test_player_roles() {
        assert_eq!(Role::Watcher.player(), None);
        assert_eq!(Role::Cman.player(), Some(Player::Cman));
        assert_eq!(Player::Spirit.role(), Role::Spirit);
        assert_eq!(Player::Cman.opponent(), Player::Spirit);
        assert_eq!(Player::Cman.wire_id(), 1);
        assert_eq!(Player::Spirit.wire_id(), 2);
        assert_eq!(Player::from_wire_id(2), Some(Player::Spirit));
        assert_eq!(Player::from_wire_id(0), None);
    }

    #[test]
    fn test_direction_deltas() {
        assert_eq!(Direction::Up.delta(), (-1, 0));
        assert_eq!(Direction::Left.delta(), (0, -1));
        assert_eq!(Direction::Down.delta(), (1, 0));
        assert_eq!(Direction::Right.delta(), (0, 1));
        assert_eq!(Direction::try_from(4), Err(4));
    }
}
