//! Fixed-layout binary messages exchanged between client and server.
//!
//! Every datagram is one opcode byte followed by a payload whose width is fixed
//! by the opcode. Multi-field payloads are laid out with bincode using big-endian
//! fixed-width integers, which gives exactly one byte per `u8` field and no
//! framing. The Error payload is a 36-byte NUL-padded UTF-8 field.

use crate::map::Coord;
use crate::{Direction, Player, Role};
use bincode::Options;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPCODE_JOIN_REQUEST: u8 = 0x00;
pub const OPCODE_PLAYER_MOVEMENT: u8 = 0x01;
pub const OPCODE_QUIT: u8 = 0x0F;
pub const OPCODE_GAME_STATE_UPDATE: u8 = 0x80;
pub const OPCODE_GAME_END: u8 = 0x8F;
pub const OPCODE_ERROR: u8 = 0xFF;

/// Width of the Error message text field.
pub const ERROR_MESSAGE_LEN: usize = 36;
/// Largest collected mask that fits the 40-bit field.
pub const COLLECTED_MASK_MAX: u64 = (1 << 40) - 1;
/// Large enough for the widest message.
pub const MAX_DATAGRAM_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStateUpdate {
    /// 1 when the recipient may not move.
    pub freeze: u8,
    pub cman: Coord,
    pub spirit: Coord,
    /// Captures so far.
    pub attempts: u8,
    /// Bit `i` set when the `i`-th point in scan order has been collected.
    pub collected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEnd {
    /// 1 = Cman, 2 = Spirit.
    pub winner: u8,
    pub spirit_score: u8,
    pub cman_score: u8,
}

impl GameEnd {
    pub fn new(winner: Player, spirit_score: u8, cman_score: u8) -> Self {
        Self {
            winner: winner.wire_id(),
            spirit_score,
            cman_score,
        }
    }

    pub fn winner(&self) -> Option<Player> {
        Player::from_wire_id(self.winner)
    }
}

/// All six message kinds. Client requests carry raw bytes so the server can
/// answer an out-of-range role or direction with an Error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    JoinRequest { role: u8 },
    PlayerMovement { direction: u8 },
    Quit,
    GameStateUpdate(GameStateUpdate),
    GameEnd(GameEnd),
    Error { message: String },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("role {0} is out of range")]
    InvalidRole(u8),
    #[error("direction {0} is out of range")]
    InvalidDirection(u8),
    #[error("freeze flag must be 0 or 1, got {0}")]
    InvalidFreeze(u8),
    #[error("collected mask {0:#x} does not fit in 40 bits")]
    CollectedOverflow(u64),
    #[error("winner {0} is out of range")]
    InvalidWinner(u8),
    #[error("error message is {0} bytes, limit is 36")]
    MessageTooLong(usize),
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] bincode::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty datagram")]
    Empty,
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
    #[error("opcode {opcode:#04x} expects {expected} bytes, got {actual}")]
    InvalidLength {
        opcode: u8,
        expected: usize,
        actual: usize,
    },
    #[error("malformed payload: {0}")]
    Malformed(#[from] bincode::Error),
}

#[derive(Serialize, Deserialize)]
struct StateFrame {
    freeze: u8,
    cman_row: u8,
    cman_col: u8,
    spirit_row: u8,
    spirit_col: u8,
    attempts: u8,
    collected: [u8; 5],
}

#[derive(Serialize, Deserialize)]
struct EndFrame {
    winner: u8,
    spirit_score: u8,
    cman_score: u8,
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
}

/// Total datagram length, opcode included, for a known opcode.
fn expected_len(opcode: u8) -> Option<usize> {
    match opcode {
        OPCODE_JOIN_REQUEST | OPCODE_PLAYER_MOVEMENT => Some(2),
        OPCODE_QUIT => Some(1),
        OPCODE_GAME_STATE_UPDATE => Some(12),
        OPCODE_GAME_END => Some(4),
        OPCODE_ERROR => Some(1 + ERROR_MESSAGE_LEN),
        _ => None,
    }
}

impl Message {
    pub fn join(role: Role) -> Self {
        Message::JoinRequest { role: role as u8 }
    }

    pub fn movement(direction: Direction) -> Self {
        Message::PlayerMovement {
            direction: direction as u8,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Message::Error {
            message: message.into(),
        }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            Message::JoinRequest { .. } => OPCODE_JOIN_REQUEST,
            Message::PlayerMovement { .. } => OPCODE_PLAYER_MOVEMENT,
            Message::Quit => OPCODE_QUIT,
            Message::GameStateUpdate(_) => OPCODE_GAME_STATE_UPDATE,
            Message::GameEnd(_) => OPCODE_GAME_END,
            Message::Error { .. } => OPCODE_ERROR,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut data = vec![self.opcode()];
        match self {
            Message::JoinRequest { role } => {
                Role::try_from(*role).map_err(EncodeError::InvalidRole)?;
                data.push(*role);
            }
            Message::PlayerMovement { direction } => {
                Direction::try_from(*direction).map_err(EncodeError::InvalidDirection)?;
                data.push(*direction);
            }
            Message::Quit => {}
            Message::GameStateUpdate(update) => {
                if update.freeze > 1 {
                    return Err(EncodeError::InvalidFreeze(update.freeze));
                }
                if update.collected > COLLECTED_MASK_MAX {
                    return Err(EncodeError::CollectedOverflow(update.collected));
                }
                let mut collected = [0u8; 5];
                collected.copy_from_slice(&update.collected.to_be_bytes()[3..]);
                let frame = StateFrame {
                    freeze: update.freeze,
                    cman_row: update.cman.row,
                    cman_col: update.cman.col,
                    spirit_row: update.spirit.row,
                    spirit_col: update.spirit.col,
                    attempts: update.attempts,
                    collected,
                };
                data.extend(wire_options().serialize(&frame)?);
            }
            Message::GameEnd(end) => {
                if Player::from_wire_id(end.winner).is_none() {
                    return Err(EncodeError::InvalidWinner(end.winner));
                }
                let frame = EndFrame {
                    winner: end.winner,
                    spirit_score: end.spirit_score,
                    cman_score: end.cman_score,
                };
                data.extend(wire_options().serialize(&frame)?);
            }
            Message::Error { message } => {
                let bytes = message.as_bytes();
                if bytes.len() > ERROR_MESSAGE_LEN {
                    return Err(EncodeError::MessageTooLong(bytes.len()));
                }
                let mut field = [0u8; ERROR_MESSAGE_LEN];
                field[..bytes.len()].copy_from_slice(bytes);
                data.extend_from_slice(&field);
            }
        }
        Ok(data)
    }

    /// Decodes one datagram. Either the whole buffer is a valid message or an
    /// error is returned.
    pub fn decode(data: &[u8]) -> Result<Message, DecodeError> {
        let (&opcode, payload) = data.split_first().ok_or(DecodeError::Empty)?;
        let expected = expected_len(opcode).ok_or(DecodeError::UnknownOpcode(opcode))?;
        if data.len() != expected {
            return Err(DecodeError::InvalidLength {
                opcode,
                expected,
                actual: data.len(),
            });
        }

        let message = match opcode {
            OPCODE_JOIN_REQUEST => Message::JoinRequest { role: payload[0] },
            OPCODE_PLAYER_MOVEMENT => Message::PlayerMovement {
                direction: payload[0],
            },
            OPCODE_QUIT => Message::Quit,
            OPCODE_GAME_STATE_UPDATE => {
                let frame: StateFrame = wire_options().deserialize(payload)?;
                let mut collected = [0u8; 8];
                collected[3..].copy_from_slice(&frame.collected);
                Message::GameStateUpdate(GameStateUpdate {
                    freeze: frame.freeze,
                    cman: Coord::new(frame.cman_row, frame.cman_col),
                    spirit: Coord::new(frame.spirit_row, frame.spirit_col),
                    attempts: frame.attempts,
                    collected: u64::from_be_bytes(collected),
                })
            }
            OPCODE_GAME_END => {
                let frame: EndFrame = wire_options().deserialize(payload)?;
                Message::GameEnd(GameEnd {
                    winner: frame.winner,
                    spirit_score: frame.spirit_score,
                    cman_score: frame.cman_score,
                })
            }
            OPCODE_ERROR => {
                let end = payload
                    .iter()
                    .rposition(|&b| b != 0)
                    .map_or(0, |last| last + 1);
                Message::Error {
                    message: String::from_utf8_lossy(&payload[..end]).into_owned(),
                }
            }
            other => return Err(DecodeError::UnknownOpcode(other)),
        };
        Ok(message)
    }
}
