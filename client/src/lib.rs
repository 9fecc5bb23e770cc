//! # C-Man Client Library
//!
//! A thin client for the C-Man maze chase. The server is authoritative for
//! everything; the client only shows the latest state it received and sends
//! the player's intent.
//!
//! ## Main Loop
//!
//! Once per frame the client:
//! 1. Checks whether the user asked to quit, sending Quit if so
//! 2. Drains the non-blocking UDP socket and folds each message into its view
//! 3. Sends one movement request if a key is held, the last state says the
//!    player is not frozen, and the move throttle allows it
//! 4. Draws the map with the current overlay and a status line
//!
//! A socket error other than "would block" ends the loop; the binary reports it
//! and exits.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The received state: last GameStateUpdate, last GameEnd, last Error.
//!
//! ### Input Module (`input`)
//! Polls movement keys and throttles how often moves are sent.
//!
//! ### Network Module (`network`)
//! The UDP socket and the frame loop tying the other modules together.
//!
//! ### Rendering Module (`rendering`)
//! Draws the text grid produced by `shared::map::render` as coloured tiles.

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
