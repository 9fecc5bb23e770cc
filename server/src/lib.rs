//! # C-Man Match Server
//!
//! Authoritative server for the two-player maze chase. It holds the only real
//! copy of the match, decides which moves are legal, and pushes the resulting
//! state to every connected client over UDP.
//!
//! ## Roles
//!
//! Clients join as one of three roles:
//! - **Cman** collects the forty points and loses a life whenever it meets Spirit
//! - **Spirit** wins by catching Cman three times
//! - **Watcher** never moves and receives every broadcast
//!
//! There is one Cman slot, one Spirit slot, and no limit on watchers. A match
//! starts the moment both player slots are filled.
//!
//! ## Architecture
//!
//! ### Single-Threaded Event Loop
//! All state lives in one [`session::Session`] driven by one loop. The loop
//! waits for either a datagram or the next sync tick. The tick lifts capture
//! freezes and paces the end-of-match broadcasts. Nothing runs concurrently,
//! so there are no locks.
//!
//! ### Fixed-Layout Protocol
//! Messages are the byte-exact datagrams defined in `shared::protocol`. A
//! datagram that fails to decode is logged and dropped, and a connected sender
//! of one is disconnected. A request that breaks a rule is answered with an
//! Error message and changes nothing.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The rules engine: movement, point collection, captures, freezes and win
//! detection. It knows nothing about clients or sockets.
//!
//! ### Client Manager Module (`client_manager`)
//! Maps peer addresses to roles and tracks who holds each player slot.
//!
//! ### Session Module (`session`)
//! Routes join, move and quit requests to the engine and decides who receives
//! which reply. Pure input-to-output, so it is tested without a network.
//!
//! ### Network Module (`network`)
//! The UDP socket and the loop around the session.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, DEFAULT_TICK};
//! use server::session::SessionConfig;
//! use shared::Map;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let map = Map::load("map.txt")?;
//!     let mut server = Server::new(
//!         "127.0.0.1:1337",
//!         map,
//!         DEFAULT_TICK,
//!         SessionConfig::default(),
//!     )
//!     .await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Known Limits
//!
//! Clients are identified by address alone and nothing is authenticated. A
//! client that disappears without sending Quit stays in the session table
//! until a send to it fails.

pub mod client_manager;
pub mod game;
pub mod network;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support {
    use shared::Map;
    use std::sync::Arc;

    /// Cman at (1,1) and Spirit at (1,10) on an open row, above four rows of points.
    pub const TEST_MAP: &str = "\
WWWWWWWWWWWW
WCFFFFFFFFSW
WPPPPPPPPPPW
WPPPPPPPPPPW
WPPPPPPPPPPW
WPPPPPPPPPPW
WWWWWWWWWWWW
";

    pub fn test_map() -> Arc<Map> {
        Arc::new(Map::parse(TEST_MAP).unwrap())
    }
}
