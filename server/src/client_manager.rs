//! Session table for the match server
//!
//! This module tracks which peer address holds which role:
//! - Any number of watchers
//! - At most one Cman and one Spirit, recorded in a role-assignment table
//! - Removal on quit, on send failure, and when a finished match clears the player slots
//!
//! The server trusts the sender address as the client identity; there is no
//! handshake beyond the join request and no liveness tracking.

use log::info;
use shared::{Player, Role};
use std::collections::BTreeMap;
use std::net::SocketAddr;

/// Maps peer addresses to roles and player slots to their occupants
///
/// Clients are kept in address order so broadcasts always visit recipients in
/// the same sequence.
#[derive(Debug, Default)]
pub struct ClientManager {
    /// Every joined client and the role it holds
    clients: BTreeMap<SocketAddr, Role>,
    /// Occupant of the Cman slot
    cman: Option<SocketAddr>,
    /// Occupant of the Spirit slot
    spirit: Option<SocketAddr>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the role held by `addr`, if it has joined
    pub fn role_of(&self, addr: SocketAddr) -> Option<Role> {
        self.clients.get(&addr).copied()
    }

    /// Returns the address occupying `player`'s slot
    pub fn holder(&self, player: Player) -> Option<SocketAddr> {
        match player {
            Player::Cman => self.cman,
            Player::Spirit => self.spirit,
        }
    }

    fn slot_mut(&mut self, player: Player) -> &mut Option<SocketAddr> {
        match player {
            Player::Cman => &mut self.cman,
            Player::Spirit => &mut self.spirit,
        }
    }

    /// Registers `addr` under `role`
    ///
    /// For player roles this also claims the slot. Returns false, changing
    /// nothing, when the slot already belongs to someone else.
    pub fn add_client(&mut self, addr: SocketAddr, role: Role) -> bool {
        if let Some(player) = role.player() {
            let slot = self.slot_mut(player);
            if slot.is_some_and(|holder| holder != addr) {
                return false;
            }
            *slot = Some(addr);
        }
        self.clients.insert(addr, role);
        info!("Client {} joined as {}", addr, role);
        true
    }

    /// Removes a client and frees its slot. Returns the role it held.
    pub fn remove_client(&mut self, addr: SocketAddr) -> Option<Role> {
        let role = self.clients.remove(&addr)?;
        if let Some(player) = role.player() {
            let slot = self.slot_mut(player);
            if *slot == Some(addr) {
                *slot = None;
            }
        }
        info!("Client {} ({}) left", addr, role);
        Some(role)
    }

    /// True once both player slots are occupied
    pub fn players_ready(&self) -> bool {
        self.cman.is_some() && self.spirit.is_some()
    }

    /// Drops both players, keeping watchers connected for the next match
    pub fn clear_players(&mut self) {
        self.clients.retain(|_, role| *role == Role::Watcher);
        self.cman = None;
        self.spirit = None;
    }

    /// All clients with their roles, in address order
    pub fn client_addrs(&self) -> Vec<(SocketAddr, Role)> {
        self.clients
            .iter()
            .map(|(addr, role)| (*addr, *role))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
