//! Registry of admitted connections and outbound packet fan-out.
//!
//! Each admitted player has a per-connection unbounded channel feeding
//! their writer task. The registry never blocks: a send to a dead
//! channel just means the reader task's disconnect event is already in
//! flight, so failures are logged and ignored.

use log::{debug, info};
use shared::{Packet, PlayerId};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// One admitted player connection.
#[derive(Debug)]
pub struct Connection {
    pub id: PlayerId,
    pub addr: SocketAddr,
    /// Feeds this connection's writer task.
    tx: mpsc::UnboundedSender<Packet>,
}

impl Connection {
    pub fn new(id: PlayerId, addr: SocketAddr, tx: mpsc::UnboundedSender<Packet>) -> Self {
        Self { id, addr, tx }
    }
}

/// All currently admitted connections, indexed by player id.
///
/// Admission itself is decided by the game room (two seats); sockets
/// that were refused never appear here, which is what makes their later
/// packets and disconnects trivially ignorable.
pub struct ConnectionManager {
    connections: HashMap<PlayerId, Connection>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Registers an admitted connection.
    pub fn add(&mut self, id: PlayerId, addr: SocketAddr, tx: mpsc::UnboundedSender<Packet>) {
        info!("Connection {} registered from {}", id, addr);
        self.connections.insert(id, Connection::new(id, addr, tx));
    }

    /// Removes a connection. Returns true if it was present.
    pub fn remove(&mut self, id: PlayerId) -> bool {
        if let Some(conn) = self.connections.remove(&id) {
            info!("Connection {} from {} removed", conn.id, conn.addr);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Queues a packet for a single connection.
    pub fn send_to(&self, id: PlayerId, packet: Packet) {
        if let Some(conn) = self.connections.get(&id) {
            if conn.tx.send(packet).is_err() {
                debug!("Connection {} writer is gone, dropping packet", id);
            }
        }
    }

    /// Queues a packet for every admitted connection.
    pub fn broadcast(&self, packet: &Packet) {
        for conn in self.connections.values() {
            if conn.tx.send(packet.clone()).is_err() {
                debug!("Connection {} writer is gone, dropping packet", conn.id);
            }
        }
    }

    /// Queues a packet for everyone except `skip`.
    pub fn broadcast_except(&self, skip: PlayerId, packet: &Packet) {
        for conn in self.connections.values() {
            if conn.id == skip {
                continue;
            }
            if conn.tx.send(packet.clone()).is_err() {
                debug!("Connection {} writer is gone, dropping packet", conn.id);
            }
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
