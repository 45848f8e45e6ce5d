//! TCP network layer: accept loop, per-connection reader/writer tasks
//! and the single-writer event loop that owns the game room.
//!
//! Only the event loop touches [`GameRoom`] and [`ConnectionManager`].
//! Every other task just forwards [`ServerEvent`]s into one channel, so
//! state mutation happens strictly one event at a time in arrival
//! order, with no locking.

use crate::connection::ConnectionManager;
use crate::game::{GameRoom, MoveOutcome};
use log::{debug, error, info, warn};
use shared::codec::{read_packet, write_packet};
use shared::{Packet, PlayerId};
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Events funneled from the network tasks into the main loop.
#[derive(Debug)]
pub enum ServerEvent {
    Connected {
        conn_id: PlayerId,
        addr: SocketAddr,
        tx: mpsc::UnboundedSender<Packet>,
    },
    PacketReceived {
        conn_id: PlayerId,
        packet: Packet,
    },
    Disconnected {
        conn_id: PlayerId,
    },
}

/// Authoritative server for one game room.
pub struct Server {
    listener: TcpListener,
    room: GameRoom,
    connections: ConnectionManager,
    event_tx: mpsc::UnboundedSender<ServerEvent>,
    event_rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl Server {
    pub async fn new(
        addr: &str,
        rows: usize,
        cols: usize,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            room: GameRoom::new(rows, cols),
            connections: ConnectionManager::new(),
            event_tx,
            event_rx,
        })
    }

    /// The bound address, useful when listening on port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts sockets forever, wiring each one up with a reader and a
    /// writer task. Connection ids double as player identities.
    async fn run_acceptor(
        listener: TcpListener,
        event_tx: mpsc::UnboundedSender<ServerEvent>,
    ) {
        let mut next_conn_id: PlayerId = 1;

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let conn_id = next_conn_id;
                    next_conn_id += 1;

                    info!("New connection {} from {}", conn_id, addr);
                    let (read_half, write_half) = stream.into_split();
                    let (tx, rx) = mpsc::unbounded_channel();

                    tokio::spawn(Self::run_writer(conn_id, write_half, rx));
                    tokio::spawn(Self::run_reader(conn_id, read_half, event_tx.clone()));

                    if event_tx
                        .send(ServerEvent::Connected { conn_id, addr, tx })
                        .is_err()
                    {
                        // Main loop is gone; stop accepting.
                        break;
                    }
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }

    /// Drains one connection's outbound queue onto its socket. Ends
    /// when every sender is dropped (refusal or removal), then closes
    /// the write side so the peer sees the disconnect.
    async fn run_writer(
        conn_id: PlayerId,
        mut write_half: OwnedWriteHalf,
        mut rx: mpsc::UnboundedReceiver<Packet>,
    ) {
        while let Some(packet) = rx.recv().await {
            if let Err(e) = write_packet(&mut write_half, &packet).await {
                debug!("Write to connection {} failed: {}", conn_id, e);
                break;
            }
        }
        let _ = write_half.shutdown().await;
    }

    /// Forwards every inbound frame as an event; emits exactly one
    /// `Disconnected` when the stream ends or turns bad.
    async fn run_reader(
        conn_id: PlayerId,
        mut read_half: OwnedReadHalf,
        event_tx: mpsc::UnboundedSender<ServerEvent>,
    ) {
        loop {
            match read_packet(&mut read_half).await {
                Ok(Some(packet)) => {
                    if event_tx
                        .send(ServerEvent::PacketReceived { conn_id, packet })
                        .is_err()
                    {
                        return;
                    }
                }
                Ok(None) => {
                    debug!("Connection {} closed by peer", conn_id);
                    break;
                }
                Err(e) => {
                    warn!("Connection {} read error: {}", conn_id, e);
                    break;
                }
            }
        }
        let _ = event_tx.send(ServerEvent::Disconnected { conn_id });
    }

    /// Main loop: processes connection events strictly one at a time.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tokio::spawn(Self::run_acceptor(self.listener, self.event_tx.clone()));
        info!("Server started successfully");

        while let Some(event) = self.event_rx.recv().await {
            match event {
                ServerEvent::Connected { conn_id, addr, tx } => {
                    Self::handle_connected(&mut self.room, &mut self.connections, conn_id, addr, tx)
                }
                ServerEvent::PacketReceived { conn_id, packet } => {
                    Self::handle_packet(&mut self.room, &self.connections, conn_id, packet)
                }
                ServerEvent::Disconnected { conn_id } => {
                    Self::handle_disconnected(&mut self.room, &mut self.connections, conn_id)
                }
            }
        }

        info!("Server shutting down");
        Ok(())
    }

    /// Admission: seat the player or refuse with `RoomFull` and close.
    fn handle_connected(
        room: &mut GameRoom,
        connections: &mut ConnectionManager,
        conn_id: PlayerId,
        addr: SocketAddr,
        tx: mpsc::UnboundedSender<Packet>,
    ) {
        let Some(color) = room.add_player(conn_id) else {
            info!("Refusing connection {} from {}: room is full", conn_id, addr);
            let _ = tx.send(Packet::RoomFull {
                message: "The room is full. Wait for the game to finish.".to_string(),
            });
            // Dropping the only sender closes the writer and the socket.
            return;
        };

        connections.add(conn_id, addr, tx);
        connections.send_to(
            conn_id,
            Packet::Connected {
                player_id: conn_id,
                color,
            },
        );

        let snapshot = room.snapshot();
        connections.send_to(
            conn_id,
            Packet::InitialState {
                snapshot: snapshot.clone(),
            },
        );
        // The join changed the canonical state; everyone else catches up.
        connections.broadcast_except(conn_id, &Packet::StateUpdated { snapshot });
    }

    fn handle_packet(
        room: &mut GameRoom,
        connections: &ConnectionManager,
        conn_id: PlayerId,
        packet: Packet,
    ) {
        if !connections.contains(conn_id) {
            debug!("Dropping packet from unadmitted connection {}", conn_id);
            return;
        }

        match packet {
            Packet::SubmitMove { row, col, side } => {
                match room.submit_move(conn_id, row, col, side) {
                    MoveOutcome::Applied { game_over, .. } => {
                        let snapshot = room.snapshot();
                        connections.broadcast(&Packet::StateUpdated {
                            snapshot: snapshot.clone(),
                        });
                        if game_over {
                            connections.broadcast(&Packet::GameEnded { snapshot });
                        }
                    }
                    MoveOutcome::Forfeited(rejection) => {
                        // Board unchanged, but the turn moved on.
                        debug!("Player {} forfeited: {}", conn_id, rejection);
                        connections.broadcast(&Packet::StateUpdated {
                            snapshot: room.snapshot(),
                        });
                    }
                    MoveOutcome::Ignored(reason) => {
                        debug!("Dropped move from player {}: {:?}", conn_id, reason);
                    }
                }
            }
            Packet::RestartRequest => {
                if room.restart(conn_id) {
                    connections.broadcast(&Packet::StateUpdated {
                        snapshot: room.snapshot(),
                    });
                } else {
                    debug!("Dropped restart request from player {}", conn_id);
                }
            }
            other => {
                warn!(
                    "Unexpected packet from player {}: {:?}",
                    conn_id,
                    std::mem::discriminant(&other)
                );
            }
        }
    }

    fn handle_disconnected(
        room: &mut GameRoom,
        connections: &mut ConnectionManager,
        conn_id: PlayerId,
    ) {
        if !connections.remove(conn_id) {
            // Refused or already-gone connection; nothing to repair.
            return;
        }

        room.remove_player(conn_id);
        connections.broadcast(&Packet::PeerLeft { player_id: conn_id });
        // Survivors get the repaired (reset) state.
        if !connections.is_empty() {
            connections.broadcast(&Packet::StateUpdated {
                snapshot: room.snapshot(),
            });
        }
    }
}
