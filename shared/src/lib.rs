//! Types shared between the dots-and-boxes server and its clients: the
//! board model, the wire protocol and the frame codec.
//!
//! The server is authoritative. Clients only ever send structural move
//! descriptions and receive full [`GameSnapshot`]s back; they never
//! compute partial state updates of their own.

pub mod board;
pub mod codec;

pub use board::{resolve_edge, Board, BoardError, Cell, Dot, MoveRejection};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default board shape and layout, matching the 3x3 grid the original
/// game shipped with.
pub const DEFAULT_ROWS: usize = 3;
pub const DEFAULT_COLS: usize = 3;
pub const BOARD_ORIGIN_X: f32 = 20.0;
pub const BOARD_ORIGIN_Y: f32 = 20.0;
pub const CELL_WIDTH: f32 = 60.0;
pub const CELL_HEIGHT: f32 = 60.0;

/// Points awarded to the mover for each box they close.
pub const POINTS_PER_BOX: u32 = 10;

/// Connection-scoped player identity assigned by the server.
pub type PlayerId = u32;

/// One of the four walls of a cell.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// The side of the adjacent cell that shares this edge.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Exactly two colors exist; they are assigned by join order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PlayerColor {
    Red,
    Blue,
}

impl PlayerColor {
    pub fn other(self) -> PlayerColor {
        match self {
            PlayerColor::Red => PlayerColor::Blue,
            PlayerColor::Blue => PlayerColor::Red,
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerColor::Red => write!(f, "red"),
            PlayerColor::Blue => write!(f, "blue"),
        }
    }
}

/// Public view of one seated player.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerState {
    pub id: PlayerId,
    pub score: u32,
    pub color: PlayerColor,
}

/// End-of-game result.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(PlayerId),
    Draw,
}

/// The canonical game state, broadcast whole after every accepted
/// mutation. Clients replace their local copy instead of merging.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: Board,
    /// Seated players in join order (at most two).
    pub players: Vec<PlayerState>,
    pub current_player: Option<PlayerId>,
    pub is_game_over: bool,
    pub winner: Option<GameOutcome>,
}

/// Every message that crosses the wire, in both directions.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // Client -> server
    SubmitMove {
        row: usize,
        col: usize,
        side: Side,
    },
    RestartRequest,

    // Server -> client
    Connected {
        player_id: PlayerId,
        color: PlayerColor,
    },
    InitialState {
        snapshot: GameSnapshot,
    },
    StateUpdated {
        snapshot: GameSnapshot,
    },
    GameEnded {
        snapshot: GameSnapshot,
    },
    RoomFull {
        message: String,
    },
    PeerLeft {
        player_id: PlayerId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Top.opposite(), Side::Bottom);
        assert_eq!(Side::Bottom.opposite(), Side::Top);
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn test_color_other() {
        assert_eq!(PlayerColor::Red.other(), PlayerColor::Blue);
        assert_eq!(PlayerColor::Blue.other(), PlayerColor::Red);
    }

    #[test]
    fn test_packet_serialization_submit_move() {
        let packet = Packet::SubmitMove {
            row: 1,
            col: 2,
            side: Side::Left,
        };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::SubmitMove { row, col, side } => {
                assert_eq!(row, 1);
                assert_eq!(col, 2);
                assert_eq!(side, Side::Left);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_snapshot() {
        let board = Board::new(2, 2, 20.0, 20.0, 60.0, 60.0).unwrap();
        let snapshot = GameSnapshot {
            board,
            players: vec![
                PlayerState {
                    id: 1,
                    score: 20,
                    color: PlayerColor::Red,
                },
                PlayerState {
                    id: 2,
                    score: 10,
                    color: PlayerColor::Blue,
                },
            ],
            current_player: Some(2),
            is_game_over: false,
            winner: None,
        };

        let packet = Packet::StateUpdated {
            snapshot: snapshot.clone(),
        };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::StateUpdated { snapshot: got } => assert_eq!(got, snapshot),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_game_ended_carries_winner() {
        let board = Board::new(1, 1, 0.0, 0.0, 60.0, 60.0).unwrap();
        let packet = Packet::GameEnded {
            snapshot: GameSnapshot {
                board,
                players: vec![],
                current_player: None,
                is_game_over: true,
                winner: Some(GameOutcome::Draw),
            },
        };

        let serialized = bincode::serialize(&packet).unwrap();
        match bincode::deserialize::<Packet>(&serialized).unwrap() {
            Packet::GameEnded { snapshot } => {
                assert!(snapshot.is_game_over);
                assert_eq!(snapshot.winner, Some(GameOutcome::Draw));
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }
}
