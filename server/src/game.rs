//! Authoritative game room: seats at most two players, enforces turn
//! order, applies validated moves to the board and decides the outcome.
//!
//! The room is the single writer of the canonical state. Every entry
//! point is a plain method call; the network layer serializes calls by
//! processing one connection event at a time.

use log::{debug, info};
use shared::{
    Board, GameOutcome, GameSnapshot, MoveRejection, PlayerColor, PlayerId, PlayerState, Side,
    BOARD_ORIGIN_X, BOARD_ORIGIN_Y, CELL_HEIGHT, CELL_WIDTH, POINTS_PER_BOX,
};

/// One seated player. Slot order is join order, so index 0 is always
/// the first joiner.
#[derive(Debug, Clone)]
struct PlayerSlot {
    id: PlayerId,
    score: u32,
    color: PlayerColor,
}

/// Result of [`GameRoom::submit_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Legal move: the wall is drawn, scores and turn are updated.
    Applied {
        /// Coordinates of boxes the mover closed with this move.
        completed: Vec<(usize, usize)>,
        /// True when this move completed the last open box.
        game_over: bool,
    },
    /// The current player submitted an invalid edge. The board and
    /// scores are untouched but the turn passes to the opponent, so
    /// the new state still has to reach the clients.
    Forfeited(MoveRejection),
    /// Dropped without any state change: out of turn, or no game in
    /// progress. Nothing is broadcast.
    Ignored(IgnoreReason),
}

/// Why a submission was a pure no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Fewer than two players seated, or the game already ended.
    NotInProgress,
    NotYourTurn,
}

/// Authoritative state for one game room.
pub struct GameRoom {
    rows: usize,
    cols: usize,
    board: Board,
    slots: Vec<PlayerSlot>,
    current_player: Option<PlayerId>,
    is_game_over: bool,
    winner: Option<GameOutcome>,
}

impl GameRoom {
    /// Creates an empty room with a fresh board of the given shape.
    /// Zero dimensions are clamped to the smallest legal board; the CLI
    /// validates user input before we get here.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            board: Self::fresh_board(rows, cols),
            slots: Vec::new(),
            current_player: None,
            is_game_over: false,
            winner: None,
        }
    }

    fn fresh_board(rows: usize, cols: usize) -> Board {
        // Dimensions are clamped to >= 1, so this cannot fail.
        Board::new(
            rows,
            cols,
            BOARD_ORIGIN_X,
            BOARD_ORIGIN_Y,
            CELL_WIDTH,
            CELL_HEIGHT,
        )
        .expect("clamped board dimensions")
    }

    pub fn player_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= 2
    }

    fn slot(&self, id: PlayerId) -> Option<&PlayerSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    /// The opponent of `id`, when both seats are taken.
    fn other_player(&self, id: PlayerId) -> Option<PlayerId> {
        self.slots
            .iter()
            .map(|slot| slot.id)
            .find(|other| *other != id)
    }

    /// Seats a new player. Returns the assigned color, or `None` when
    /// both seats are taken and the connection must be refused.
    ///
    /// The first joiner receives the first move; the second joiner gets
    /// the complementary color.
    pub fn add_player(&mut self, id: PlayerId) -> Option<PlayerColor> {
        if self.is_full() {
            return None;
        }

        let color = match self.slots.first() {
            None => PlayerColor::Red,
            Some(first) => first.color.other(),
        };
        self.slots.push(PlayerSlot {
            id,
            score: 0,
            color,
        });

        if self.current_player.is_none() {
            self.current_player = Some(id);
        }

        info!(
            "Player {} joined as {} ({}/2 seats taken)",
            id,
            color,
            self.slots.len()
        );
        Some(color)
    }

    /// Removes a departing player and repairs the room state.
    ///
    /// With one survivor the room resets to a fresh game bound to them,
    /// rather than leaving a half-populated game waiting on a vanished
    /// opponent. With no players left everything is cleared.
    pub fn remove_player(&mut self, id: PlayerId) {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        if self.slots.len() == before {
            return;
        }
        info!("Player {} left ({} remaining)", id, self.slots.len());

        self.board = Self::fresh_board(self.rows, self.cols);
        self.is_game_over = false;
        self.winner = None;
        for slot in &mut self.slots {
            slot.score = 0;
        }
        self.current_player = self.slots.first().map(|slot| slot.id);
    }

    /// Applies one submitted move if it is legal, advancing scores, the
    /// turn and possibly the game-over flag.
    pub fn submit_move(
        &mut self,
        id: PlayerId,
        row: usize,
        col: usize,
        side: Side,
    ) -> MoveOutcome {
        if self.is_game_over || !self.is_full() {
            return MoveOutcome::Ignored(IgnoreReason::NotInProgress);
        }
        if self.current_player != Some(id) {
            debug!("Dropping out-of-turn move from player {}", id);
            return MoveOutcome::Ignored(IgnoreReason::NotYourTurn);
        }

        // Server-side revalidation of the structural move; client-side
        // hit testing is never trusted.
        if let Err(rejection) = self.board.validate_move(row, col, side) {
            debug!(
                "Player {} forfeits the turn on invalid move: {}",
                id, rejection
            );
            self.current_player = self.other_player(id);
            return MoveOutcome::Forfeited(rejection);
        }

        let color = self
            .slot(id)
            .map(|slot| slot.color)
            .unwrap_or(PlayerColor::Red);
        self.board.set_wall(row, col, side);
        let completed = self.board.claim_completions(row, col, id, color);

        if !completed.is_empty() {
            let award = completed.len() as u32 * POINTS_PER_BOX;
            if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == id) {
                slot.score += award;
                info!(
                    "Player {} closed {} box(es), score now {}",
                    id,
                    completed.len(),
                    slot.score
                );
            }
        }

        // One toggle per accepted move, no matter how many boxes closed.
        self.current_player = self.other_player(id);

        let game_over = self.check_terminal();
        MoveOutcome::Applied {
            completed,
            game_over,
        }
    }

    /// Restarts a finished game for the same two players.
    ///
    /// Only honored after game over and only from a seated player.
    /// Scores reset, the board is rebuilt, identities and colors stay,
    /// and the first joiner moves first again.
    pub fn restart(&mut self, id: PlayerId) -> bool {
        if !self.is_game_over || self.slot(id).is_none() {
            return false;
        }

        self.board = Self::fresh_board(self.rows, self.cols);
        self.is_game_over = false;
        self.winner = None;
        for slot in &mut self.slots {
            slot.score = 0;
        }
        self.current_player = self.slots.first().map(|slot| slot.id);
        info!("Game restarted by player {}", id);
        true
    }

    /// Sets the terminal flags once every box is completed.
    fn check_terminal(&mut self) -> bool {
        if self.is_game_over || !self.board.all_completed() {
            return self.is_game_over;
        }

        self.is_game_over = true;
        self.winner = Some(self.determine_winner());
        self.current_player = None;
        info!("Game over: {:?}", self.winner);
        true
    }

    fn determine_winner(&self) -> GameOutcome {
        match (self.slots.first(), self.slots.get(1)) {
            (Some(first), Some(second)) if first.score > second.score => {
                GameOutcome::Winner(first.id)
            }
            (Some(first), Some(second)) if first.score < second.score => {
                GameOutcome::Winner(second.id)
            }
            _ => GameOutcome::Draw,
        }
    }

    /// The full canonical state, as pushed to clients.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.clone(),
            players: self
                .slots
                .iter()
                .map(|slot| PlayerState {
                    id: slot.id,
                    score: slot.score,
                    color: slot.color,
                })
                .collect(),
            current_player: self.current_player,
            is_game_over: self.is_game_over,
            winner: self.winner,
        }
    }
}
