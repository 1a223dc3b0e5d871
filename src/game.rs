use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// A player's sign on the board. X always belongs to player 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Sign assignment is deterministic from the connection-order id:
    /// odd ids play X, even ids play O.
    pub fn for_player(id: u8) -> Self {
        if id % 2 == 1 {
            Mark::X
        } else {
            Mark::O
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// Which of the two registered players holds the turn.
///
/// The idle player is always the other variant, so the orchestrator never
/// compares player objects to find it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    PlayerOne,
    PlayerTwo,
}

impl Turn {
    pub fn other(self) -> Self {
        match self {
            Turn::PlayerOne => Turn::PlayerTwo,
            Turn::PlayerTwo => Turn::PlayerOne,
        }
    }
}

/// The N-by-N match state machine. Pure logic, no I/O: the session
/// orchestrator owns the only handle and drives every mutation.
pub struct Match {
    size: usize,
    board: Vec<Vec<Option<Mark>>>,
    moves_made: usize,
    turn: Turn,
}

impl Match {
    /// Creates a fresh board of `size * size` empty cells. Player 1 moves
    /// first. `size` must be at least 1; the operator input path enforces it.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            board: vec![vec![None; size]; size],
            moves_made: 0,
            turn: Turn::PlayerOne,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells, which is also the highest valid choice.
    pub fn cell_count(&self) -> u32 {
        (self.size * self.size) as u32
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn moves_made(&self) -> usize {
        self.moves_made
    }

    // Choices are 1-based linear indices, numbered row by row.
    fn cell(&self, choice: u32) -> (usize, usize) {
        let index = (choice - 1) as usize;
        (index / self.size, index % self.size)
    }

    /// True iff `choice` addresses a cell on the board and that cell is
    /// still empty.
    pub fn is_valid(&self, choice: u32) -> bool {
        if choice < 1 || choice > self.cell_count() {
            return false;
        }
        let (row, col) = self.cell(choice);
        self.board[row][col].is_none()
    }

    /// Marks the addressed cell and counts the move.
    ///
    /// Precondition: `is_valid` has accepted `choice`. Not re-validated here.
    pub fn apply_move(&mut self, choice: u32, sign: Mark) {
        let (row, col) = self.cell(choice);
        self.board[row][col] = Some(sign);
        self.moves_made += 1;
    }

    /// Checked composition of `is_valid` and `apply_move` for callers that
    /// want the rejection as a value.
    pub fn try_apply(&mut self, choice: u32, sign: Mark) -> Result<()> {
        if !self.is_valid(choice) {
            return Err(ProtocolError::InvalidMove { choice });
        }
        self.apply_move(choice, sign);
        Ok(())
    }

    /// True iff any full row, any full column, the main diagonal, or the
    /// anti-diagonal is filled entirely with `sign`. Only the player who
    /// just moved can have gained a line, so this is evaluated for the
    /// mover alone.
    pub fn check_win(&self, sign: Mark) -> bool {
        let n = self.size;
        let owned = |row: usize, col: usize| self.board[row][col] == Some(sign);

        for i in 0..n {
            if (0..n).all(|j| owned(i, j)) {
                return true;
            }
            if (0..n).all(|j| owned(j, i)) {
                return true;
            }
        }

        (0..n).all(|i| owned(i, i)) || (0..n).all(|i| owned(i, n - i - 1))
    }

    /// True iff the board is full. Meaningful only once `check_win` has
    /// ruled out a win for the mover; a winning final move reports the win.
    pub fn check_tie(&self) -> bool {
        self.moves_made >= self.size * self.size
    }

    /// Hands the turn to the other player. Called only after a move that
    /// neither wins nor ties.
    pub fn switch_turn(&mut self) {
        self.turn = self.turn.other();
    }

    /// Human-readable grid: cells padded with one space each side and
    /// separated by `|`, rows separated by a dashed divider, empty cells
    /// shown as `-`. A derived view only, never used for logic.
    pub fn render(&self) -> String {
        let n = self.size;
        let mut out = String::from("\n");
        for row in 0..n {
            for col in 0..n {
                match self.board[row][col] {
                    Some(sign) => out.push_str(&format!(" {sign} ")),
                    None => out.push_str(" - "),
                }
                if col != n - 1 {
                    out.push('|');
                }
            }
            out.push('\n');
            if row != n - 1 {
                out.push_str(&"-".repeat(n * 4));
            }
            out.push('\n');
        }
        out.pop();
        out
    }
}
