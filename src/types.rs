use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }
}

/// A board coordinate. Rows and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Place a stone for the player to move
    Play(Point),
    Pass,
    Resign,
}

impl Move {
    pub fn play(point: Point) -> Self {
        Move::Play(point)
    }

    pub fn point(&self) -> Option<Point> {
        match self {
            Move::Play(point) => Some(*point),
            Move::Pass | Move::Resign => None,
        }
    }
}
