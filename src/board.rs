use crate::{
    error::{AgentError, Result},
    types::{Move, Player, Point},
};

/// Number of stones in a row needed to win. Longer lines also win.
pub const WIN_LENGTH: usize = 5;

const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub num_rows: usize,
    pub num_cols: usize,
    grid: Vec<Option<Player>>,
    stones: usize,
}

impl Board {
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            grid: vec![None; num_rows * num_cols],
            stones: 0,
        }
    }

    pub fn is_on_grid(&self, point: Point) -> bool {
        (1..=self.num_rows).contains(&point.row) && (1..=self.num_cols).contains(&point.col)
    }

    pub fn get(&self, point: Point) -> Option<Player> {
        if !self.is_on_grid(point) {
            return None;
        }
        self.grid[self.offset(point)]
    }

    pub fn place_stone(&mut self, player: Player, point: Point) -> Result<()> {
        if !self.is_on_grid(point) || self.get(point).is_some() {
            return Err(AgentError::IllegalMove(Move::Play(point)));
        }
        let offset = self.offset(point);
        self.grid[offset] = Some(player);
        self.stones += 1;
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.stones == self.grid.len()
    }

    /// Length of the longest line through `point` made of `player`'s stones.
    pub fn line_length(&self, player: Player, point: Point) -> usize {
        DIRECTIONS
            .iter()
            .map(|&(dr, dc)| {
                1 + self.run_length(player, point, dr, dc)
                    + self.run_length(player, point, -dr, -dc)
            })
            .max()
            .unwrap_or(0)
    }

    fn run_length(&self, player: Player, from: Point, dr: isize, dc: isize) -> usize {
        let mut count = 0;
        let (mut row, mut col) = (from.row as isize, from.col as isize);
        loop {
            row += dr;
            col += dc;
            if row < 1 || col < 1 {
                return count;
            }
            let next = Point::new(row as usize, col as usize);
            if self.get(next) != Some(player) {
                return count;
            }
            count += 1;
        }
    }

    fn offset(&self, point: Point) -> usize {
        (point.row - 1) * self.num_cols + (point.col - 1)
    }
}

/// A gomoku position together with the player to move.
///
/// States are immutable: [`GameState::apply_move`] returns the successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub next_player: Player,
    pub previous_move: Option<Move>,
    winner: Option<Player>,
}

impl GameState {
    /// Empty board, Black to move.
    pub fn new_game(width: usize, height: usize) -> Self {
        Self {
            board: Board::new(height, width),
            next_player: Player::Black,
            previous_move: None,
            winner: None,
        }
    }

    pub fn apply_move(&self, mv: Move) -> Result<GameState> {
        if !self.is_valid_move(mv) {
            return Err(AgentError::IllegalMove(mv));
        }

        let mut board = self.board.clone();
        let mut winner = None;
        match mv {
            Move::Play(point) => {
                board.place_stone(self.next_player, point)?;
                if board.line_length(self.next_player, point) >= WIN_LENGTH {
                    winner = Some(self.next_player);
                }
            }
            Move::Resign => winner = Some(self.next_player.other()),
            Move::Pass => {}
        }

        Ok(GameState {
            board,
            next_player: self.next_player.other(),
            previous_move: Some(mv),
            winner,
        })
    }

    pub fn is_valid_move(&self, mv: Move) -> bool {
        if self.is_over() {
            return false;
        }
        match mv {
            Move::Pass | Move::Resign => true,
            Move::Play(point) => self.board.is_on_grid(point) && self.board.get(point).is_none(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
            || self.previous_move == Some(Move::Resign)
            || self.board.is_full()
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_alternates_players() {
        let state = GameState::new_game(9, 9);
        let state = state.apply_move(Move::play(Point::new(5, 5))).unwrap();

        assert_eq!(state.next_player, Player::White);
        assert_eq!(state.board.get(Point::new(5, 5)), Some(Player::Black));
        assert!(!state.is_valid_move(Move::play(Point::new(5, 5))));
        assert!(state.is_valid_move(Move::play(Point::new(5, 6))));
    }

    #[test]
    fn test_off_grid_is_illegal() {
        let state = GameState::new_game(9, 7);
        assert!(!state.is_valid_move(Move::play(Point::new(0, 1))));
        assert!(!state.is_valid_move(Move::play(Point::new(8, 1))));
        assert!(!state.is_valid_move(Move::play(Point::new(1, 10))));
        assert!(state.is_valid_move(Move::play(Point::new(7, 9))));
        assert!(state.apply_move(Move::play(Point::new(8, 1))).is_err());
    }

    #[test]
    fn test_five_in_a_row_wins() {
        let mut state = GameState::new_game(9, 9);
        for col in 1..=4 {
            state = state.apply_move(Move::play(Point::new(1, col))).unwrap();
            state = state.apply_move(Move::play(Point::new(9, col))).unwrap();
        }
        assert!(!state.is_over());

        state = state.apply_move(Move::play(Point::new(1, 5))).unwrap();
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(Player::Black));
        assert!(!state.is_valid_move(Move::play(Point::new(5, 5))));
        assert!(!state.is_valid_move(Move::Pass));
    }

    #[test]
    fn test_diagonal_win() {
        let mut state = GameState::new_game(9, 9);
        for i in 1..=4 {
            state = state.apply_move(Move::play(Point::new(1, 9 - i))).unwrap();
            state = state.apply_move(Move::play(Point::new(i + 1, i + 1))).unwrap();
        }
        // Black plays elsewhere, then White completes 2,2 .. 6,6.
        state = state.apply_move(Move::play(Point::new(9, 1))).unwrap();
        state = state.apply_move(Move::play(Point::new(6, 6))).unwrap();
        assert_eq!(state.winner(), Some(Player::White));
    }

    #[test]
    fn test_resign_ends_game() {
        let state = GameState::new_game(5, 5);
        let state = state.apply_move(Move::Resign).unwrap();
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(Player::White));
    }

    #[test]
    fn test_full_board_is_over() {
        let mut state = GameState::new_game(2, 2);
        for (row, col) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            state = state.apply_move(Move::play(Point::new(row, col))).unwrap();
        }
        assert!(state.board.is_full());
        assert!(state.is_over());
        assert_eq!(state.winner(), None);
    }
}
