use ndarray::{Array3, ArrayViewMut2, Axis};

use crate::{
    board::GameState,
    error::{AgentError, Result},
    types::{Player, Point},
};

/// Maps game states and board points into the tensor and index space
/// consumed by a policy model.
///
/// Move indices are row-major: `index = width * (row - 1) + (col - 1)`.
pub trait Encoder {
    /// Registry name used when persisting an agent.
    fn name(&self) -> &'static str;

    fn board_width(&self) -> usize;

    fn board_height(&self) -> usize;

    fn num_planes(&self) -> usize;

    /// Encode `state` into a `[planes, height, width]` tensor.
    fn encode(&self, state: &GameState) -> Result<Array3<f32>>;

    fn encode_point(&self, point: Point) -> usize {
        self.board_width() * (point.row - 1) + (point.col - 1)
    }

    fn decode_point_index(&self, index: usize) -> Point {
        debug_assert!(index < self.num_points());
        Point::new(index / self.board_width() + 1, index % self.board_width() + 1)
    }

    fn num_points(&self) -> usize {
        self.board_width() * self.board_height()
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.num_planes(), self.board_height(), self.board_width())
    }
}

/// A single plane: `1.0` for the next player's stones, `-1.0` for the
/// opponent's and `0.0` for empty points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnePlaneEncoder {
    width: usize,
    height: usize,
}

impl OnePlaneEncoder {
    pub const NAME: &'static str = "oneplane";

    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

impl Encoder for OnePlaneEncoder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn board_width(&self) -> usize {
        self.width
    }

    fn board_height(&self) -> usize {
        self.height
    }

    fn num_planes(&self) -> usize {
        1
    }

    fn encode(&self, state: &GameState) -> Result<Array3<f32>> {
        check_board_size(self, state)?;
        let mut tensor = Array3::<f32>::zeros(self.shape());
        fill_plane(state, tensor.index_axis_mut(Axis(0), 0), |player| {
            if player == state.next_player { 1.0 } else { -1.0 }
        });
        Ok(tensor)
    }
}

/// Plane 0 holds the next player's stones, plane 1 the opponent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoPlaneEncoder {
    width: usize,
    height: usize,
}

impl TwoPlaneEncoder {
    pub const NAME: &'static str = "twoplane";

    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

impl Encoder for TwoPlaneEncoder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn board_width(&self) -> usize {
        self.width
    }

    fn board_height(&self) -> usize {
        self.height
    }

    fn num_planes(&self) -> usize {
        2
    }

    fn encode(&self, state: &GameState) -> Result<Array3<f32>> {
        check_board_size(self, state)?;
        let mut tensor = Array3::<f32>::zeros(self.shape());
        let me = state.next_player;
        fill_plane(state, tensor.index_axis_mut(Axis(0), 0), |p| (p == me) as u8 as f32);
        fill_plane(state, tensor.index_axis_mut(Axis(0), 1), |p| (p != me) as u8 as f32);
        Ok(tensor)
    }
}

/// Every encoder the crate knows how to rebuild from its stored name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEncoder {
    OnePlane(OnePlaneEncoder),
    TwoPlane(TwoPlaneEncoder),
}

impl BoardEncoder {
    /// Look up an encoder by the name returned from [`Encoder::name`].
    pub fn by_name(name: &str, (width, height): (usize, usize)) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AgentError::InvalidBoardSize { width, height });
        }
        match name {
            OnePlaneEncoder::NAME => Ok(OnePlaneEncoder::new(width, height).into()),
            TwoPlaneEncoder::NAME => Ok(TwoPlaneEncoder::new(width, height).into()),
            other => Err(AgentError::UnknownEncoder(other.to_string())),
        }
    }

    fn inner(&self) -> &dyn Encoder {
        match self {
            BoardEncoder::OnePlane(encoder) => encoder,
            BoardEncoder::TwoPlane(encoder) => encoder,
        }
    }
}

impl From<OnePlaneEncoder> for BoardEncoder {
    fn from(encoder: OnePlaneEncoder) -> Self {
        BoardEncoder::OnePlane(encoder)
    }
}

impl From<TwoPlaneEncoder> for BoardEncoder {
    fn from(encoder: TwoPlaneEncoder) -> Self {
        BoardEncoder::TwoPlane(encoder)
    }
}

impl Encoder for BoardEncoder {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn board_width(&self) -> usize {
        self.inner().board_width()
    }

    fn board_height(&self) -> usize {
        self.inner().board_height()
    }

    fn num_planes(&self) -> usize {
        self.inner().num_planes()
    }

    fn encode(&self, state: &GameState) -> Result<Array3<f32>> {
        self.inner().encode(state)
    }
}

fn check_board_size(encoder: &dyn Encoder, state: &GameState) -> Result<()> {
    let expected = encoder.num_points();
    let found = state.board.num_rows * state.board.num_cols;
    if state.board.num_rows != encoder.board_height()
        || state.board.num_cols != encoder.board_width()
    {
        return Err(AgentError::DimensionMismatch { expected, found });
    }
    Ok(())
}

fn fill_plane(state: &GameState, mut plane: ArrayViewMut2<f32>, value: impl Fn(Player) -> f32) {
    for row in 1..=state.board.num_rows {
        for col in 1..=state.board.num_cols {
            if let Some(player) = state.board.get(Point::new(row, col)) {
                plane[[row - 1, col - 1]] = value(player);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Move;

    #[test]
    fn test_point_index_round_trip() {
        let encoder = OnePlaneEncoder::new(9, 7);
        assert_eq!(encoder.num_points(), 63);
        assert_eq!(encoder.decode_point_index(0), Point::new(1, 1));
        assert_eq!(encoder.decode_point_index(8), Point::new(1, 9));
        assert_eq!(encoder.decode_point_index(9), Point::new(2, 1));
        assert_eq!(encoder.decode_point_index(62), Point::new(7, 9));

        for index in 0..encoder.num_points() {
            let point = encoder.decode_point_index(index);
            assert_eq!(encoder.encode_point(point), index);
        }
    }

    #[test]
    fn test_one_plane_perspective() {
        let encoder = OnePlaneEncoder::new(5, 5);
        let state = GameState::new_game(5, 5)
            .apply_move(Move::play(Point::new(1, 1)))
            .unwrap()
            .apply_move(Move::play(Point::new(2, 3)))
            .unwrap();

        // Black to move again: black stones are +1.
        let tensor = encoder.encode(&state).unwrap();
        assert_eq!(tensor.shape(), &[1, 5, 5]);
        assert_eq!(tensor[[0, 0, 0]], 1.0);
        assert_eq!(tensor[[0, 1, 2]], -1.0);
        assert_eq!(tensor.iter().filter(|&&v| v != 0.0).count(), 2);
    }

    #[test]
    fn test_two_plane_split() {
        let encoder = TwoPlaneEncoder::new(5, 4);
        let state = GameState::new_game(5, 4)
            .apply_move(Move::play(Point::new(4, 5)))
            .unwrap();

        // White to move: the black stone belongs in the opponent plane.
        let tensor = encoder.encode(&state).unwrap();
        assert_eq!(tensor.shape(), &[2, 4, 5]);
        assert_eq!(tensor[[0, 3, 4]], 0.0);
        assert_eq!(tensor[[1, 3, 4]], 1.0);
    }

    #[test]
    fn test_encode_rejects_wrong_board_size() {
        let encoder = OnePlaneEncoder::new(9, 9);
        let state = GameState::new_game(5, 5);
        assert!(matches!(
            encoder.encode(&state),
            Err(AgentError::DimensionMismatch { expected: 81, found: 25 })
        ));
    }

    #[test]
    fn test_registry_lookup() {
        let encoder = BoardEncoder::by_name("twoplane", (15, 13)).unwrap();
        assert_eq!(encoder.name(), "twoplane");
        assert_eq!(encoder.board_width(), 15);
        assert_eq!(encoder.board_height(), 13);
        assert_eq!(encoder.num_planes(), 2);

        let encoder = BoardEncoder::by_name("oneplane", (9, 9)).unwrap();
        assert_eq!(encoder, BoardEncoder::from(OnePlaneEncoder::new(9, 9)));
    }

    #[test]
    fn test_registry_rejects_unknown_names() {
        assert!(matches!(
            BoardEncoder::by_name("sevenplane", (9, 9)),
            Err(AgentError::UnknownEncoder(name)) if name == "sevenplane"
        ));
        assert!(matches!(
            BoardEncoder::by_name("oneplane", (0, 9)),
            Err(AgentError::InvalidBoardSize { width: 0, height: 9 })
        ));
    }
}
