use ndarray::{Array1, Axis};
use rand::Rng;

use crate::{
    board::GameState,
    config::SelectorConfig,
    encoder::{BoardEncoder, Encoder},
    error::{AgentError, Result},
    model::{Model, OnnxModel, PersistModel},
    policy::{rank_moves, sharpen},
    storage::{AttrValue, Group},
    types::Move,
};

/// Plays moves by sampling from a policy network's output.
///
/// The agent owns its model and encoder exclusively; selection takes
/// `&mut self` because running a model session needs exclusive access.
pub struct DeepLearningAgent<M = OnnxModel, E = BoardEncoder> {
    model: M,
    encoder: E,
    config: SelectorConfig,
}

impl<M: Model, E: Encoder> DeepLearningAgent<M, E> {
    pub fn new(model: M, encoder: E) -> Self {
        Self {
            model,
            encoder,
            config: SelectorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SelectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Raw move probabilities for `state`, one entry per board point.
    pub fn predict(&mut self, state: &GameState) -> Result<Array1<f32>> {
        let encoded = self.encoder.encode(state)?;
        let batch = encoded.insert_axis(Axis(0));
        let output = self.model.predict(batch)?;

        let num_points = self.encoder.num_points();
        if output.nrows() == 0 {
            return Err(AgentError::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }
        if output.ncols() != num_points {
            return Err(AgentError::DimensionMismatch {
                expected: num_points,
                found: output.ncols(),
            });
        }
        Ok(output.row(0).to_owned())
    }

    /// Probabilities after sharpening and renormalisation, as used for
    /// sampling.
    pub fn move_probabilities(&mut self, state: &GameState) -> Result<Array1<f32>> {
        let probs = self.predict(state)?;
        sharpen(probs.view(), &self.config)
    }

    pub fn select_move(&mut self, state: &GameState) -> Result<Move> {
        self.select_move_with_rng(state, &mut rand::rng())
    }

    /// Rank every point by one weighted draw and play the first legal one.
    ///
    /// Fails with [`AgentError::NoLegalMove`] when the game state rejects
    /// every point, e.g. on a full board or after the game has ended.
    pub fn select_move_with_rng<R: Rng + ?Sized>(
        &mut self,
        state: &GameState,
        rng: &mut R,
    ) -> Result<Move> {
        let probs = self.move_probabilities(state)?;
        let ranked = rank_moves(probs.view(), rng);

        for (rank, &index) in ranked.iter().enumerate() {
            let mv = Move::play(self.encoder.decode_point_index(index));
            if state.is_valid_move(mv) {
                log::debug!(
                    "selected {mv:?} at rank {rank} (p = {:.4})",
                    probs[index]
                );
                return Ok(mv);
            }
            log::trace!("rejected illegal candidate {mv:?}");
        }

        log::debug!("no legal move among {} candidates", ranked.len());
        Err(AgentError::NoLegalMove)
    }

    /// Write the encoder metadata, selector settings and model into
    /// `group`.
    pub fn save(&self, group: &Group) -> Result<()>
    where
        M: PersistModel,
    {
        let encoder = group.create_group("encoder")?;
        encoder.set_attr("name", self.encoder.name())?;
        encoder.set_attr("board_width", self.encoder.board_width() as i64)?;
        encoder.set_attr("board_height", self.encoder.board_height() as i64)?;

        let selector = group.create_group("selector")?;
        selector.set_attr("exponent", self.config.exponent as f64)?;
        selector.set_attr("epsilon", self.config.epsilon as f64)?;

        let model = group.create_group("model")?;
        self.model.save_to_group(&model)?;

        log::debug!(
            "saved {} agent to {}",
            self.encoder.name(),
            group.path().display()
        );
        Ok(())
    }
}

impl<M: Model + PersistModel> DeepLearningAgent<M, BoardEncoder> {
    /// Rebuild an agent written by [`DeepLearningAgent::save`].
    ///
    /// Agents saved without selector settings get the defaults.
    pub fn load(group: &Group) -> Result<Self> {
        let model = M::load_from_group(&group.group("model")?)?;

        let encoder_group = group.group("encoder")?;
        let name = encoder_group.attr_str("name")?;
        let width = dimension(&encoder_group, "board_width")?;
        let height = dimension(&encoder_group, "board_height")?;
        let encoder = BoardEncoder::by_name(&name, (width, height))?;

        let config = match group.group("selector") {
            Ok(selector) => SelectorConfig::new()
                .with_exponent(attr_f32(&selector, "exponent")?)
                .with_epsilon(attr_f32(&selector, "epsilon")?),
            Err(AgentError::MissingGroup(_)) => SelectorConfig::default(),
            Err(err) => return Err(err),
        };

        log::debug!("loaded {name} agent ({width}x{height}) from {}", group.path().display());
        Ok(Self::new(model, encoder).with_config(config))
    }
}

fn dimension(group: &Group, key: &str) -> Result<usize> {
    usize::try_from(group.attr_int(key)?).map_err(|_| AgentError::AttributeType {
        key: key.to_string(),
        expected: "non-negative integer",
    })
}

fn attr_f32(group: &Group, key: &str) -> Result<f32> {
    match group.attr(key)? {
        AttrValue::Float(value) => Ok(value as f32),
        AttrValue::Int(value) => Ok(value as f32),
        AttrValue::Str(_) => Err(AgentError::AttributeType {
            key: key.to_string(),
            expected: "float",
        }),
    }
}
