//! Move selection for gomoku agents driven by a policy network.
//!
//!
//! This crate wraps an ONNX Runtime session behind the [`Model`] trait
//! and turns its per-point probability output into a move. The
//! probabilities are sharpened, clipped and renormalised, then every
//! point is ranked by a single weighted draw without replacement and the
//! first legal point is played.
//!
//! The principal type is [`DeepLearningAgent`], which owns a model and an
//! encoder. Agents can be saved to and loaded from a [`storage::Group`]
//! directory; encoders are rebuilt by name through [`BoardEncoder`].
//!
//! The library logs through the `log` facade and never installs a logger.

mod agent;
pub mod board;
mod config;
pub mod encoder;
mod error;
mod model;
pub mod policy;
pub mod storage;
mod types;

/// Main agent type.
pub use agent::DeepLearningAgent;

/// Error type produced by library operations.
pub use error::{AgentError, Result};

pub use board::GameState;
pub use config::{Backend, SelectorConfig};
pub use encoder::{BoardEncoder, Encoder, OnePlaneEncoder, TwoPlaneEncoder};
pub use model::{Model, OnnxModel, PersistModel, install_backend};
pub use types::{Move, Player, Point};
