//! Error types for the gomoku move-selection library.
//!
//! This crate uses `thiserror` to provide a single enumeration of the
//! errors that may occur while encoding positions, running the policy
//! model, ranking candidates and persisting agents. Variants wrap the
//! underlying errors from ONNX Runtime, ndarray, the filesystem and
//! serde_json so the caller has one error type to handle.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Move;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Wraps an error returned by the underlying ONNX Runtime bindings.
    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    /// Occurs when an ndarray has an unexpected shape during tensor
    /// preparation or extraction.
    #[error("Tensor shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Raised when downloading a model over HTTP fails.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The stored encoder name has no entry in the encoder registry.
    #[error("Unknown encoder: {0}")]
    UnknownEncoder(String),

    #[error("Invalid board size: {width}x{height}")]
    InvalidBoardSize { width: usize, height: usize },

    /// A tensor, board or probability row does not have the size the
    /// encoder expects.
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid probabilities: {0}")]
    InvalidProbabilities(String),

    /// Every ranked candidate was rejected by the game state.
    #[error("No legal move available")]
    NoLegalMove,

    #[error("Illegal move: {0:?}")]
    IllegalMove(Move),

    #[error("Missing group: {}", .0.display())]
    MissingGroup(PathBuf),

    #[error("Missing attribute '{key}' in group {}", .group.display())]
    MissingAttribute { group: PathBuf, key: String },

    #[error("Attribute '{key}' is not of type {expected}")]
    AttributeType { key: String, expected: &'static str },

    #[error("Invalid group, attribute or dataset name: {0:?}")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
