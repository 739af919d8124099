use serde::{Deserialize, Serialize};

/// Controls how model probabilities are reshaped before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Power applied to each probability. Values above 1 sharpen the
    /// distribution towards the model's top picks.
    pub exponent: f32,

    /// Adjusted probabilities are clipped into `[epsilon, 1 - epsilon]`.
    pub epsilon: f32,
}

impl SelectorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sharpening exponent. Non-positive values are raised to a
    /// small positive power; non-finite values fall back to the default.
    pub fn with_exponent(mut self, exponent: f32) -> Self {
        self.exponent = if exponent.is_finite() {
            exponent.max(f32::EPSILON)
        } else {
            Self::default().exponent
        };
        self
    }

    /// Set the clipping bound, clamped into `[0, 0.5]`. Non-finite values
    /// fall back to the default.
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = if epsilon.is_finite() {
            epsilon.clamp(0.0, 0.5)
        } else {
            Self::default().epsilon
        };
        self
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            exponent: 3.0,
            epsilon: 1e-6,
        }
    }
}

/// Pure-Rust execution provider installed into ONNX Runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Tract,
    Candle,
}
