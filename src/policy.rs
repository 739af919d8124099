use std::cmp::Ordering;

use ndarray::{Array1, ArrayView1};
use rand::Rng;

use crate::{
    config::SelectorConfig,
    error::{AgentError, Result},
};

/// Sharpen, clip and renormalise a probability vector.
///
/// Each entry is raised to `config.exponent`, clipped into
/// `[epsilon, 1 - epsilon]` and the result divided by its sum. Cubing
/// (the default) keeps the order of the entries while widening the gap
/// between likely and unlikely moves.
pub fn sharpen(probs: ArrayView1<f32>, config: &SelectorConfig) -> Result<Array1<f32>> {
    if probs.is_empty() {
        return Err(AgentError::InvalidProbabilities("empty probability vector".into()));
    }
    if let Some(bad) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(AgentError::InvalidProbabilities(format!(
            "probabilities must be finite and non-negative, got {bad}"
        )));
    }

    if !config.exponent.is_finite() || !config.epsilon.is_finite() {
        return Err(AgentError::InvalidProbabilities(format!(
            "exponent {} and epsilon {} must be finite",
            config.exponent, config.epsilon
        )));
    }

    let eps = config.epsilon.clamp(0.0, 0.5);
    let mut adjusted = probs.mapv(|p| p.powf(config.exponent).clamp(eps, 1.0 - eps));

    let sum = adjusted.sum();
    if sum <= 0.0 || sum.is_nan() {
        return Err(AgentError::InvalidProbabilities(
            "adjusted probabilities sum to zero".into(),
        ));
    }
    adjusted /= sum;
    Ok(adjusted)
}

/// Draw a full ordering of `0..weights.len()` without replacement.
///
/// Each index gets the key `ln(u) / w` with `u` uniform in `(0, 1]` and
/// the indices are sorted by descending key (Efraimidis-Spirakis). The
/// resulting order has the same distribution as repeatedly drawing one
/// index proportional to its weight and removing it. Zero weights always
/// land at the end.
pub fn rank_moves<R: Rng + ?Sized>(weights: ArrayView1<f32>, rng: &mut R) -> Vec<usize> {
    let mut keyed: Vec<(f64, usize)> = weights
        .iter()
        .enumerate()
        .map(|(index, &weight)| {
            let u = 1.0 - rng.random::<f64>();
            let key = if weight > 0.0 {
                u.ln() / weight as f64
            } else {
                f64::NEG_INFINITY
            };
            (key, index)
        })
        .collect();

    keyed.sort_by(|a, b| match b.0.total_cmp(&a.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });

    keyed.into_iter().map(|(_, index)| index).collect()
}
