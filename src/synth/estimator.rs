//! SyntheticEstimator — synthetic outcome path from fitted donor weights.
//!
//! Purpose
//! -------
//! Combine donor outcome paths with `W` to produce the counterfactual path
//! of the treated unit, aligned period by period with the actual path, plus
//! the donor composition and pre/post fit summaries.
//!
//! Key behaviors
//! -------------
//! - `synthetic[t] = Σ_d W[d] · donor_paths[t, d]` over the full window.
//! - `gaps[t] = actual[t] − synthetic[t]`.
//! - `pre_mspe` is computed on the pre-intervention paths; `post_mspe` on
//!   the full-window periods after the last pre-intervention period (None
//!   when there are none).
//! - Composition keeps donors with `W[d] > threshold`, sorted by descending
//!   weight; ties keep donor order.
use crate::{
    panel::{data::Period, prep::PreparedData},
    synth::{
        errors::{SynthError, SynthResult},
        solver::WeightVectors,
    },
};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Default cut-off below which a donor is omitted from the composition.
pub const DEFAULT_WEIGHT_THRESHOLD: f64 = 1e-4;

/// A donor and its weight in the synthetic control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorWeight {
    pub unit: String,
    pub weight: f64,
}

/// SyntheticResult — actual vs synthetic outcome over the full window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticResult {
    pub periods: Vec<Period>,
    pub actual: Array1<f64>,
    pub synthetic: Array1<f64>,
    pub gaps: Array1<f64>,
    pub composition: Vec<DonorWeight>,
    pub pre_mspe: f64,
    pub post_mspe: Option<f64>,
}

impl SyntheticResult {
    /// Ratio `post_mspe / pre_mspe`; `None` without post periods or with a
    /// perfect pre-period fit.
    pub fn mspe_ratio(&self) -> Option<f64> {
        match self.post_mspe {
            Some(post) if self.pre_mspe > 0.0 => Some(post / self.pre_mspe),
            _ => None,
        }
    }
}

/// Build the synthetic path for fitted weights.
///
/// Errors
/// ------
/// - `SynthError::InvalidThreshold` for a negative or non-finite threshold.
/// - `SynthError::WeightLengthMismatch` when `weights.w` does not have one
///   entry per donor.
pub fn estimate(
    prepared: &PreparedData, weights: &WeightVectors, threshold: f64,
) -> SynthResult<SyntheticResult> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(SynthError::InvalidThreshold {
            threshold,
            reason: "Threshold must be finite and non-negative.",
        });
    }
    let w = &weights.w;
    if w.len() != prepared.n_donors() {
        return Err(SynthError::WeightLengthMismatch {
            expected: prepared.n_donors(),
            found: w.len(),
        });
    }

    let actual = prepared.treated_path.clone();
    let synthetic = prepared.donor_paths.dot(w);
    let gaps = &actual - &synthetic;

    let pre_synthetic = prepared.donor_pre_paths.dot(w);
    let pre_gaps = &prepared.treated_pre_path - &pre_synthetic;
    let pre_mspe = mean_square(pre_gaps.view());

    let post_mspe = prepared.pre_periods.last().and_then(|&last_pre| {
        let post: Array1<f64> = prepared
            .periods
            .iter()
            .zip(gaps.iter())
            .filter(|&(&period, _)| period > last_pre)
            .map(|(_, &gap)| gap)
            .collect();
        if post.is_empty() { None } else { Some(mean_square(post.view())) }
    });

    Ok(SyntheticResult {
        periods: prepared.periods.clone(),
        actual,
        synthetic,
        gaps,
        composition: composition(&prepared.donor_ids, w.view(), threshold),
        pre_mspe,
        post_mspe,
    })
}

/// Donors with weight above `threshold`, heaviest first.
pub fn composition(donor_ids: &[String], w: ArrayView1<f64>, threshold: f64) -> Vec<DonorWeight> {
    let mut kept: Vec<DonorWeight> = donor_ids
        .iter()
        .zip(w.iter())
        .filter(|&(_, &weight)| weight > threshold)
        .map(|(unit, &weight)| DonorWeight { unit: unit.clone(), weight })
        .collect();
    kept.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    kept
}

fn mean_square(values: ArrayView1<f64>) -> f64 {
    values.iter().map(|g| g * g).sum::<f64>() / values.len() as f64
}
