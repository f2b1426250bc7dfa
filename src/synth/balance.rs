//! Predictor balance table.
//!
//! Compares, for every predictor aggregation, the treated unit's value with
//! its synthetic counterpart `X0·W` and with the unweighted donor mean. Values
//! are on the original (unscaled) characteristic scale.
use crate::{
    panel::prep::PreparedData,
    synth::{
        errors::{SynthError, SynthResult},
        solver::WeightVectors,
    },
};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// One row of the balance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub label: String,
    pub treated: f64,
    pub synthetic: f64,
    pub donor_mean: f64,
    /// Predictor weight `V[i]`.
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorBalance {
    pub rows: Vec<BalanceRow>,
}

impl PredictorBalance {
    /// Build the table from prepared data and fitted weights.
    ///
    /// Errors
    /// ------
    /// - `SynthError::WeightLengthMismatch` when `W` or `V` does not match
    ///   the donor or predictor count.
    pub fn new(prepared: &PreparedData, weights: &WeightVectors) -> SynthResult<PredictorBalance> {
        if weights.w.len() != prepared.n_donors() {
            return Err(SynthError::WeightLengthMismatch {
                expected: prepared.n_donors(),
                found: weights.w.len(),
            });
        }
        if weights.v.len() != prepared.n_predictors() {
            return Err(SynthError::WeightLengthMismatch {
                expected: prepared.n_predictors(),
                found: weights.v.len(),
            });
        }

        let synthetic = prepared.donor_characteristics.dot(&weights.w);
        let rows = prepared
            .predictor_labels
            .iter()
            .zip(prepared.donor_characteristics.rows())
            .enumerate()
            .map(|(i, (label, donors))| BalanceRow {
                label: label.clone(),
                treated: prepared.treated_characteristics[i],
                synthetic: synthetic[i],
                donor_mean: donors.iter().mean(),
                importance: weights.v[i],
            })
            .collect();
        Ok(PredictorBalance { rows })
    }

    /// Largest `|treated − synthetic|` over all predictors.
    pub fn max_abs_gap(&self) -> f64 {
        self.rows.iter().map(|r| (r.treated - r.synthetic).abs()).fold(0.0, f64::max)
    }
}
