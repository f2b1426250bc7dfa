//! Numerical stability utilities.
//!
//! Provides guarded versions of the transforms used to keep weight vectors
//! on the probability simplex while the optimizers work in unconstrained
//! coordinates.
//!
//! # Provided items
//! - [`GENERAL_TOL`]: generic absolute tolerance for "effectively zero".
//! - [`EIGEN_EPS`]: relative eigenvalue cutoff used for effective rank.
//! - [`SIMPLEX_TOL`]: allowed distance of a returned weight vector from the
//!   simplex.
//! - [`LOG_WEIGHT_FLOOR`]: floor applied before taking logs of weights.
//! - [`safe_softmax`]: max-shifted softmax, ℝᴾ → interior of the simplex.
//! - [`softmax_inv`]: a logit vector whose softmax reproduces given weights.
//! - [`renormalize_simplex`]: clamp negatives to zero and rescale to sum 1.
use ndarray::{Array1, ArrayView1};

/// Absolute tolerance below which a scalar is treated as zero.
pub const GENERAL_TOL: f64 = 1e-12;

/// Relative cutoff `λ_i > EIGEN_EPS · λ_max` for counting an eigenvalue as
/// nonzero when estimating effective rank.
pub const EIGEN_EPS: f64 = 1e-10;

/// Weight vectors returned to callers lie within this distance of the
/// simplex (per-entry nonnegativity and unit sum).
pub const SIMPLEX_TOL: f64 = 1e-6;

/// Smallest weight passed to `ln` in [`softmax_inv`].
pub const LOG_WEIGHT_FLOOR: f64 = 1e-12;

/// Numerically stable softmax.
///
/// Subtracts `max(θ)` before exponentiating so no term overflows; the
/// largest entry always contributes `exp(0) = 1`, so the denominator is at
/// least one.
///
/// # Parameters
/// - `theta`: finite logits.
///
/// # Returns
/// - Weights `v_i = exp(θ_i − m) / Σ_j exp(θ_j − m)`, nonnegative, summing
///   to one. An empty input yields an empty output.
pub fn safe_softmax(theta: ArrayView1<f64>) -> Array1<f64> {
    if theta.is_empty() {
        return Array1::zeros(0);
    }
    let max = theta.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
    let exps = theta.mapv(|x| (x - max).exp());
    let denom = exps.sum();
    exps / denom
}

/// Logits whose softmax reproduces `weights` (up to [`LOG_WEIGHT_FLOOR`]).
///
/// Zero weights are floored, so `safe_softmax(softmax_inv(w))` is within
/// about `P · LOG_WEIGHT_FLOOR` of the normalized `w`. The result is
/// centered to mean zero; softmax is invariant to constant shifts.
pub fn softmax_inv(weights: ArrayView1<f64>) -> Array1<f64> {
    if weights.is_empty() {
        return Array1::zeros(0);
    }
    let logs = weights.mapv(|w| w.max(LOG_WEIGHT_FLOOR).ln());
    let mean = logs.sum() / logs.len() as f64;
    logs - mean
}

/// Project small numerical violations back onto the simplex.
///
/// Negative entries become zero and the vector is divided by its sum. When
/// the clamped sum is not positive the uniform vector is returned instead.
///
/// # Notes
/// - This is a clean-up step for iterates that are already feasible to
///   solver tolerance, not a Euclidean projection.
pub fn renormalize_simplex(weights: &mut Array1<f64>) {
    weights.mapv_inplace(|w| if w.is_finite() && w > 0.0 { w } else { 0.0 });
    let total = weights.sum();
    if total > GENERAL_TOL {
        weights.mapv_inplace(|w| w / total);
    } else if !weights.is_empty() {
        let uniform = 1.0 / weights.len() as f64;
        weights.fill(uniform);
    }
}
