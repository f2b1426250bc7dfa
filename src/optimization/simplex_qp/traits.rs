use crate::optimization::{
    errors::OptResult,
    simplex_qp::conditioning::Conditioning,
    validation::{verify_max_iter, verify_ridge, verify_tol_gap},
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// QpOptions — configuration of the inner simplex-constrained QP solver.
///
/// Fields
/// ------
/// - `tol_gap`: `f64`
///   Relative Frank–Wolfe duality-gap tolerance. The solver stops once
///   `gap(w) ≤ tol_gap · (1 + |f(w)|)`; `gap(w)` bounds `f(w) − f*` from
///   above.
/// - `max_iter`: `usize`
///   Iteration budget shared by the accelerated projected-gradient loop and
///   the active-set polish steps. Running out is reported as
///   `converged = false`, not as an error.
/// - `ridge`: `f64`
///   Ridge penalty `ρ‖w‖²` added to the inner objective. Zero by default; a
///   small positive value makes `W` unique when donor characteristics are
///   collinear, at the price of a slightly biased fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QpOptions {
    pub tol_gap: f64,
    pub max_iter: usize,
    pub ridge: f64,
}

impl QpOptions {
    /// Construct validated inner-solver options.
    ///
    /// Errors
    /// ------
    /// - `OptError::InvalidTolGap` for a non-positive or non-finite tolerance.
    /// - `OptError::InvalidMaxIter` for a zero iteration budget.
    /// - `OptError::InvalidRidge` for a negative or non-finite ridge.
    pub fn new(tol_gap: f64, max_iter: usize, ridge: f64) -> OptResult<Self> {
        verify_tol_gap(tol_gap)?;
        verify_max_iter(Some(max_iter))?;
        verify_ridge(ridge)?;
        Ok(QpOptions { tol_gap, max_iter, ridge })
    }
}

impl Default for QpOptions {
    fn default() -> Self {
        QpOptions { tol_gap: 1e-10, max_iter: 5_000, ridge: 0.0 }
    }
}

/// QpOutcome — result of one inner solve.
///
/// Fields
/// ------
/// - `weights`: donor weights `W`, nonnegative and summing to one.
/// - `loss`: unpenalized predictor loss
///   `(x1 − X0·W)ᵀ diag(V) (x1 − X0·W)`, ≥ 0.
/// - `gap`: final Frank–Wolfe duality gap of the penalized objective.
/// - `iterations`: projected-gradient iterations plus active-set steps.
/// - `converged`: whether the gap criterion was met within the budget.
/// - `conditioning`: spectral diagnostics of `X0ᵀ diag(V) X0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QpOutcome {
    pub weights: Array1<f64>,
    pub loss: f64,
    pub gap: f64,
    pub iterations: usize,
    pub converged: bool,
    pub conditioning: Conditioning,
}
