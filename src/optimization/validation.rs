//! Validation helpers shared by the inner QP and the outer V search.
//!
//! Purpose
//! -------
//! Keep option checks (tolerances, iteration budgets, timeouts) and input
//! checks (lengths, finiteness, nonnegativity) in one place so both solver
//! stages reject bad inputs with the same [`OptError`] variants.
//!
//! Conventions
//! -----------
//! - Every helper returns `OptResult<()>` (or a cleaned value) and never
//!   panics.
//! - `Option`-valued tolerances are accepted as `None` (rule disabled).
use crate::optimization::{
    errors::{OptError, OptResult},
    numerical_stability::GENERAL_TOL,
};
use ndarray::{Array1, ArrayView1, ArrayView2};
use std::time::Duration;

pub fn verify_tol_sd(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolSd { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolSd { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

pub fn verify_tol_gap(tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidTolGap { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(OptError::InvalidTolGap { tol, reason: "Tolerance must be positive." });
    }
    Ok(())
}

pub fn verify_max_iter(max_iter: Option<usize>) -> OptResult<()> {
    if let Some(max_iter) = max_iter {
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
    }
    Ok(())
}

pub fn verify_timeout(timeout: Option<Duration>) -> OptResult<()> {
    if let Some(timeout) = timeout {
        if timeout.is_zero() {
            return Err(OptError::InvalidTimeout {
                millis: timeout.as_millis(),
                reason: "Timeout must be greater than zero.",
            });
        }
    }
    Ok(())
}

pub fn verify_initial_step(step: f64) -> OptResult<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(OptError::InvalidInitialStep {
            step,
            reason: "Initial step must be positive and finite.",
        });
    }
    Ok(())
}

pub fn verify_ridge(ridge: f64) -> OptResult<()> {
    if !ridge.is_finite() || ridge < 0.0 {
        return Err(OptError::InvalidRidge {
            ridge,
            reason: "Ridge penalty must be non-negative and finite.",
        });
    }
    Ok(())
}

pub fn validate_len(what: &'static str, expected: usize, found: usize) -> OptResult<()> {
    if expected != found {
        return Err(OptError::DimensionMismatch { what, expected, found });
    }
    Ok(())
}

pub fn validate_non_empty(what: &'static str, len: usize) -> OptResult<()> {
    if len == 0 {
        return Err(OptError::EmptyProblem { what });
    }
    Ok(())
}

pub fn validate_finite(what: &'static str, values: ArrayView1<f64>) -> OptResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::NonFiniteInput { what, index, value: values[index] }),
        None => Ok(()),
    }
}

/// Finiteness check on a matrix; `index` in the error is the row-major
/// flat position.
pub fn validate_finite_matrix(what: &'static str, values: ArrayView2<f64>) -> OptResult<()> {
    match values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(OptError::NonFiniteInput { what, index, value }),
        None => Ok(()),
    }
}

/// Check caller-supplied predictor weights and return them normalized to
/// sum one.
///
/// Errors
/// ------
/// - `DimensionMismatch` when `v.len() != p`.
/// - `InvalidFixedWeights` for non-finite or negative entries, or a sum that
///   is not positive.
pub fn validate_fixed_weights(v: ArrayView1<f64>, p: usize) -> OptResult<Array1<f64>> {
    validate_len("fixed V", p, v.len())?;
    if v.iter().any(|x| !x.is_finite()) {
        return Err(OptError::InvalidFixedWeights { reason: "entries must be finite." });
    }
    if v.iter().any(|&x| x < 0.0) {
        return Err(OptError::InvalidFixedWeights { reason: "entries must be non-negative." });
    }
    let total = v.sum();
    if total <= GENERAL_TOL {
        return Err(OptError::InvalidFixedWeights { reason: "entries must have a positive sum." });
    }
    Ok(v.mapv(|x| x / total))
}
