//! numerical_stability — guarded transforms and shared tolerances.
//!
//! Purpose
//! -------
//! Centralize the small numerical tolerances and the simplex transforms used
//! by both optimization stages, so the inner QP and the outer V search agree
//! on what "zero", "rank", and "on the simplex" mean.
//!
//! Key behaviors
//! -------------
//! - `safe_softmax` maps unconstrained logits θ to predictor weights
//!   `V = softmax(θ)` without overflow; `softmax_inv` provides starting
//!   logits for a given `V`.
//! - `renormalize_simplex` cleans up tiny feasibility violations of weight
//!   vectors returned by the solvers.
//! - Tolerances (`GENERAL_TOL`, `EIGEN_EPS`, `SIMPLEX_TOL`,
//!   `LOG_WEIGHT_FLOOR`) are shared constants.
//!
//! Conventions
//! -----------
//! - Pure functions on `ndarray` types; no logging, no I/O.
//! - Inputs are assumed finite; shape and finiteness validation happens in
//!   the callers.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, GENERAL_TOL, LOG_WEIGHT_FLOOR, SIMPLEX_TOL, renormalize_simplex, safe_softmax,
    softmax_inv,
};

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, GENERAL_TOL, SIMPLEX_TOL, renormalize_simplex, safe_softmax, softmax_inv,
    };
}
