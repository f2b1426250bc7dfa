//! optimization — bi-level weight solver, numerical helpers, and unified
//! error surface.
//!
//! Purpose
//! -------
//! Compute the two weight vectors of a synthetic control: donor weights `W`
//! on the simplex `Δ_D` and predictor-importance weights `V` on `Δ_P`. The
//! inner stage solves a simplex-constrained quadratic program for `W` given
//! `V`; the outer stage searches `V` to minimize the pre-intervention
//! outcome MSPE.
//!
//! Key behaviors
//! -------------
//! - `simplex_qp`: projected-gradient (FISTA) solver of the inner QP with
//!   duality-gap stopping and conditioning diagnostics.
//! - `v_search`: argmin Nelder–Mead over softmax coordinates with seeded
//!   multi-start, plus equal and fixed `V` strategies.
//! - `numerical_stability`: shared tolerances and simplex transforms.
//! - `validation`: option and input checks shared by both stages.
//! - `errors`: a single [`OptError`](errors::OptError) enum and
//!   `OptResult<T>` alias; argmin errors are converted at the boundary.
//!
//! Invariants & assumptions
//! ------------------------
//! - Both weight vectors returned by this layer are nonnegative and sum to
//!   one within `SIMPLEX_TOL`.
//! - Inputs are validated once at the entry of each stage; invalid states
//!   are reported as `OptError`, not panics.
//! - Non-convergence is reported in outcomes, never raised.
//!
//! Conventions
//! -----------
//! - Characteristics are P×D and outcome paths T×D with donors in columns.
//! - The inner stage does not log; the outer stage emits `tracing` debug
//!   events per start.
//!
//! Downstream usage
//! ----------------
//! - `synth::solver` builds a [`PredictorFitProblem`](v_search::PredictorFitProblem)
//!   from prepared data and calls
//!   [`fit_predictor_weights`](v_search::fit_predictor_weights).
//! - Front-ends import `optimization::prelude::*`.

pub mod errors;
pub mod numerical_stability;
pub mod simplex_qp;
pub mod v_search;
pub mod validation;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_synthcontrol::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::numerical_stability::prelude::*;
    pub use super::simplex_qp::prelude::*;
    pub use super::v_search::prelude::*;
}
