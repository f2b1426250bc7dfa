//! v_search — outer search for predictor weights `V`.
//!
//! Purpose
//! -------
//! Choose the predictor weights `V ∈ Δ_P` whose inner solution `W*(V)`
//! reproduces the treated unit's pre-intervention outcome path best:
//!
//! ```text
//! V* = argmin_{V ∈ Δ_P} (1/T0) ‖z1 − Z0·W*(V)‖²
//! ```
//!
//! Key behaviors
//! -------------
//! - [`fit_predictor_weights`] dispatches on [`VStrategy`]: the nested
//!   search, equal weights, or caller-fixed weights.
//! - [`search_predictor_weights`] runs argmin's Nelder–Mead from an
//!   equal-V start plus seeded Dirichlet starts and keeps the best.
//! - [`adapter`] bridges the bi-level objective into argmin's
//!   `CostFunction` in θ-coordinates, `V = softmax([0, θ])`.
//! - [`builders`] and [`run`] construct and execute one Nelder–Mead run.
//!
//! Invariants & assumptions
//! ------------------------
//! - The objective is non-smooth in `V` (active sets of `W*` change), so
//!   the search is derivative-free and only locally optimal.
//! - Budget or timeout exhaustion is a soft outcome: the best iterate is
//!   kept with `converged = false`.
//! - Given the same inputs and seed, results are reproducible.
//!
//! Conventions
//! -----------
//! - Per-start progress is emitted with `tracing::debug!`; argmin's own
//!   observer is attached only with the `obs_slog` feature and
//!   `SearchOptions::verbose`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the θ ↔ V mapping, solver construction, executor
//!   wiring, strategy dispatch, and multi-start selection.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::adapter::{Evaluation, PredictorFitProblem, VSearchAdapter, theta_to_v, v_to_theta};
pub use self::api::{fit_predictor_weights, search_predictor_weights};
pub use self::traits::{SearchOptions, SearchOutcome, SearchTolerances, StartOutcome, VStrategy};
pub use self::types::{Cost, FnEvalMap, Theta};

pub mod prelude {
    pub use super::{
        PredictorFitProblem, SearchOptions, SearchOutcome, SearchTolerances, VStrategy,
        fit_predictor_weights,
    };
}
