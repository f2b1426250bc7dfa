//! simplex_qp — inner quadratic program over the probability simplex.
//!
//! Purpose
//! -------
//! For fixed predictor weights `V`, find the donor weights
//!
//! ```text
//! W*(V) = argmin_{w ∈ Δ_D} (x1 − X0·w)ᵀ diag(V) (x1 − X0·w) + ρ‖w‖²
//! ```
//!
//! where `Δ_D = { w ≥ 0, Σ w = 1 }`. This is the inner stage of the
//! synthetic-control fit and is called once per candidate `V` by the outer
//! search.
//!
//! Key behaviors
//! -------------
//! - [`problem`]: expands the objective into a D×D quadratic form.
//! - [`projection`]: sort-based Euclidean projection onto `Δ_D`.
//! - [`conditioning`]: `nalgebra` eigenvalues of the Gram matrix for the
//!   step size and an ill-conditioning flag.
//! - [`solver`]: FISTA with adaptive restart, stopped on the Frank–Wolfe
//!   duality gap.
//! - [`active_set`]: exact face solves on the support found by FISTA, so
//!   badly scaled `V` does not exhaust the iteration budget.
//! - [`traits`]: [`QpOptions`] and [`QpOutcome`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Returned weights are nonnegative and sum to one within
//!   [`SIMPLEX_TOL`](crate::optimization::numerical_stability::SIMPLEX_TOL).
//! - With `ρ = 0` and collinear donor characteristics the minimizer may not
//!   be unique; this is reported through `Conditioning::ill_conditioned`
//!   rather than resolved.
//! - Iteration-budget exhaustion is a soft outcome (`converged = false`).
//!
//! Conventions
//! -----------
//! - Characteristics are `ndarray` views: `x1` of length P, `x0` of shape
//!   P×D with donors in columns.
//! - No logging; callers decide how to surface diagnostics.

pub mod active_set;
pub mod conditioning;
pub mod problem;
pub mod projection;
pub mod solver;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::conditioning::Conditioning;
pub use self::problem::predictor_loss;
pub use self::projection::project_simplex;
pub use self::solver::solve_simplex_qp;
pub use self::traits::{QpOptions, QpOutcome};

pub mod prelude {
    pub use super::{Conditioning, QpOptions, QpOutcome, solve_simplex_qp};
}
