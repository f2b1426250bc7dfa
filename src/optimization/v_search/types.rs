//! Canonical numeric aliases for the outer predictor-weight search.
//!
//! - [`Theta`]: unconstrained logits of length `P − 1`; `V = softmax([0, θ])`.
//! - [`Cost`]: pre-intervention MSPE of the outcome.
//! - [`FnEvalMap`]: argmin's per-operator function-evaluation counters.
//! - [`NelderMeadSolver`], [`SearchState`]: the concrete argmin solver and
//!   state types.
use argmin::core::IterState;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use std::collections::HashMap;

/// Unconstrained search coordinates.
pub type Theta = Array1<f64>;

/// Outer objective value.
pub type Cost = f64;

/// Function-evaluation counts keyed by operator name.
pub type FnEvalMap = HashMap<String, u64>;

/// Default edge length of the initial Nelder–Mead simplex in θ-space.
pub const DEFAULT_INITIAL_STEP: f64 = 1.0;

/// Default number of seeded random starts in addition to the equal-V start.
pub const DEFAULT_RANDOM_STARTS: usize = 4;

pub type NelderMeadSolver = NelderMead<Theta, Cost>;

pub type SearchState = IterState<Theta, (), (), (), (), Cost>;
