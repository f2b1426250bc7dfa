//! synth — weight solver, synthetic estimator, and model orchestration.
//!
//! Purpose
//! -------
//! Turn [`PreparedData`](crate::panel::PreparedData) into a fitted synthetic
//! control: predictor weights `V`, donor weights `W`, and the synthetic
//! outcome path compared against the treated unit.
//!
//! Key behaviors
//! -------------
//! - [`solver`]: [`solve`] scales characteristics, runs the configured
//!   predictor-weight strategy, and returns a [`WeightFit`].
//! - [`estimator`]: [`estimate`] builds the synthetic path, gaps, pre/post
//!   MSPE, and the donor composition.
//! - [`balance`]: [`PredictorBalance`] compares treated, synthetic, and
//!   donor-mean characteristics.
//! - [`model`]: [`SynthModel`] runs the whole pipeline and caches results.
//!
//! Invariants & assumptions
//! ------------------------
//! - `W` and `V` lie on their simplices; `pre_fit_loss ≥ 0`.
//! - The synthetic path is always recomputed from `W` and the donor paths.
//! - Fits are deterministic given the inputs and `SearchOptions::seed`.
//!
//! Conventions
//! -----------
//! - This is the logging layer: `info!` on completed fits, `warn!` on
//!   non-convergence and ill-conditioning.
//! - Errors are [`SynthError`], wrapping panel and optimization errors.

pub mod balance;
pub mod errors;
pub mod estimator;
pub mod model;
pub mod solver;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::balance::{BalanceRow, PredictorBalance};
pub use self::errors::{SynthError, SynthResult};
pub use self::estimator::{DEFAULT_WEIGHT_THRESHOLD, DonorWeight, SyntheticResult, estimate};
pub use self::model::{SynthModel, SynthOptions};
pub use self::solver::{FitDiagnostics, PredictorScaling, WeightFit, WeightVectors, solve};

pub mod prelude {
    pub use super::{
        DonorWeight, PredictorBalance, PredictorScaling, SynthError, SynthModel, SynthOptions,
        SynthResult, SyntheticResult, WeightFit, WeightVectors, estimate, solve,
    };
}
