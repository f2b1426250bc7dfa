//! WeightSolver — fit predictor weights `V` and donor weights `W`.
//!
//! Purpose
//! -------
//! Bridge [`PreparedData`] into the optimization layer: optionally rescale
//! the characteristic rows, run the configured predictor-weight strategy,
//! and package `(V, W)` with losses and diagnostics as a [`WeightFit`].
//!
//! Key behaviors
//! -------------
//! - [`PredictorScaling::UnitVariance`] divides row `i` of `x1` and `X0` by
//!   the standard deviation of that predictor across the treated unit and
//!   all donors, so `V` compares predictors on a common scale.
//! - One donor ⇒ `W = [1]`; no outer search is run and `V` is equal unless
//!   fixed by the caller.
//! - Non-convergence and ill-conditioning are reported through
//!   [`FitDiagnostics`] and `tracing::warn!`, never as errors.
//!
//! Conventions
//! -----------
//! - `predictor_loss` and `V` refer to the scaled characteristics the
//!   solver actually saw; `predictor_scales` records the divisors.
use crate::{
    optimization::{
        errors::OptResult,
        numerical_stability::GENERAL_TOL,
        simplex_qp::Conditioning,
        v_search::{PredictorFitProblem, SearchOutcome, VStrategy, fit_predictor_weights},
    },
    panel::prep::PreparedData,
    synth::{errors::SynthError, model::SynthOptions},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::str::FromStr;
use tracing::{info, warn};

/// PredictorScaling — normalization of characteristic rows before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PredictorScaling {
    /// Divide each row by its standard deviation across all units; rows
    /// with zero spread are left as is.
    #[default]
    UnitVariance,
    /// Use raw characteristics.
    None,
}

impl FromStr for PredictorScaling {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unitvariance" | "unit_variance" => Ok(PredictorScaling::UnitVariance),
            "none" => Ok(PredictorScaling::None),
            _ => Err(SynthError::InvalidScaling { name: s.to_string() }),
        }
    }
}

/// WeightVectors — the fitted `(V, W)` pair.
///
/// `v` has one entry per predictor aggregation (row order of `X0`); `w` has
/// one entry per donor (column order of `X0`). Both lie on their simplex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVectors {
    pub v: Array1<f64>,
    pub w: Array1<f64>,
}

/// FitDiagnostics — how the weights were obtained.
///
/// Fields
/// ------
/// - `strategy`: strategy that produced `V`.
/// - `converged`, `status`, `outer_iterations`: outer search outcome of the
///   winning start (`converged = true`, zero iterations when no search ran).
/// - `n_starts`, `best_start`: multi-start bookkeeping.
/// - `inner_converged`, `inner_iterations`, `duality_gap`: inner QP at the
///   selected `V`.
/// - `conditioning`: spectral diagnostics at the selected `V`;
///   `conditioning.ill_conditioned` flags a possibly non-unique `W`.
/// - `predictor_scales`: per-row divisors applied before fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub strategy: VStrategy,
    pub converged: bool,
    pub status: String,
    pub outer_iterations: usize,
    pub n_starts: usize,
    pub best_start: usize,
    pub inner_converged: bool,
    pub inner_iterations: usize,
    pub duality_gap: f64,
    pub conditioning: Conditioning,
    pub predictor_scales: Array1<f64>,
}

/// WeightFit — output of [`solve`].
///
/// - `pre_fit_loss`: pre-intervention outcome MSPE at `W`, ≥ 0.
/// - `predictor_loss`: inner objective `(x1 − X0·W)ᵀ diag(V) (x1 − X0·W)`
///   on the scaled characteristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightFit {
    pub weights: WeightVectors,
    pub pre_fit_loss: f64,
    pub predictor_loss: f64,
    pub diagnostics: FitDiagnostics,
}

impl WeightFit {
    fn from_search(outcome: SearchOutcome, strategy: VStrategy, scales: Array1<f64>) -> WeightFit {
        let diagnostics = FitDiagnostics {
            strategy,
            converged: outcome.converged,
            status: outcome.status,
            outer_iterations: outcome.iterations,
            n_starts: outcome.starts.len(),
            best_start: outcome.best_start,
            inner_converged: outcome.qp.converged,
            inner_iterations: outcome.qp.iterations,
            duality_gap: outcome.qp.gap,
            conditioning: outcome.qp.conditioning,
            predictor_scales: scales,
        };
        WeightFit {
            weights: WeightVectors { v: outcome.v, w: outcome.qp.weights },
            pre_fit_loss: outcome.mspe,
            predictor_loss: outcome.qp.loss,
            diagnostics,
        }
    }
}

/// Rescale characteristic rows according to `scaling`.
///
/// Returns the scaled `x1`, the scaled `X0`, and the per-row divisors.
pub fn scale_characteristics(
    x1: ArrayView1<f64>, x0: ArrayView2<f64>, scaling: PredictorScaling,
) -> (Array1<f64>, Array2<f64>, Array1<f64>) {
    let scales = match scaling {
        PredictorScaling::None => Array1::ones(x1.len()),
        PredictorScaling::UnitVariance => Array1::from_iter(x0.rows().into_iter().zip(x1.iter()).map(
            |(row, treated)| {
                let sd = row.iter().chain(std::iter::once(treated)).std_dev();
                if sd.is_finite() && sd > GENERAL_TOL { sd } else { 1.0 }
            },
        )),
    };

    let mut x1_scaled = x1.to_owned();
    let mut x0_scaled = x0.to_owned();
    for (i, &scale) in scales.iter().enumerate() {
        x1_scaled[i] /= scale;
        x0_scaled.row_mut(i).mapv_inplace(|x| x / scale);
    }
    (x1_scaled, x0_scaled, scales)
}

/// Fit `(V, W)` for prepared data.
///
/// Parameters
/// ----------
/// - `prepared`: output of [`prepare`](crate::panel::prep::prepare).
/// - `options`: search, inner-solver, and scaling options.
///
/// Returns
/// -------
/// OptResult<WeightFit>
///   Weights on their simplices, losses, and diagnostics.
///
/// Errors
/// ------
/// - `OptError` for shape or finiteness problems, invalid fixed weights,
///   a non-finite objective, zero completed iterations, or backend
///   failures. Budget exhaustion is not an error.
pub fn solve(prepared: &PreparedData, options: &SynthOptions) -> OptResult<WeightFit> {
    let (x1, x0, scales) = scale_characteristics(
        prepared.treated_characteristics.view(),
        prepared.donor_characteristics.view(),
        options.scaling,
    );
    let problem = PredictorFitProblem::new(
        x1.view(),
        x0.view(),
        prepared.treated_pre_path.view(),
        prepared.donor_pre_paths.view(),
        options.qp,
    )?;

    let strategy = options.search.strategy.clone();
    let outcome = if prepared.n_donors() == 1 && strategy == VStrategy::Nested {
        let p = problem.n_predictors();
        let v = Array1::from_elem(p, 1.0 / p as f64);
        SearchOutcome::without_search(problem.evaluate(v.view())?, "Single donor")
    } else {
        fit_predictor_weights(&problem, &options.search)?
    };
    let fit = WeightFit::from_search(outcome, strategy, scales);

    let diagnostics = &fit.diagnostics;
    if !diagnostics.converged {
        warn!(
            status = %diagnostics.status,
            iterations = diagnostics.outer_iterations,
            "predictor-weight search stopped before converging; keeping best iterate"
        );
    }
    if !diagnostics.inner_converged {
        warn!(
            gap = diagnostics.duality_gap,
            iterations = diagnostics.inner_iterations,
            "donor-weight solve stopped before reaching the gap tolerance"
        );
    }
    if diagnostics.conditioning.ill_conditioned {
        warn!(
            effective_rank = diagnostics.conditioning.effective_rank,
            max_rank = diagnostics.conditioning.max_rank,
            "donor characteristics are collinear; donor weights may not be unique"
        );
    }
    info!(
        treated = %prepared.treated_unit,
        donors = prepared.n_donors(),
        predictors = prepared.n_predictors(),
        pre_fit_loss = fit.pre_fit_loss,
        predictor_loss = fit.predictor_loss,
        "synthetic-control weights fitted"
    );
    Ok(fit)
}
