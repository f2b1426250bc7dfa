//! SynthModel — end-to-end synthetic-control fit.
//!
//! [`SynthModel::fit`] runs DataPrep → WeightSolver → SyntheticEstimator on
//! a panel and an analysis spec and caches every intermediate product. The
//! accessors return [`SynthError::ModelNotFitted`] until a fit succeeds; a
//! failed fit clears previously cached results.
use crate::{
    optimization::{simplex_qp::QpOptions, v_search::SearchOptions},
    panel::{data::PanelDataset, prep::PreparedData, prep::prepare, spec::AnalysisSpec},
    synth::{
        balance::PredictorBalance,
        errors::{SynthError, SynthResult},
        estimator::{DEFAULT_WEIGHT_THRESHOLD, SyntheticResult, estimate},
        solver::{PredictorScaling, WeightFit, WeightVectors, solve},
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// SynthOptions — configuration of a full fit.
///
/// Fields
/// ------
/// - `search`: predictor-weight strategy, stopping rules, multi-start.
/// - `qp`: inner donor-weight solver options.
/// - `scaling`: characteristic row scaling applied before fitting.
/// - `weight_threshold`: donors with `W[d]` at or below this value are
///   omitted from the reported composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthOptions {
    pub search: SearchOptions,
    pub qp: QpOptions,
    pub scaling: PredictorScaling,
    pub weight_threshold: f64,
}

impl SynthOptions {
    /// Errors
    /// ------
    /// - `SynthError::InvalidThreshold` for a negative or non-finite
    ///   threshold.
    pub fn new(
        search: SearchOptions, qp: QpOptions, scaling: PredictorScaling, weight_threshold: f64,
    ) -> SynthResult<Self> {
        if !weight_threshold.is_finite() || weight_threshold < 0.0 {
            return Err(SynthError::InvalidThreshold {
                threshold: weight_threshold,
                reason: "Threshold must be finite and non-negative.",
            });
        }
        Ok(SynthOptions { search, qp, scaling, weight_threshold })
    }
}

impl Default for SynthOptions {
    fn default() -> Self {
        SynthOptions {
            search: SearchOptions::default(),
            qp: QpOptions::default(),
            scaling: PredictorScaling::default(),
            weight_threshold: DEFAULT_WEIGHT_THRESHOLD,
        }
    }
}

/// Synthetic-control model for one treated unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthModel {
    /// Fit options.
    pub options: SynthOptions,
    /// Prepared inputs (populated after `fit`).
    pub prepared: Option<PreparedData>,
    /// Weight fit (populated after `fit`).
    pub weight_fit: Option<WeightFit>,
    /// Synthetic path (populated after `fit`).
    pub result: Option<SyntheticResult>,
}

impl SynthModel {
    pub fn new(options: SynthOptions) -> SynthModel {
        SynthModel { options, prepared: None, weight_fit: None, result: None }
    }

    /// Prepare the data, fit `(V, W)`, and build the synthetic path.
    ///
    /// ## Errors
    /// - `SynthError::Panel` from [`prepare`].
    /// - `SynthError::Optimization` from [`solve`].
    /// - `SynthError::InvalidThreshold` from [`estimate`].
    pub fn fit(&mut self, panel: &PanelDataset, spec: &AnalysisSpec) -> SynthResult<()> {
        self.prepared = None;
        self.weight_fit = None;
        self.result = None;

        let prepared = prepare(panel, spec)?;
        let weight_fit = solve(&prepared, &self.options)?;
        let result = estimate(&prepared, &weight_fit.weights, self.options.weight_threshold)?;
        info!(
            treated = %prepared.treated_unit,
            pre_mspe = result.pre_mspe,
            post_mspe = ?result.post_mspe,
            donors_used = result.composition.len(),
            "synthetic control estimated"
        );

        self.prepared = Some(prepared);
        self.weight_fit = Some(weight_fit);
        self.result = Some(result);
        Ok(())
    }

    pub fn prepared(&self) -> SynthResult<&PreparedData> {
        self.prepared.as_ref().ok_or(SynthError::ModelNotFitted)
    }

    pub fn weight_fit(&self) -> SynthResult<&WeightFit> {
        self.weight_fit.as_ref().ok_or(SynthError::ModelNotFitted)
    }

    pub fn weights(&self) -> SynthResult<&WeightVectors> {
        Ok(&self.weight_fit()?.weights)
    }

    pub fn result(&self) -> SynthResult<&SyntheticResult> {
        self.result.as_ref().ok_or(SynthError::ModelNotFitted)
    }

    /// Predictor balance of the fitted model.
    pub fn balance(&self) -> SynthResult<PredictorBalance> {
        PredictorBalance::new(self.prepared()?, self.weights()?)
    }
}
