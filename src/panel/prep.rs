//! Data preparation — panel + spec → characteristic matrices and outcome paths.
//!
//! Purpose
//! -------
//! Turn a validated [`PanelDataset`] and an [`AnalysisSpec`] into the flat
//! numeric structures consumed by the weight solver and the estimator. This
//! is the only place where unit identifiers and periods are resolved; the
//! layers downstream see plain `ndarray` vectors and matrices.
//!
//! Key behaviors
//! -------------
//! - Runs [`AnalysisSpec::validate`] first, then checks that every referenced
//!   unit and predictor column exists, all before touching any values.
//! - Verifies complete coverage of every period required by any aggregation
//!   window, the pre-intervention window, and the full window. The first gap
//!   is reported as [`PanelError::MissingData`], scanning the treated unit
//!   first, then donors in spec order, periods ascending.
//! - Builds the characteristic vector `x1` (length P) and matrix `X0` (P×D),
//!   row `i` produced by `spec.predictors[i]`.
//! - Extracts outcome paths over the full window (`T×1`, `T×D`) and the
//!   pre-intervention window (`T0×1`, `T0×D`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Column `d` of every donor matrix corresponds to `donor_ids[d]`.
//! - Periods are contiguous integers; windows are inclusive.
//! - Pure and deterministic; the only side effect is a `tracing` debug event.
//!
//! Downstream usage
//! ----------------
//! - [`crate::synth::solver::solve`] fits `(V, W)` on the characteristic
//!   matrices and the pre-window paths.
//! - [`crate::synth::estimator::estimate`] combines `W` with the full-window
//!   donor paths.
use crate::panel::{
    data::{PanelDataset, Period},
    errors::{PanelError, PanelResult},
    spec::{AnalysisSpec, PredictorSource},
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// PreparedData — numeric inputs of a single synthetic-control fit.
///
/// Fields
/// ------
/// - `treated_characteristics`: `x1`, length P.
/// - `donor_characteristics`: `X0`, shape P×D.
/// - `predictor_labels`: row labels of `x1`/`X0`, length P.
/// - `treated_unit`: identifier of the treated unit.
/// - `donor_ids`: column labels of `X0` and of every donor path matrix.
/// - `periods`: full-window periods, ascending, length T.
/// - `treated_path`: treated outcome over `periods`.
/// - `donor_paths`: donor outcomes over `periods`, shape T×D.
/// - `pre_periods`: pre-intervention periods, ascending, length T0.
/// - `treated_pre_path`: treated outcome over `pre_periods`.
/// - `donor_pre_paths`: donor outcomes over `pre_periods`, shape T0×D.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedData {
    pub treated_characteristics: Array1<f64>,
    pub donor_characteristics: Array2<f64>,
    pub predictor_labels: Vec<String>,
    pub treated_unit: String,
    pub donor_ids: Vec<String>,
    pub periods: Vec<Period>,
    pub treated_path: Array1<f64>,
    pub donor_paths: Array2<f64>,
    pub pre_periods: Vec<Period>,
    pub treated_pre_path: Array1<f64>,
    pub donor_pre_paths: Array2<f64>,
}

impl PreparedData {
    /// Number of predictor aggregations (P).
    pub fn n_predictors(&self) -> usize {
        self.treated_characteristics.len()
    }

    /// Number of donors (D).
    pub fn n_donors(&self) -> usize {
        self.donor_ids.len()
    }

    /// Number of full-window periods (T).
    pub fn n_periods(&self) -> usize {
        self.periods.len()
    }
}

/// Build [`PreparedData`] from a panel and an analysis spec.
///
/// Parameters
/// ----------
/// - `panel`: validated panel dataset.
/// - `spec`: analysis configuration; validated again here.
///
/// Returns
/// -------
/// PanelResult<PreparedData>
///   Characteristic vector/matrix and outcome paths.
///
/// Errors
/// ------
/// - Invalid-spec family (see [`AnalysisSpec::validate`]), plus
///   `UnknownUnit` and `UnknownPredictor`, all before any aggregation.
/// - `MissingData { unit, period }` for the first uncovered pair.
pub fn prepare(panel: &PanelDataset, spec: &AnalysisSpec) -> PanelResult<PreparedData> {
    spec.validate()?;

    let units: Vec<&str> = std::iter::once(spec.treated_unit.as_str())
        .chain(spec.donor_units.iter().map(String::as_str))
        .collect();
    for unit in &units {
        if !panel.has_unit(unit) {
            return Err(PanelError::UnknownUnit { unit: unit.to_string() });
        }
    }

    let columns = resolve_columns(panel, spec)?;
    let required = required_periods(spec);
    for unit in &units {
        for &period in &required {
            if panel.get(unit, period).is_none() {
                return Err(PanelError::MissingData { unit: unit.to_string(), period });
            }
        }
    }

    let p = spec.predictors.len();
    let d = spec.donor_units.len();

    let treated_characteristics = Array1::from_shape_fn(p, |i| {
        aggregate_unit(panel, spec, &spec.treated_unit, i, columns[i])
    });
    let donor_characteristics = Array2::from_shape_fn((p, d), |(i, j)| {
        aggregate_unit(panel, spec, &spec.donor_units[j], i, columns[i])
    });

    let periods: Vec<Period> = spec.full_window.periods().collect();
    let pre_periods: Vec<Period> = spec.pre_window.periods().collect();
    let (treated_path, donor_paths) = outcome_paths(panel, spec, &periods);
    let (treated_pre_path, donor_pre_paths) = outcome_paths(panel, spec, &pre_periods);

    debug!(
        treated = %spec.treated_unit,
        n_predictors = p,
        n_donors = d,
        n_periods = periods.len(),
        n_pre_periods = pre_periods.len(),
        "prepared synthetic-control inputs"
    );

    Ok(PreparedData {
        treated_characteristics,
        donor_characteristics,
        predictor_labels: spec.predictors.iter().map(|pa| pa.label.clone()).collect(),
        treated_unit: spec.treated_unit.clone(),
        donor_ids: spec.donor_units.clone(),
        periods,
        treated_path,
        donor_paths,
        pre_periods,
        treated_pre_path,
        donor_pre_paths,
    })
}

// Column index per aggregation; `None` marks the outcome.
fn resolve_columns(panel: &PanelDataset, spec: &AnalysisSpec) -> PanelResult<Vec<Option<usize>>> {
    spec.predictors
        .iter()
        .map(|pa| match &pa.source {
            PredictorSource::Outcome => Ok(None),
            PredictorSource::Column(name) => panel
                .predictor_index(name)
                .map(Some)
                .ok_or_else(|| PanelError::UnknownPredictor { name: name.clone() }),
        })
        .collect()
}

fn required_periods(spec: &AnalysisSpec) -> BTreeSet<Period> {
    let mut required: BTreeSet<Period> = BTreeSet::new();
    required.extend(spec.pre_window.periods());
    required.extend(spec.full_window.periods());
    for pa in &spec.predictors {
        required.extend(pa.window.periods());
    }
    required
}

// Coverage has been verified by the caller, so every lookup succeeds.
fn aggregate_unit(
    panel: &PanelDataset, spec: &AnalysisSpec, unit: &str, row: usize, column: Option<usize>,
) -> f64 {
    let pa = &spec.predictors[row];
    let values: Vec<f64> = pa
        .window
        .periods()
        .filter_map(|t| panel.get(unit, t))
        .map(|obs| match column {
            Some(k) => obs.predictors[k],
            None => obs.outcome,
        })
        .collect();
    pa.op.aggregate(&values)
}

fn outcome_paths(
    panel: &PanelDataset, spec: &AnalysisSpec, periods: &[Period],
) -> (Array1<f64>, Array2<f64>) {
    let outcome = |unit: &str, t: Period| panel.get(unit, t).map_or(f64::NAN, |obs| obs.outcome);
    let treated = Array1::from_shape_fn(periods.len(), |k| outcome(&spec.treated_unit, periods[k]));
    let donors = Array2::from_shape_fn((periods.len(), spec.donor_units.len()), |(k, j)| {
        outcome(&spec.donor_units[j], periods[k])
    });
    (treated, donors)
}
