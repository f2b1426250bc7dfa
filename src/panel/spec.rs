//! Analysis specification — which unit is treated, which donors compete, and
//! how predictors are summarized.
//!
//! Purpose
//! -------
//! Collect the immutable configuration of one synthetic-control fit in a
//! single value. The spec fixes the row order of the characteristic
//! vector/matrix (through the order of [`PredictorAggregation`]s) and the
//! column order (through the order of donor units).
//!
//! Key behaviors
//! -------------
//! - [`PredictorSource`] distinguishes ordinary predictor columns from
//!   "special predictors" that aggregate the outcome itself over a
//!   sub-window.
//! - [`PredictorAggregation`] pairs a source with a window and a pluggable
//!   [`Aggregator`].
//! - [`AnalysisSpec::validate`] performs every check that does not need the
//!   panel: treated/donor disjointness, non-empty donor and predictor lists,
//!   duplicate donors, and window shapes.
//!
//! Invariants & assumptions
//! ------------------------
//! - The pre-intervention and full windows cover at least two periods each.
//! - Aggregation windows may cover a single period (e.g. the outcome in one
//!   reference year) but must not be reversed.
//! - Panel-dependent checks (unknown units/predictors, missing rows) are
//!   performed by [`prepare`](crate::panel::prep::prepare).
use crate::panel::{
    aggregation::{Aggregation, Aggregator},
    errors::{PanelError, PanelResult},
    window::TimeWindow,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Where the values of a predictor aggregation come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PredictorSource {
    /// A named predictor column of the panel.
    Column(String),
    /// The outcome series itself ("special predictor").
    Outcome,
}

/// PredictorAggregation — one row of the characteristic vector/matrix.
///
/// Fields
/// ------
/// - `source`: column or outcome to aggregate.
/// - `window`: periods entering the aggregate.
/// - `op`: aggregation operator.
/// - `label`: human-readable row label (e.g. `"mean(duration) 1980-1990"`).
#[derive(Debug, Clone)]
pub struct PredictorAggregation {
    pub source: PredictorSource,
    pub window: TimeWindow,
    pub op: Arc<dyn Aggregator>,
    pub label: String,
}

impl PredictorAggregation {
    /// Aggregate a named predictor column with a built-in or custom operator.
    pub fn column(
        name: impl Into<String>, window: TimeWindow, op: Arc<dyn Aggregator>,
    ) -> PredictorAggregation {
        let name = name.into();
        let label = format!("{}({}) {}-{}", op.name(), name, window.start, window.end);
        PredictorAggregation { source: PredictorSource::Column(name), window, op, label }
    }

    /// Mean of a named predictor column over `window`.
    pub fn mean(name: impl Into<String>, window: TimeWindow) -> PredictorAggregation {
        Self::column(name, window, Arc::new(Aggregation::Mean))
    }

    /// Special predictor aggregating the outcome over `window`.
    pub fn outcome(window: TimeWindow, op: Arc<dyn Aggregator>) -> PredictorAggregation {
        let label = format!("{}(outcome) {}-{}", op.name(), window.start, window.end);
        PredictorAggregation { source: PredictorSource::Outcome, window, op, label }
    }

    /// Mean outcome over `window`.
    pub fn outcome_mean(window: TimeWindow) -> PredictorAggregation {
        Self::outcome(window, Arc::new(Aggregation::Mean))
    }

    /// Replace the generated label.
    pub fn with_label(mut self, label: impl Into<String>) -> PredictorAggregation {
        self.label = label.into();
        self
    }
}

/// AnalysisSpec — immutable configuration of a single fit.
///
/// Fields
/// ------
/// - `treated_unit`: identifier of the treated unit.
/// - `donor_units`: ordered donor identifiers; this order is the column order
///   of the characteristic matrix and the index order of `W`.
/// - `predictors`: ordered aggregations; this order is the row order of the
///   characteristic vector/matrix and the index order of `V`.
/// - `pre_window`: optimization window used to fit the weights.
/// - `full_window`: window over which the synthetic path is produced.
#[derive(Debug, Clone)]
pub struct AnalysisSpec {
    pub treated_unit: String,
    pub donor_units: Vec<String>,
    pub predictors: Vec<PredictorAggregation>,
    pub pre_window: TimeWindow,
    pub full_window: TimeWindow,
}

impl AnalysisSpec {
    /// Build and validate a spec.
    ///
    /// Errors
    /// ------
    /// - Any invalid-spec variant of [`PanelError`]; see
    ///   [`AnalysisSpec::validate`].
    pub fn new(
        treated_unit: impl Into<String>, donor_units: Vec<String>,
        predictors: Vec<PredictorAggregation>, pre_window: TimeWindow, full_window: TimeWindow,
    ) -> PanelResult<Self> {
        let spec = AnalysisSpec {
            treated_unit: treated_unit.into(),
            donor_units,
            predictors,
            pre_window,
            full_window,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Panel-independent validation.
    ///
    /// Checks, in order:
    /// 1. the donor pool is non-empty;
    /// 2. the treated unit is not a donor;
    /// 3. no donor is repeated;
    /// 4. at least one predictor aggregation is given;
    /// 5. pre-intervention and full windows span two or more periods;
    /// 6. no aggregation window is reversed.
    ///
    /// Errors
    /// ------
    /// - `EmptyDonorPool`, `TreatedInDonorPool`, `DuplicateDonor`,
    ///   `EmptyPredictors`, `DegenerateWindow`, `InvalidAggregationWindow`.
    pub fn validate(&self) -> PanelResult<()> {
        if self.donor_units.is_empty() {
            return Err(PanelError::EmptyDonorPool);
        }
        if self.donor_units.iter().any(|d| d == &self.treated_unit) {
            return Err(PanelError::TreatedInDonorPool { unit: self.treated_unit.clone() });
        }
        let mut seen = BTreeSet::new();
        for donor in &self.donor_units {
            if !seen.insert(donor.as_str()) {
                return Err(PanelError::DuplicateDonor { unit: donor.clone() });
            }
        }
        if self.predictors.is_empty() {
            return Err(PanelError::EmptyPredictors);
        }
        validate_fit_window("pre-intervention", &self.pre_window)?;
        validate_fit_window("full", &self.full_window)?;
        for pred in &self.predictors {
            if pred.window.is_empty() {
                return Err(PanelError::InvalidAggregationWindow {
                    label: pred.label.clone(),
                    start: pred.window.start,
                    end: pred.window.end,
                });
            }
        }
        Ok(())
    }

    pub fn n_predictors(&self) -> usize {
        self.predictors.len()
    }

    pub fn n_donors(&self) -> usize {
        self.donor_units.len()
    }
}

fn validate_fit_window(which: &'static str, window: &TimeWindow) -> PanelResult<()> {
    if window.end < window.start {
        return Err(PanelError::DegenerateWindow {
            which,
            start: window.start,
            end: window.end,
            reason: "start exceeds end.",
        });
    }
    if window.len() < 2 {
        return Err(PanelError::DegenerateWindow {
            which,
            start: window.start,
            end: window.end,
            reason: "window must cover at least two periods.",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Each panel-independent validation rule of `AnalysisSpec::validate`.
    // - Label generation for column and outcome aggregations.
    //
    // They intentionally DO NOT cover:
    // - Unknown units/predictors and missing rows (see `prep`).
    // -------------------------------------------------------------------------

    fn donors(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn predictors() -> Vec<PredictorAggregation> {
        vec![PredictorAggregation::mean("duration", TimeWindow::new(1980, 1989))]
    }

    #[test]
    // Purpose
    // -------
    // A well-formed spec validates.
    //
    // Given
    // -----
    // - Treated "T", donors "A", "B", one predictor, windows of ≥ 2 periods.
    //
    // Expect
    // ------
    // - `Ok(..)` with counts reported correctly.
    fn spec_new_accepts_valid_configuration() {
        let spec = AnalysisSpec::new(
            "T",
            donors(&["A", "B"]),
            predictors(),
            TimeWindow::new(1980, 1989),
            TimeWindow::new(1980, 2000),
        )
        .expect("spec should be valid");

        assert_eq!(spec.n_donors(), 2);
        assert_eq!(spec.n_predictors(), 1);
    }

    #[test]
    // Purpose
    // -------
    // The treated unit listed as a donor is rejected as an invalid spec.
    //
    // Given
    // -----
    // - Treated "T" and donors `["A", "T"]`.
    //
    // Expect
    // ------
    // - `Err(TreatedInDonorPool { unit: "T" })`.
    fn spec_rejects_treated_unit_in_donor_pool() {
        let err = AnalysisSpec::new(
            "T",
            donors(&["A", "T"]),
            predictors(),
            TimeWindow::new(1980, 1989),
            TimeWindow::new(1980, 2000),
        )
        .unwrap_err();

        assert_eq!(err, PanelError::TreatedInDonorPool { unit: "T".to_string() });
        assert!(err.is_invalid_spec());
    }

    #[test]
    // Purpose
    // -------
    // Empty donor pool, duplicate donors, and empty predictors are rejected.
    //
    // Given
    // -----
    // - Three otherwise-valid specs, each breaking one rule.
    //
    // Expect
    // ------
    // - `EmptyDonorPool`, `DuplicateDonor`, `EmptyPredictors` respectively.
    fn spec_rejects_empty_or_duplicate_lists() {
        let pre = TimeWindow::new(1980, 1989);
        let full = TimeWindow::new(1980, 2000);

        let empty = AnalysisSpec::new("T", vec![], predictors(), pre, full).unwrap_err();
        assert_eq!(empty, PanelError::EmptyDonorPool);

        let dup = AnalysisSpec::new("T", donors(&["A", "A"]), predictors(), pre, full).unwrap_err();
        assert_eq!(dup, PanelError::DuplicateDonor { unit: "A".to_string() });

        let no_preds = AnalysisSpec::new("T", donors(&["A"]), vec![], pre, full).unwrap_err();
        assert_eq!(no_preds, PanelError::EmptyPredictors);
    }

    #[test]
    // Purpose
    // -------
    // Single-period and reversed fit windows are degenerate; a single-period
    // aggregation window is fine while a reversed one is not.
    //
    // Given
    // -----
    // - Pre window `[1985, 1985]`; full window `[2000, 1980]`; aggregation
    //   windows `[1985, 1985]` and `[1990, 1985]`.
    //
    // Expect
    // ------
    // - `DegenerateWindow` for the fit windows; `InvalidAggregationWindow`
    //   only for the reversed aggregation window.
    fn spec_rejects_degenerate_windows() {
        let single_pre = AnalysisSpec::new(
            "T",
            donors(&["A"]),
            predictors(),
            TimeWindow::single(1985),
            TimeWindow::new(1980, 2000),
        )
        .unwrap_err();
        assert!(matches!(single_pre, PanelError::DegenerateWindow { which: "pre-intervention", .. }));

        let reversed_full = AnalysisSpec::new(
            "T",
            donors(&["A"]),
            predictors(),
            TimeWindow::new(1980, 1989),
            TimeWindow::new(2000, 1980),
        )
        .unwrap_err();
        assert!(matches!(reversed_full, PanelError::DegenerateWindow { which: "full", .. }));

        let single_agg = vec![PredictorAggregation::outcome_mean(TimeWindow::single(1985))];
        assert!(AnalysisSpec::new(
            "T",
            donors(&["A"]),
            single_agg,
            TimeWindow::new(1980, 1989),
            TimeWindow::new(1980, 2000),
        )
        .is_ok());

        let reversed_agg = vec![PredictorAggregation::outcome_mean(TimeWindow::new(1990, 1985))];
        let err = AnalysisSpec::new(
            "T",
            donors(&["A"]),
            reversed_agg,
            TimeWindow::new(1980, 1989),
            TimeWindow::new(1980, 2000),
        )
        .unwrap_err();
        assert!(matches!(err, PanelError::InvalidAggregationWindow { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Generated labels encode operator, source, and window.
    //
    // Given
    // -----
    // - A mean-of-column and a mean-of-outcome aggregation.
    //
    // Expect
    // ------
    // - Labels `"mean(duration) 1980-1989"` and `"mean(outcome) 1985-1993"`.
    fn labels_describe_aggregation() {
        let col = PredictorAggregation::mean("duration", TimeWindow::new(1980, 1989));
        let out = PredictorAggregation::outcome_mean(TimeWindow::new(1985, 1993));

        assert_eq!(col.label, "mean(duration) 1980-1989");
        assert_eq!(out.label, "mean(outcome) 1985-1993");
        assert_eq!(out.source, PredictorSource::Outcome);
    }
}
