//! Panel data containers for synthetic-control analyses.
//!
//! Purpose
//! -------
//! Provide a validated, rectangular-by-key panel of `(unit, period,
//! predictors, outcome)` observations. This module centralizes input
//! validation for raw rows so the preparation layer can assume clean,
//! uniquely keyed data.
//!
//! Key behaviors
//! -------------
//! - [`PanelObservation`] is one row of the panel.
//! - [`PanelDataset`] owns the rows, the ordered predictor names, and a
//!   unit → period → row index used for O(log n) lookups by `&str`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The panel is non-empty.
//! - Every row carries exactly one value per named predictor.
//! - All predictor and outcome values are finite.
//! - At most one row exists per `(unit, period)` key.
//!
//! Conventions
//! -----------
//! - Periods are [`Period`] integers (e.g., calendar years).
//! - Units are identified by strings that are stable across periods.
//! - Completeness over a window is **not** enforced here; it depends on the
//!   analysis and is checked by [`prepare`](crate::panel::prep::prepare).
//!
//! Testing notes
//! -------------
//! - Unit tests cover the happy path, empty panels, duplicate keys, arity
//!   mismatches, non-finite values, and lookup helpers.
use crate::panel::errors::{PanelError, PanelResult};
use std::collections::{BTreeMap, BTreeSet};

/// Integer time period (typically a calendar year).
pub type Period = i32;

/// PanelObservation — a single `(unit, period)` row.
///
/// Fields
/// ------
/// - `unit`: `String`
///   Unit identifier, stable across periods.
/// - `period`: [`Period`]
///   Time stamp of the row.
/// - `predictors`: `Vec<f64>`
///   Predictor values ordered like [`PanelDataset::predictor_names`].
/// - `outcome`: `f64`
///   Outcome value for the unit at `period`.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelObservation {
    pub unit: String,
    pub period: Period,
    pub predictors: Vec<f64>,
    pub outcome: f64,
}

impl PanelObservation {
    pub fn new(
        unit: impl Into<String>, period: Period, predictors: Vec<f64>, outcome: f64,
    ) -> PanelObservation {
        PanelObservation { unit: unit.into(), period, predictors, outcome }
    }
}

/// PanelDataset — validated panel of observations.
///
/// Purpose
/// -------
/// Hold every observation of a panel together with the predictor column
/// names and a key index, so that data preparation can fetch
/// `(unit, period)` rows without scanning.
///
/// Fields
/// ------
/// - `predictor_names`: ordered predictor column names.
/// - `observations`: rows in insertion order.
/// - `index`: per-unit map from period to row position.
///
/// Invariants
/// ----------
/// - See module docs; enforced by [`PanelDataset::new`].
///
/// Performance
/// -----------
/// - Construction is O(n log n) in the number of rows; lookups are
///   O(log n) and borrow the unit key instead of allocating.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelDataset {
    predictor_names: Vec<String>,
    observations: Vec<PanelObservation>,
    index: BTreeMap<String, BTreeMap<Period, usize>>,
}

impl PanelDataset {
    /// Construct a validated [`PanelDataset`].
    ///
    /// Parameters
    /// ----------
    /// - `predictor_names`: `Vec<String>`
    ///   Ordered, unique predictor column names. May be empty when only
    ///   outcome-based predictors will be used.
    /// - `observations`: `Vec<PanelObservation>`
    ///   Raw rows; order is preserved.
    ///
    /// Errors
    /// ------
    /// - `PanelError::EmptyPanel` when `observations` is empty.
    /// - `PanelError::DuplicatePredictorName` for repeated column names.
    /// - `PanelError::PredictorArityMismatch` when a row's predictor count
    ///   differs from `predictor_names.len()`.
    /// - `PanelError::NonFiniteValue` for NaN/±inf predictors or outcomes.
    /// - `PanelError::DuplicateObservation` for repeated `(unit, period)`.
    ///
    /// Validation stops at the first offending row.
    pub fn new(
        predictor_names: Vec<String>, observations: Vec<PanelObservation>,
    ) -> PanelResult<Self> {
        if observations.is_empty() {
            return Err(PanelError::EmptyPanel);
        }
        let mut seen_names = BTreeSet::new();
        for name in &predictor_names {
            if !seen_names.insert(name.as_str()) {
                return Err(PanelError::DuplicatePredictorName { name: name.clone() });
            }
        }

        let mut index: BTreeMap<String, BTreeMap<Period, usize>> = BTreeMap::new();
        for (pos, obs) in observations.iter().enumerate() {
            if obs.predictors.len() != predictor_names.len() {
                return Err(PanelError::PredictorArityMismatch {
                    unit: obs.unit.clone(),
                    period: obs.period,
                    expected: predictor_names.len(),
                    found: obs.predictors.len(),
                });
            }
            for (name, &value) in predictor_names.iter().zip(obs.predictors.iter()) {
                if !value.is_finite() {
                    return Err(PanelError::NonFiniteValue {
                        unit: obs.unit.clone(),
                        period: obs.period,
                        column: name.clone(),
                        value,
                    });
                }
            }
            if !obs.outcome.is_finite() {
                return Err(PanelError::NonFiniteValue {
                    unit: obs.unit.clone(),
                    period: obs.period,
                    column: "outcome".to_string(),
                    value: obs.outcome,
                });
            }
            if index.entry(obs.unit.clone()).or_default().insert(obs.period, pos).is_some() {
                return Err(PanelError::DuplicateObservation {
                    unit: obs.unit.clone(),
                    period: obs.period,
                });
            }
        }

        Ok(PanelDataset { predictor_names, observations, index })
    }

    pub fn predictor_names(&self) -> &[String] {
        &self.predictor_names
    }

    pub fn observations(&self) -> &[PanelObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Column position of a named predictor.
    pub fn predictor_index(&self, name: &str) -> Option<usize> {
        self.predictor_names.iter().position(|n| n == name)
    }

    /// Row for `(unit, period)`, if present.
    pub fn get(&self, unit: &str, period: Period) -> Option<&PanelObservation> {
        self.index
            .get(unit)
            .and_then(|periods| periods.get(&period))
            .map(|&pos| &self.observations[pos])
    }

    pub fn has_unit(&self, unit: &str) -> bool {
        self.index.contains_key(unit)
    }

    /// Distinct unit identifiers in ascending order.
    pub fn units(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    /// Distinct periods in ascending order.
    pub fn periods(&self) -> Vec<Period> {
        let set: BTreeSet<Period> = self.observations.iter().map(|obs| obs.period).collect();
        set.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction behavior of `PanelDataset::new`.
    // - Enforcement of invariants: non-empty panel, unique keys, predictor
    //   arity, finite values, unique predictor names.
    // - Lookup helpers (`get`, `has_unit`, `units`, `periods`,
    //   `predictor_index`).
    //
    // They intentionally DO NOT cover:
    // - Window completeness, which is a data-preparation concern.
    // -------------------------------------------------------------------------

    fn names() -> Vec<String> {
        vec!["duration".to_string(), "intensity".to_string()]
    }

    #[test]
    // Purpose
    // -------
    // Verify that a small well-formed panel is accepted and indexed.
    //
    // Given
    // -----
    // - Two units over two periods with two predictors each.
    //
    // Expect
    // ------
    // - `Ok(..)`; lookups return the right rows; units and periods are sorted.
    fn panel_new_returns_ok_for_valid_input() {
        let rows = vec![
            PanelObservation::new("B", 2001, vec![1.0, 2.0], 3.0),
            PanelObservation::new("A", 2000, vec![0.5, 1.5], 2.5),
            PanelObservation::new("A", 2001, vec![0.6, 1.6], 2.6),
            PanelObservation::new("B", 2000, vec![1.1, 2.1], 3.1),
        ];

        let panel = PanelDataset::new(names(), rows).expect("panel should be valid");

        assert_eq!(panel.len(), 4);
        assert_eq!(panel.units(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(panel.periods(), vec![2000, 2001]);
        assert_eq!(panel.get("A", 2001).map(|o| o.outcome), Some(2.6));
        assert!(panel.get("A", 1999).is_none());
        assert!(panel.get("C", 2000).is_none());
        assert!(panel.has_unit("B"));
        assert!(!panel.has_unit("C"));
        assert_eq!(panel.predictor_index("intensity"), Some(1));
        assert_eq!(panel.predictor_index("gdp"), None);
    }

    #[test]
    // Purpose
    // -------
    // Ensure an empty panel is rejected.
    //
    // Given
    // -----
    // - No rows.
    //
    // Expect
    // ------
    // - `Err(PanelError::EmptyPanel)`.
    fn panel_new_rejects_empty_panel() {
        assert_eq!(PanelDataset::new(names(), vec![]).unwrap_err(), PanelError::EmptyPanel);
    }

    #[test]
    // Purpose
    // -------
    // Ensure repeated `(unit, period)` keys are rejected.
    //
    // Given
    // -----
    // - Two rows for ("A", 2000).
    //
    // Expect
    // ------
    // - `Err(PanelError::DuplicateObservation { unit: "A", period: 2000 })`.
    fn panel_new_rejects_duplicate_keys() {
        let rows = vec![
            PanelObservation::new("A", 2000, vec![0.0, 0.0], 1.0),
            PanelObservation::new("A", 2000, vec![1.0, 1.0], 2.0),
        ];

        let err = PanelDataset::new(names(), rows).unwrap_err();

        assert_eq!(err, PanelError::DuplicateObservation { unit: "A".to_string(), period: 2000 });
    }

    #[test]
    // Purpose
    // -------
    // Ensure a row with the wrong number of predictors is rejected.
    //
    // Given
    // -----
    // - Two predictor names; a row with three values.
    //
    // Expect
    // ------
    // - `Err(PanelError::PredictorArityMismatch { expected: 2, found: 3, .. })`.
    fn panel_new_rejects_arity_mismatch() {
        let rows = vec![PanelObservation::new("A", 2000, vec![0.0, 0.0, 0.0], 1.0)];

        let err = PanelDataset::new(names(), rows).unwrap_err();

        assert_eq!(
            err,
            PanelError::PredictorArityMismatch {
                unit: "A".to_string(),
                period: 2000,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure non-finite outcomes and predictors are rejected with the
    // offending column named.
    //
    // Given
    // -----
    // - A NaN outcome, then (separately) an infinite predictor.
    //
    // Expect
    // ------
    // - `NonFiniteValue` naming "outcome" and "intensity" respectively.
    fn panel_new_rejects_non_finite_values() {
        let nan_outcome = vec![PanelObservation::new("A", 2000, vec![0.0, 0.0], f64::NAN)];
        match PanelDataset::new(names(), nan_outcome).unwrap_err() {
            PanelError::NonFiniteValue { column, .. } => assert_eq!(column, "outcome"),
            other => panic!("unexpected error: {other:?}"),
        }

        let inf_pred = vec![PanelObservation::new("A", 2000, vec![0.0, f64::INFINITY], 1.0)];
        match PanelDataset::new(names(), inf_pred).unwrap_err() {
            PanelError::NonFiniteValue { column, .. } => assert_eq!(column, "intensity"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure duplicated predictor column names are rejected.
    //
    // Given
    // -----
    // - Names `["gdp", "gdp"]`.
    //
    // Expect
    // ------
    // - `Err(PanelError::DuplicatePredictorName { name: "gdp" })`.
    fn panel_new_rejects_duplicate_predictor_names() {
        let rows = vec![PanelObservation::new("A", 2000, vec![0.0, 0.0], 1.0)];
        let err = PanelDataset::new(vec!["gdp".to_string(), "gdp".to_string()], rows).unwrap_err();

        assert_eq!(err, PanelError::DuplicatePredictorName { name: "gdp".to_string() });
    }
}
