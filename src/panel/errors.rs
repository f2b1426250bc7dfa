//! Errors for panel construction and data preparation.
//!
//! This module defines [`PanelError`], the error type raised while building a
//! [`PanelDataset`](crate::panel::data::PanelDataset), validating an
//! [`AnalysisSpec`](crate::panel::spec::AnalysisSpec), or running
//! [`prepare`](crate::panel::prep::prepare).
//!
//! ## Conventions
//! - Periods are integer time stamps (typically years) and windows are
//!   inclusive on both ends.
//! - Every variant is fatal for the fit that produced it; no partial
//!   `PreparedData` is ever returned.
//! - Spec problems are detected before any aggregation or matrix work, so a
//!   caller never pays for numeric work on an invalid specification.
use crate::panel::data::Period;

/// Result alias for panel and data-preparation operations.
pub type PanelResult<T> = Result<T, PanelError>;

/// Unified error type for the panel layer.
///
/// Covers dataset construction (shape and finiteness of observations),
/// analysis-spec validation, and missing coverage discovered while preparing
/// the characteristic matrices.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    // ---- Dataset construction ----
    /// Panel has no observations.
    #[error("Panel dataset contains no observations.")]
    EmptyPanel,

    /// Two observations share the same (unit, period) key.
    #[error("Duplicate observation for unit '{unit}' at period {period}.")]
    DuplicateObservation { unit: String, period: Period },

    /// An observation carries the wrong number of predictor values.
    #[error(
        "Observation for unit '{unit}' at period {period} has {found} predictor values, expected {expected}."
    )]
    PredictorArityMismatch { unit: String, period: Period, expected: usize, found: usize },

    /// Two predictor columns share a name.
    #[error("Duplicate predictor name '{name}'.")]
    DuplicatePredictorName { name: String },

    /// A predictor or outcome value is NaN or ±inf.
    #[error("Non-finite value {value} in '{column}' for unit '{unit}' at period {period}.")]
    NonFiniteValue { unit: String, period: Period, column: String, value: f64 },

    // ---- Missing data ----
    /// A (unit, period) observation required by the analysis is absent.
    #[error("Missing observation for unit '{unit}' at period {period}.")]
    MissingData { unit: String, period: Period },

    // ---- Invalid spec ----
    /// The treated unit also appears in the donor pool.
    #[error("Treated unit '{unit}' must not appear in the donor pool.")]
    TreatedInDonorPool { unit: String },

    /// The donor pool is empty.
    #[error("Donor pool is empty; at least one donor unit is required.")]
    EmptyDonorPool,

    /// A donor is listed more than once.
    #[error("Donor unit '{unit}' is listed more than once.")]
    DuplicateDonor { unit: String },

    /// No predictor aggregations were requested.
    #[error("Predictor list is empty; at least one aggregation is required.")]
    EmptyPredictors,

    /// A fitting or prediction window is reversed or covers a single period.
    #[error("Degenerate {which} window [{start}, {end}]: {reason}")]
    DegenerateWindow { which: &'static str, start: Period, end: Period, reason: &'static str },

    /// An aggregation window is reversed.
    #[error("Invalid aggregation window [{start}, {end}] for predictor '{label}': start exceeds end.")]
    InvalidAggregationWindow { label: String, start: Period, end: Period },

    /// A unit named by the spec does not exist in the panel.
    #[error("Unit '{unit}' does not exist in the panel.")]
    UnknownUnit { unit: String },

    /// A predictor named by the spec does not exist in the panel.
    #[error("Predictor '{name}' does not exist in the panel.")]
    UnknownPredictor { name: String },

    /// An aggregation operator name could not be parsed.
    #[error("Unknown aggregation '{name}'. Valid options are case insensitive 'mean', 'median', 'sum', 'min', 'max' or 'last'.")]
    UnknownAggregation { name: String },

    // ---- Simulation fixture ----
    /// Simulation options are inconsistent.
    #[error("Invalid simulation option '{field}': {reason}")]
    InvalidSimulation { field: &'static str, reason: &'static str },
}

impl PanelError {
    /// Whether this error belongs to the invalid-spec family.
    ///
    /// Invalid-spec errors are raised before any matrix construction and
    /// indicate a configuration mistake rather than a gap in the data.
    pub fn is_invalid_spec(&self) -> bool {
        matches!(
            self,
            PanelError::TreatedInDonorPool { .. }
                | PanelError::EmptyDonorPool
                | PanelError::DuplicateDonor { .. }
                | PanelError::EmptyPredictors
                | PanelError::DegenerateWindow { .. }
                | PanelError::InvalidAggregationWindow { .. }
                | PanelError::UnknownUnit { .. }
                | PanelError::UnknownPredictor { .. }
                | PanelError::UnknownAggregation { .. }
        )
    }

    /// Whether this error reports missing (unit, period) coverage.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, PanelError::MissingData { .. })
    }
}
