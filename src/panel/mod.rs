//! panel — panel data model, analysis spec, and data preparation.
//!
//! Purpose
//! -------
//! Own everything that knows about unit identifiers and periods. The panel
//! layer validates raw observations, validates an analysis specification, and
//! reduces both to the flat numeric inputs of a synthetic-control fit
//! ([`PreparedData`]).
//!
//! Key behaviors
//! -------------
//! - [`data`]: [`PanelDataset`] / [`PanelObservation`] with uniqueness,
//!   arity, and finiteness checks.
//! - [`window`]: inclusive [`TimeWindow`]s.
//! - [`aggregation`]: the [`Aggregator`] extension point and built-in
//!   [`Aggregation`] operators.
//! - [`spec`]: [`AnalysisSpec`] and [`PredictorAggregation`] (column or
//!   outcome-based "special" predictors).
//! - [`prep`]: [`prepare`], producing characteristic vector/matrix and
//!   outcome paths.
//! - [`simulate`]: a seeded conflict/peace panel used as a test fixture.
//!
//! Invariants & assumptions
//! ------------------------
//! - Row `i` of the characteristic vector and matrix always corresponds to
//!   `spec.predictors[i]`; column `d` always corresponds to
//!   `spec.donor_units[d]`.
//! - Every failure is a [`PanelError`]; invalid specs are rejected before any
//!   aggregation is computed.
//!
//! Conventions
//! -----------
//! - Only [`prep`] logs (a single `tracing::debug!` per call); the other
//!   submodules are silent.
//!
//! Downstream usage
//! ----------------
//! - Build a [`PanelDataset`], an [`AnalysisSpec`], call [`prepare`], then
//!   hand the result to [`crate::synth::solver::solve`], or let
//!   [`crate::synth::model::SynthModel::fit`] do all three.

pub mod aggregation;
pub mod data;
pub mod errors;
pub mod prep;
pub mod simulate;
pub mod spec;
pub mod window;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::aggregation::{Aggregation, Aggregator};
pub use self::data::{PanelDataset, PanelObservation, Period};
pub use self::errors::{PanelError, PanelResult};
pub use self::prep::{PreparedData, prepare};
pub use self::simulate::{PanelSimOpts, simulate_panel};
pub use self::spec::{AnalysisSpec, PredictorAggregation, PredictorSource};
pub use self::window::TimeWindow;

pub mod prelude {
    pub use super::{
        Aggregation, Aggregator, AnalysisSpec, PanelDataset, PanelError, PanelObservation,
        PanelResult, PanelSimOpts, Period, PredictorAggregation, PredictorSource, PreparedData,
        TimeWindow, prepare, simulate_panel,
    };
}
