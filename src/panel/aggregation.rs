//! Aggregation operators for predictor construction.
//!
//! Purpose
//! -------
//! Reduce a unit's values over a window to the single number that enters the
//! characteristic vector/matrix. The default is the arithmetic mean; other
//! operators plug in through the [`Aggregator`] trait.
//!
//! Key behaviors
//! -------------
//! - [`Aggregator`] is the extension point: anything `Send + Sync + Debug`
//!   mapping a non-empty `&[f64]` to `f64`.
//! - [`Aggregation`] provides the built-in operators (mean, median, sum, min,
//!   max, last value) backed by `statrs` descriptive statistics, and parses
//!   case-insensitive names via `FromStr`.
//!
//! Conventions
//! -----------
//! - Inputs are ordered by period (oldest first) so order-sensitive operators
//!   such as [`Aggregation::Last`] are well defined.
//! - Callers guarantee non-empty, finite inputs; window validation happens in
//!   the spec layer. No logging, no allocation beyond what `Median` needs.
use crate::panel::errors::PanelError;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};
use std::fmt::Debug;
use std::str::FromStr;

/// Reduce an ordered, non-empty slice of values to one number.
pub trait Aggregator: Debug + Send + Sync {
    /// Short label used in predictor names (e.g. `"mean"`).
    fn name(&self) -> &str;

    /// Aggregate `values` (ordered oldest → newest).
    fn aggregate(&self, values: &[f64]) -> f64;
}

/// Built-in aggregation operators.
///
/// Parsing accepts case-insensitive `"mean"`, `"median"`, `"sum"`, `"min"`,
/// `"max"`, and `"last"`; other names return
/// [`PanelError::UnknownAggregation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Aggregation {
    #[default]
    Mean,
    Median,
    Sum,
    Min,
    Max,
    Last,
}

impl Aggregator for Aggregation {
    fn name(&self) -> &str {
        match self {
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Sum => "sum",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Last => "last",
        }
    }

    fn aggregate(&self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Mean => Statistics::mean(values),
            Aggregation::Median => Data::new(values.to_vec()).median(),
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Min => Statistics::min(values),
            Aggregation::Max => Statistics::max(values),
            Aggregation::Last => values.last().copied().unwrap_or(f64::NAN),
        }
    }
}

impl FromStr for Aggregation {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Aggregation::Mean),
            "median" => Ok(Aggregation::Median),
            "sum" => Ok(Aggregation::Sum),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            "last" => Ok(Aggregation::Last),
            _ => Err(PanelError::UnknownAggregation { name: s.to_string() }),
        }
    }
}
