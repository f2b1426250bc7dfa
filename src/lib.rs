//! rust_synthcontrol — synthetic-control estimation for a single treated unit.
//!
//! Purpose
//! -------
//! Estimate the counterfactual outcome path of a treated unit as a convex
//! combination of untreated donor units. Donor weights `W` are chosen so the
//! combination matches the treated unit's pre-intervention characteristics;
//! predictor weights `V` decide how much each characteristic counts and are
//! chosen to reproduce the pre-intervention outcome path.
//!
//! Key behaviors
//! -------------
//! - `panel`: panel data model, analysis spec, data preparation, and a
//!   seeded simulation fixture.
//! - `optimization`: inner simplex-constrained QP for `W` and the outer
//!   Nelder–Mead search for `V`.
//! - `synth`: weight solver, synthetic estimator, balance table, and the
//!   [`SynthModel`](synth::SynthModel) orchestrator.
//!
//! Invariants & assumptions
//! ------------------------
//! - Exactly one treated unit, one outcome series, and a fixed list of
//!   scalar predictor aggregations per fit.
//! - Everything is in memory, single-threaded, and deterministic given the
//!   inputs and the search seed.
//!
//! Conventions
//! -----------
//! - Characteristic matrices are P×D and outcome path matrices T×D, with
//!   donors in columns in the order of `AnalysisSpec::donor_units`.
//! - Each layer has its own error enum (`PanelError`, `OptError`,
//!   `SynthError`); the synth layer wraps the other two.
//! - Logging goes through `tracing`; installing a subscriber is left to the
//!   caller.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use rust_synthcontrol::panel::prelude::*;
//! use rust_synthcontrol::synth::prelude::*;
//!
//! # fn main() -> Result<(), SynthError> {
//! let opts = PanelSimOpts::default();
//! let panel = simulate_panel(&opts)?;
//! let spec = AnalysisSpec::new(
//!     "treated",
//!     opts.donor_ids(),
//!     vec![
//!         PredictorAggregation::mean("duration", TimeWindow::new(1970, 1994)),
//!         PredictorAggregation::mean("intensity", TimeWindow::new(1970, 1994)),
//!         PredictorAggregation::outcome_mean(TimeWindow::new(1985, 1994)),
//!     ],
//!     TimeWindow::new(1970, 1994),
//!     TimeWindow::new(1970, 2010),
//! )?;
//!
//! let mut model = SynthModel::new(SynthOptions::default());
//! model.fit(&panel, &spec)?;
//! for donor in &model.result()?.composition {
//!     println!("{}: {:.3}", donor.unit, donor.weight);
//! }
//! # Ok(())
//! # }
//! ```

pub mod optimization;
pub mod panel;
pub mod synth;
