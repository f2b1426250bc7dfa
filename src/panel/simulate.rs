//! Seeded synthetic panels for tests and demonstrations.
//!
//! Purpose
//! -------
//! Generate a toy conflict/peace panel with a known intervention effect on a
//! single treated unit. The generator is a fixture for exercising the
//! estimator end to end; it is not used by any fitting code path.
//!
//! Key behaviors
//! -------------
//! - Every donor draws a latent peace level `a ~ N(50, 10)` and a trend
//!   `b ~ N(0.3, 0.2)`. Its outcome is `a + b·(t − start) + ε`, and its two
//!   predictors are `duration = a / 10 + ε` and `intensity = 10·b + ε`.
//! - The treated unit's latent factors are the average of the first two
//!   donors, so a two-donor synthetic control exists up to noise.
//! - From `intervention` onward the treated outcome is shifted by `effect`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Fully deterministic for a given [`PanelSimOpts`] (explicit `seed`,
//!   `StdRng`); there is no global RNG state.
//! - The panel is complete: every unit has a row for every period.
use crate::panel::{
    data::{PanelDataset, PanelObservation, Period},
    errors::{PanelError, PanelResult},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// Name of the treated unit in simulated panels.
pub const SIM_TREATED_UNIT: &str = "treated";

/// Predictor columns of simulated panels.
pub const SIM_PREDICTORS: [&str; 2] = ["duration", "intensity"];

/// PanelSimOpts — configuration for [`simulate_panel`].
///
/// Fields
/// ------
/// - `seed`: RNG seed.
/// - `n_donors`: number of donor units (≥ 2).
/// - `start`, `end`: inclusive period range.
/// - `intervention`: first treated period, `start < intervention ≤ end`.
/// - `effect`: additive shift of the treated outcome from `intervention` on.
/// - `noise_sd`: standard deviation of observation noise (≥ 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSimOpts {
    pub seed: u64,
    pub n_donors: usize,
    pub start: Period,
    pub end: Period,
    pub intervention: Period,
    pub effect: f64,
    pub noise_sd: f64,
}

impl PanelSimOpts {
    /// Construct validated simulation options.
    ///
    /// Errors
    /// ------
    /// - `PanelError::InvalidSimulation` when `n_donors < 2`, the period
    ///   range is reversed or too short, `intervention` lies outside
    ///   `(start, end]`, `effect` is non-finite, or `noise_sd` is negative or
    ///   non-finite.
    pub fn new(
        seed: u64, n_donors: usize, start: Period, end: Period, intervention: Period, effect: f64,
        noise_sd: f64,
    ) -> PanelResult<Self> {
        let opts = PanelSimOpts { seed, n_donors, start, end, intervention, effect, noise_sd };
        opts.validate()?;
        Ok(opts)
    }

    fn validate(&self) -> PanelResult<()> {
        if self.n_donors < 2 {
            return Err(PanelError::InvalidSimulation {
                field: "n_donors",
                reason: "at least two donors are required.",
            });
        }
        if self.end <= self.start {
            return Err(PanelError::InvalidSimulation {
                field: "end",
                reason: "end must be strictly after start.",
            });
        }
        if self.intervention <= self.start || self.intervention > self.end {
            return Err(PanelError::InvalidSimulation {
                field: "intervention",
                reason: "intervention must lie in (start, end].",
            });
        }
        if !self.effect.is_finite() {
            return Err(PanelError::InvalidSimulation {
                field: "effect",
                reason: "effect must be finite.",
            });
        }
        if !self.noise_sd.is_finite() || self.noise_sd < 0.0 {
            return Err(PanelError::InvalidSimulation {
                field: "noise_sd",
                reason: "noise_sd must be finite and non-negative.",
            });
        }
        Ok(())
    }

    /// Donor identifiers in generation order.
    pub fn donor_ids(&self) -> Vec<String> {
        (1..=self.n_donors).map(|j| format!("donor_{j:02}")).collect()
    }
}

impl Default for PanelSimOpts {
    fn default() -> Self {
        PanelSimOpts {
            seed: 42,
            n_donors: 10,
            start: 1970,
            end: 2010,
            intervention: 1995,
            effect: -5.0,
            noise_sd: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Latent {
    level: f64,
    trend: f64,
}

/// Simulate a complete panel according to `opts`.
///
/// Returns
/// -------
/// PanelResult<PanelDataset>
///   `n_donors + 1` units over `[start, end]` with predictors
///   [`SIM_PREDICTORS`].
///
/// Errors
/// ------
/// - `PanelError::InvalidSimulation` for invalid options.
pub fn simulate_panel(opts: &PanelSimOpts) -> PanelResult<PanelDataset> {
    opts.validate()?;
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let level_dist = normal(50.0, 10.0)?;
    let trend_dist = normal(0.3, 0.2)?;
    let noise = normal(0.0, opts.noise_sd)?;

    let donors: Vec<Latent> = (0..opts.n_donors)
        .map(|_| Latent { level: rng.sample(level_dist), trend: rng.sample(trend_dist) })
        .collect();
    let treated = Latent {
        level: 0.5 * (donors[0].level + donors[1].level),
        trend: 0.5 * (donors[0].trend + donors[1].trend),
    };

    let n_periods = (opts.end - opts.start) as usize + 1;
    let mut observations = Vec::with_capacity((opts.n_donors + 1) * n_periods);
    let units = std::iter::once((SIM_TREATED_UNIT.to_string(), treated, true))
        .chain(opts.donor_ids().into_iter().zip(donors).map(|(id, lat)| (id, lat, false)));

    for (unit, latent, is_treated) in units {
        for t in opts.start..=opts.end {
            let elapsed = f64::from(t - opts.start);
            let duration = latent.level / 10.0 + rng.sample(noise);
            let intensity = 10.0 * latent.trend + rng.sample(noise);
            let mut outcome = latent.level + latent.trend * elapsed + rng.sample(noise);
            if is_treated && t >= opts.intervention {
                outcome += opts.effect;
            }
            observations.push(PanelObservation::new(
                unit.clone(),
                t,
                vec![duration, intensity],
                outcome,
            ));
        }
    }

    PanelDataset::new(SIM_PREDICTORS.iter().map(|s| s.to_string()).collect(), observations)
}

fn normal(mean: f64, sd: f64) -> PanelResult<Normal<f64>> {
    Normal::new(mean, sd).map_err(|_| PanelError::InvalidSimulation {
        field: "noise_sd",
        reason: "could not build a normal distribution.",
    })
}
