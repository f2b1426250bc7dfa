use crate::optimization::{
    errors::{OptError, OptResult},
    simplex_qp::QpOutcome,
    v_search::{
        adapter::{Evaluation, theta_to_v},
        types::{DEFAULT_INITIAL_STEP, DEFAULT_RANDOM_STARTS, FnEvalMap, Theta},
    },
    validation::{verify_initial_step, verify_max_iter, verify_timeout, verify_tol_sd},
};
use argmin::core::{TerminationReason, TerminationStatus};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// VStrategy — how predictor weights `V` are chosen.
///
/// Variants
/// --------
/// - `Nested`: bi-level search; `V` minimizes the pre-intervention MSPE of
///   the outcome, with `W*(V)` from the inner QP.
/// - `Equal`: `V = 1/P`; a single inner solve.
/// - `Fixed(v)`: caller-supplied nonnegative weights, normalized to sum one.
///
/// Parsing accepts case-insensitive `"nested"` and `"equal"`; fixed weights
/// must be supplied programmatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum VStrategy {
    #[default]
    Nested,
    Equal,
    Fixed(Vec<f64>),
}

impl FromStr for VStrategy {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nested" => Ok(VStrategy::Nested),
            "equal" => Ok(VStrategy::Equal),
            _ => Err(OptError::InvalidStrategy {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'Nested' or 'Equal'; fixed weights are passed as VStrategy::Fixed.",
            }),
        }
    }
}

/// SearchTolerances — stopping rules of each Nelder–Mead run.
///
/// Fields
/// ------
/// - `tol_sd`: `Option<f64>`
///   Stop when the standard deviation of the simplex vertex costs falls
///   below this value. Meeting it is the only outcome reported as
///   converged.
/// - `max_iter`: `Option<usize>`
///   Iteration budget per start.
/// - `timeout`: `Option<Duration>`
///   Wall-clock budget per start. Exhausting it returns the best iterate
///   found so far.
///
/// At least one rule must be set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchTolerances {
    pub tol_sd: Option<f64>,
    pub max_iter: Option<usize>,
    pub timeout: Option<Duration>,
}

impl SearchTolerances {
    /// Construct validated stopping rules.
    ///
    /// Errors
    /// ------
    /// - `OptError::NoTolerancesProvided` when all three are `None`.
    /// - `OptError::InvalidTolSd`, `InvalidMaxIter`, `InvalidTimeout` for
    ///   non-positive values.
    pub fn new(
        tol_sd: Option<f64>, max_iter: Option<usize>, timeout: Option<Duration>,
    ) -> OptResult<Self> {
        if tol_sd.is_none() && max_iter.is_none() && timeout.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_sd(tol_sd)?;
        verify_max_iter(max_iter)?;
        verify_timeout(timeout)?;
        Ok(SearchTolerances { tol_sd, max_iter, timeout })
    }
}

impl Default for SearchTolerances {
    fn default() -> Self {
        SearchTolerances { tol_sd: Some(1e-10), max_iter: Some(500), timeout: None }
    }
}

/// SearchOptions — configuration of the predictor-weight search.
///
/// Fields
/// ------
/// - `tols`: stopping rules applied to every start.
/// - `strategy`: [`VStrategy`].
/// - `n_random_starts`: seeded random starts run after the equal-V start.
/// - `seed`: seed of the random starts.
/// - `initial_step`: edge length of the initial simplex in θ-space.
/// - `verbose`: attach argmin's terminal observer (requires the `obs_slog`
///   feature; otherwise ignored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub tols: SearchTolerances,
    pub strategy: VStrategy,
    pub n_random_starts: usize,
    pub seed: u64,
    pub initial_step: f64,
    pub verbose: bool,
}

impl SearchOptions {
    /// Construct validated search options.
    ///
    /// Errors
    /// ------
    /// - `OptError::InvalidInitialStep` for a non-positive or non-finite step.
    pub fn new(
        tols: SearchTolerances, strategy: VStrategy, n_random_starts: usize, seed: u64,
        initial_step: f64, verbose: bool,
    ) -> OptResult<Self> {
        verify_initial_step(initial_step)?;
        Ok(SearchOptions { tols, strategy, n_random_starts, seed, initial_step, verbose })
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            tols: SearchTolerances::default(),
            strategy: VStrategy::Nested,
            n_random_starts: DEFAULT_RANDOM_STARTS,
            seed: 0,
            initial_step: DEFAULT_INITIAL_STEP,
            verbose: false,
        }
    }
}

/// StartOutcome — result of one Nelder–Mead run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartOutcome {
    pub theta_hat: Theta,
    pub v: Array1<f64>,
    pub mspe: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl StartOutcome {
    /// Normalize a finished argmin state into a [`StartOutcome`].
    ///
    /// Parameters
    /// ----------
    /// - `theta_hat_opt`: best parameter of the run.
    /// - `mspe`: best cost.
    /// - `termination`: argmin termination status.
    /// - `iterations`: completed iterations.
    /// - `fn_evals`: function-evaluation counters.
    ///
    /// Errors
    /// ------
    /// - `OptError::MissingBestParam` when no best parameter was recorded.
    /// - `OptError::NonFiniteCost` for a non-finite best cost.
    /// - `OptError::NoIterationsCompleted` when the run stopped without
    ///   converging before its first iteration.
    ///
    /// Notes
    /// -----
    /// - Only `SolverConverged` and `TargetCostReached` count as converged.
    ///   Budget or time exhaustion yields `converged = false` with the best
    ///   iterate kept.
    pub fn new(
        theta_hat_opt: Option<Theta>, mspe: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = theta_hat_opt.ok_or(OptError::MissingBestParam)?;
        if !mspe.is_finite() {
            return Err(OptError::NonFiniteCost { value: mspe });
        }
        let (converged, status) = match &termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => (
                matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                ),
                format!("{reason:?}"),
            ),
        };
        if iterations == 0 && !converged {
            return Err(OptError::NoIterationsCompleted { status });
        }
        let v = theta_to_v(&theta_hat);
        Ok(StartOutcome {
            theta_hat,
            v,
            mspe,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
        })
    }
}

/// SearchOutcome — selected predictor weights and the inner solution they
/// induce.
///
/// Fields
/// ------
/// - `v`: predictor weights, nonnegative, summing to one.
/// - `qp`: inner outcome at `v` (donor weights, predictor loss, diagnostics).
/// - `mspe`: pre-intervention MSPE of the outcome at `v`.
/// - `converged`, `status`, `iterations`, `fn_evals`: from the winning start
///   (or trivially converged for non-searched strategies).
/// - `best_start`: index of the winning start (0 = equal-V start).
/// - `starts`: every start, in run order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub v: Array1<f64>,
    pub qp: QpOutcome,
    pub mspe: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub best_start: usize,
    pub starts: Vec<StartOutcome>,
}

impl SearchOutcome {
    /// Outcome of a strategy that evaluates a single `V` without searching.
    pub fn without_search(evaluation: Evaluation, status: &str) -> SearchOutcome {
        SearchOutcome {
            v: evaluation.v,
            qp: evaluation.qp,
            mspe: evaluation.mspe,
            converged: true,
            status: status.to_string(),
            iterations: 0,
            fn_evals: FnEvalMap::new(),
            best_start: 0,
            starts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `VStrategy` parsing.
    // - Validation in `SearchTolerances::new` and `SearchOptions::new`.
    // - Mapping of argmin termination statuses in `StartOutcome::new`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Strategy names parse case-insensitively; unknown names are rejected.
    //
    // Given
    // -----
    // - "NESTED", "equal", "regression".
    //
    // Expect
    // ------
    // - `Nested`, `Equal`, then `InvalidStrategy`.
    fn v_strategy_from_str_is_case_insensitive() {
        assert_eq!("NESTED".parse::<VStrategy>().unwrap(), VStrategy::Nested);
        assert_eq!("equal".parse::<VStrategy>().unwrap(), VStrategy::Equal);
        assert!(matches!(
            "regression".parse::<VStrategy>(),
            Err(OptError::InvalidStrategy { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // At least one stopping rule is required and each rule is validated.
    //
    // Given
    // -----
    // - All `None`; a zero timeout; a timeout-only configuration.
    //
    // Expect
    // ------
    // - `NoTolerancesProvided`, `InvalidTimeout`, then `Ok`.
    fn search_tolerances_require_a_rule() {
        assert_eq!(SearchTolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            SearchTolerances::new(None, None, Some(Duration::ZERO)),
            Err(OptError::InvalidTimeout { .. })
        ));
        assert!(SearchTolerances::new(None, None, Some(Duration::from_millis(50))).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // `SearchOptions::new` rejects a non-positive initial step.
    //
    // Given
    // -----
    // - initial_step = 0.
    //
    // Expect
    // ------
    // - `InvalidInitialStep`.
    fn search_options_reject_bad_step() {
        let err = SearchOptions::new(SearchTolerances::default(), VStrategy::Nested, 0, 0, 0.0, false)
            .unwrap_err();
        assert!(matches!(err, OptError::InvalidInitialStep { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Convergence is reported only for solver convergence; budget exhaustion
    // keeps the iterate with `converged = false`; zero iterations without
    // convergence is an error.
    //
    // Given
    // -----
    // - SolverConverged after 10 iterations, MaxItersReached after 5,
    //   Timeout after 0.
    //
    // Expect
    // ------
    // - converged, not converged, `NoIterationsCompleted`.
    fn start_outcome_maps_termination_status() {
        let theta = array![0.0];

        let ok = StartOutcome::new(
            Some(theta.clone()),
            0.5,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            10,
            FnEvalMap::new(),
        )
        .unwrap();
        assert!(ok.converged);
        assert_eq!(ok.v.len(), 2);

        let budget = StartOutcome::new(
            Some(theta.clone()),
            0.5,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            5,
            FnEvalMap::new(),
        )
        .unwrap();
        assert!(!budget.converged);
        assert_eq!(budget.iterations, 5);

        let none = StartOutcome::new(
            Some(theta),
            0.5,
            TerminationStatus::Terminated(TerminationReason::Timeout),
            0,
            FnEvalMap::new(),
        );
        assert!(matches!(none, Err(OptError::NoIterationsCompleted { .. })));
    }
}
