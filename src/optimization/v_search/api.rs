use crate::optimization::{
    errors::{OptError, OptResult},
    v_search::{
        adapter::{PredictorFitProblem, VSearchAdapter, v_to_theta},
        builders::build_nelder_mead,
        run::run_nelder_mead,
        traits::{SearchOptions, SearchOutcome, StartOutcome, VStrategy},
    },
    validation::validate_fixed_weights,
};
use ndarray::Array1;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Exp1};
use tracing::debug;

/// Choose predictor weights `V` according to `opts.strategy` and solve the
/// inner problem at the chosen `V`.
///
/// Parameters
/// ----------
/// - `problem`: validated bi-level inputs.
/// - `opts`: strategy, stopping rules, and multi-start settings.
///
/// Returns
/// -------
/// OptResult<SearchOutcome>
///   `V`, `W*(V)`, and the pre-intervention MSPE.
///
/// Errors
/// ------
/// - `DimensionMismatch` / `InvalidFixedWeights` for bad fixed weights.
/// - Any error raised by an inner solve or a Nelder–Mead run.
///
/// Notes
/// -----
/// - With a single predictor `V = [1]` is the only feasible point, so the
///   nested strategy skips the search.
pub fn fit_predictor_weights(
    problem: &PredictorFitProblem<'_>, opts: &SearchOptions,
) -> OptResult<SearchOutcome> {
    let p = problem.n_predictors();
    match &opts.strategy {
        VStrategy::Equal => {
            let v = Array1::from_elem(p, 1.0 / p as f64);
            Ok(SearchOutcome::without_search(problem.evaluate(v.view())?, "Equal predictor weights"))
        }
        VStrategy::Fixed(weights) => {
            let v = validate_fixed_weights(Array1::from_vec(weights.clone()).view(), p)?;
            Ok(SearchOutcome::without_search(problem.evaluate(v.view())?, "Fixed predictor weights"))
        }
        VStrategy::Nested if p == 1 => {
            let v = Array1::ones(1);
            Ok(SearchOutcome::without_search(problem.evaluate(v.view())?, "Single predictor"))
        }
        VStrategy::Nested => search_predictor_weights(problem, opts),
    }
}

/// Multi-start Nelder–Mead search over `V`.
///
/// Start 0 is equal weights; the remaining `opts.n_random_starts` starts are
/// Dirichlet(1) draws from a `StdRng` seeded with `opts.seed`. The start with
/// the strictly smallest MSPE wins, so ties go to the earliest start. The
/// inner problem is re-solved at the winning `V`.
pub fn search_predictor_weights(
    problem: &PredictorFitProblem<'_>, opts: &SearchOptions,
) -> OptResult<SearchOutcome> {
    let p = problem.n_predictors();
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut initial = Vec::with_capacity(opts.n_random_starts + 1);
    initial.push(Array1::from_elem(p, 1.0 / p as f64));
    for _ in 0..opts.n_random_starts {
        initial.push(dirichlet_start(&mut rng, p));
    }

    let mut starts: Vec<StartOutcome> = Vec::with_capacity(initial.len());
    let mut best: Option<usize> = None;
    for (k, v0) in initial.iter().enumerate() {
        let theta0 = v_to_theta(v0.view());
        let solver = build_nelder_mead(&theta0, opts)?;
        let outcome = run_nelder_mead(VSearchAdapter::new(problem), solver, opts)?;
        debug!(
            start = k,
            mspe = outcome.mspe,
            converged = outcome.converged,
            iterations = outcome.iterations,
            "predictor-weight start finished"
        );
        if best.map_or(true, |b| outcome.mspe < starts[b].mspe) {
            best = Some(k);
        }
        starts.push(outcome);
    }

    let best_start = best.ok_or(OptError::MissingBestParam)?;
    let winner = &starts[best_start];
    let evaluation = problem.evaluate(winner.v.view())?;
    Ok(SearchOutcome {
        v: evaluation.v,
        qp: evaluation.qp,
        mspe: evaluation.mspe,
        converged: winner.converged,
        status: winner.status.clone(),
        iterations: winner.iterations,
        fn_evals: winner.fn_evals.clone(),
        best_start,
        starts,
    })
}

// Dirichlet(1, …, 1) via normalized Exp(1) draws.
fn dirichlet_start<R: Rng + ?Sized>(rng: &mut R, p: usize) -> Array1<f64> {
    let draws: Array1<f64> = (0..p)
        .map(|_| {
            let x: f64 = Exp1.sample(rng);
            x
        })
        .collect();
    let total = draws.sum();
    if total > 0.0 { draws / total } else { Array1::from_elem(p, 1.0 / p as f64) }
}
