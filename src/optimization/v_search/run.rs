use crate::optimization::{
    errors::OptResult,
    v_search::{
        adapter::VSearchAdapter,
        traits::{SearchOptions, StartOutcome},
        types::NelderMeadSolver,
    },
};
use argmin::core::{Executor, State};

/// Run one Nelder–Mead search to completion and normalize its state.
///
/// Parameters
/// ----------
/// - `problem`: outer objective in θ-space.
/// - `solver`: configured solver (see [`build_nelder_mead`](super::builders::build_nelder_mead)).
/// - `opts`: iteration budget, timeout, and verbosity.
///
/// Returns
/// -------
/// OptResult<StartOutcome>
///   Best iterate, its MSPE, and the termination status.
///
/// Errors
/// ------
/// - Any `OptError` raised by the objective (recovered from argmin's error).
/// - See [`StartOutcome::new`] for outcome validation errors.
pub fn run_nelder_mead(
    problem: VSearchAdapter<'_, '_>, solver: NelderMeadSolver, opts: &SearchOptions,
) -> OptResult<StartOutcome> {
    let mut optimizer = Executor::new(problem, solver);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }
    if let Some(timeout) = opts.tols.timeout {
        optimizer = optimizer.timeout(timeout);
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    StartOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
    )
}
