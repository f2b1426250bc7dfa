use argmin::solver::neldermead::NelderMead;

use crate::optimization::{
    errors::OptResult,
    v_search::{
        traits::SearchOptions,
        types::{NelderMeadSolver, Theta},
    },
};

/// Build a Nelder–Mead solver whose initial simplex is anchored at `theta0`.
///
/// The simplex has `n + 1` vertices: `theta0` and `theta0 + step·e_i` for each
/// coordinate `i`, with `step = opts.initial_step`.
///
/// Errors
/// ------
/// - Argmin's `InvalidParameter` (mapped into `OptError`) if the
///   standard-deviation tolerance is rejected by the backend.
pub fn build_nelder_mead(theta0: &Theta, opts: &SearchOptions) -> OptResult<NelderMeadSolver> {
    let vertices = initial_simplex(theta0, opts.initial_step);
    let mut solver = NelderMead::new(vertices);
    if let Some(tol) = opts.tols.tol_sd {
        solver = solver.with_sd_tolerance(tol)?;
    }
    Ok(solver)
}

pub fn initial_simplex(theta0: &Theta, step: f64) -> Vec<Theta> {
    let n = theta0.len();
    let mut vertices = Vec::with_capacity(n + 1);
    vertices.push(theta0.clone());
    for i in 0..n {
        let mut vertex = theta0.clone();
        vertex[i] += step;
        vertices.push(vertex);
    }
    vertices
}
