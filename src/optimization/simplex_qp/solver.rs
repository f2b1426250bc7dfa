//! Accelerated projected-gradient solver for the inner QP.
//!
//! Purpose
//! -------
//! Minimize `f(w) = (x1 − X0·w)ᵀ diag(V) (x1 − X0·w) + ρ‖w‖²` over the
//! probability simplex.
//!
//! Key behaviors
//! -------------
//! - FISTA with step `1/L`, `L = 2 (λ_max(G) + ρ)`, Euclidean projection onto
//!   the simplex, and gradient-based adaptive restart of the momentum.
//! - Starts from the uniform vector `1/D`.
//! - Every `POLISH_INTERVAL` iterations the current support is handed to
//!   [`polish_support`], which finishes the problem exactly when the support
//!   is close to the optimal one. A polished point replaces the iterate only
//!   if it does not increase the objective, and the momentum restarts there.
//! - Stops when the Frank–Wolfe gap `∇f(w)·w − min_i ∇f(w)_i` falls below
//!   `tol_gap · (1 + |f(w)|)`, or when the iteration budget is spent.
//!   Active-set steps count against the same budget.
//! - The final iterate is clamped at zero and renormalized so it lies on the
//!   simplex to machine precision.
//!
//! Edge cases
//! ----------
//! - D = 1: `W = [1]` immediately (single feasible point).
//! - `L ≈ 0` (all weighted characteristics vanish): every `W` is optimal and
//!   the uniform vector is returned as converged.
use crate::optimization::{
    errors::OptResult,
    numerical_stability::{GENERAL_TOL, renormalize_simplex},
    simplex_qp::{
        active_set::polish_support,
        conditioning::{Conditioning, analyze_gram},
        problem::{QuadraticForm, predictor_loss},
        projection::project_simplex,
        traits::{QpOptions, QpOutcome},
    },
};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Projected-gradient iterations between two active-set polish attempts.
pub const POLISH_INTERVAL: usize = 50;

/// Solve the inner simplex-constrained QP for fixed predictor weights `v`.
///
/// Parameters
/// ----------
/// - `x1`: treated characteristics, length P.
/// - `x0`: donor characteristics, P×D.
/// - `v`: nonnegative predictor weights, length P.
/// - `opts`: tolerances, budget, and ridge.
///
/// Returns
/// -------
/// OptResult<QpOutcome>
///   Weights on the simplex, predictor loss, and diagnostics. Running out of
///   iterations is reported through `converged = false`.
///
/// Errors
/// ------
/// - Shape, finiteness, and sign errors from [`QuadraticForm::new`].
pub fn solve_simplex_qp(
    x1: ArrayView1<f64>, x0: ArrayView2<f64>, v: ArrayView1<f64>, opts: &QpOptions,
) -> OptResult<QpOutcome> {
    let form = QuadraticForm::new(x1, x0, v, opts.ridge)?;
    let d = form.dim();

    if d == 1 {
        let weights = Array1::ones(1);
        return Ok(QpOutcome {
            loss: predictor_loss(x1, x0, v, &weights),
            weights,
            gap: 0.0,
            iterations: 0,
            converged: true,
            conditioning: Conditioning::trivial(form.gram[[0, 0]]),
        });
    }

    let conditioning = analyze_gram(&form.gram, v);
    let lipschitz = 2.0 * (conditioning.lambda_max + opts.ridge);
    let uniform = Array1::from_elem(d, 1.0 / d as f64);

    if lipschitz <= GENERAL_TOL {
        return Ok(QpOutcome {
            loss: predictor_loss(x1, x0, v, &uniform),
            weights: uniform,
            gap: 0.0,
            iterations: 0,
            converged: true,
            conditioning,
        });
    }

    let step = 1.0 / lipschitz;
    let mut w = uniform;
    let mut y = w.clone();
    let mut momentum = 1.0_f64;
    let mut gap = frank_wolfe_gap(&form, &w);
    let mut converged = gap_reached(&form, &w, gap, opts.tol_gap);
    let mut iterations = 0;

    while !converged && iterations < opts.max_iter {
        let mut trial = y.clone();
        trial.scaled_add(-step, &form.gradient(&y));
        let w_next = project_simplex(trial.view());

        // Restart when the generalized gradient and the last step disagree.
        let restart = (&y - &w_next).dot(&(&w_next - &w)) > 0.0;
        if restart {
            momentum = 1.0;
            y = w_next.clone();
        } else {
            let next_momentum = 0.5 * (1.0 + (1.0 + 4.0 * momentum * momentum).sqrt());
            let beta = (momentum - 1.0) / next_momentum;
            y = &w_next + &((&w_next - &w) * beta);
            momentum = next_momentum;
        }
        w = w_next;
        iterations += 1;

        gap = frank_wolfe_gap(&form, &w);
        converged = gap_reached(&form, &w, gap, opts.tol_gap);

        if !converged && iterations % POLISH_INTERVAL == 0 {
            let budget = (opts.max_iter - iterations).min(4 * d + 10);
            match polish_support(&form, &w, budget, 0.5 * opts.tol_gap) {
                Some((polished, steps)) => {
                    iterations += steps;
                    let current = form.value(&w);
                    if form.value(&polished) <= current + GENERAL_TOL * (1.0 + current.abs()) {
                        w = polished;
                        y = w.clone();
                        momentum = 1.0;
                        gap = frank_wolfe_gap(&form, &w);
                        converged = gap_reached(&form, &w, gap, opts.tol_gap);
                    }
                }
                None => iterations += budget,
            }
        }
    }

    renormalize_simplex(&mut w);
    Ok(QpOutcome {
        loss: predictor_loss(x1, x0, v, &w),
        weights: w,
        gap,
        iterations,
        converged,
        conditioning,
    })
}

/// `∇f(w)·w − min_i ∇f(w)_i`, an upper bound on `f(w) − f*` over the simplex.
fn frank_wolfe_gap(form: &QuadraticForm, w: &Array1<f64>) -> f64 {
    let g = form.gradient(w);
    let min = g.fold(f64::INFINITY, |acc, &x| acc.min(x));
    (g.dot(w) - min).max(0.0)
}

fn gap_reached(form: &QuadraticForm, w: &Array1<f64>, gap: f64, tol: f64) -> bool {
    gap <= tol * (1.0 + form.value(w).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::numerical_stability::SIMPLEX_TOL;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact recovery of convex combinations (interior and vertex optima).
    // - Projection of infeasible targets onto the closest face.
    // - Short-circuits for D = 1 and vanishing curvature.
    // - Exact convergence under badly scaled predictor weights.
    // - Feasibility of returned weights and non-convergence reporting.
    //
    // They intentionally DO NOT cover:
    // - The outer V search (see `v_search`).
    // -------------------------------------------------------------------------

    // Four affinely independent donors in ℝ³ (P = 3, D = 4).
    fn donors() -> Array2<f64> {
        array![[1.0, 3.0, 0.0, 2.0], [0.0, 2.0, 4.0, 1.0], [2.0, 0.0, 1.0, 5.0]]
    }

    fn assert_on_simplex(w: &Array1<f64>) {
        assert!(w.iter().all(|&x| x >= 0.0));
        assert_abs_diff_eq!(w.sum(), 1.0, epsilon = SIMPLEX_TOL);
    }

    #[test]
    // Purpose
    // -------
    // A treated vector equal to the mean of donors 0 and 1 is recovered
    // exactly for different strictly positive V.
    //
    // Given
    // -----
    // - x1 = (X0[:,0] + X0[:,1]) / 2, V ∈ {uniform, [0.7, 0.2, 0.1]}.
    //
    // Expect
    // ------
    // - W ≈ [0.5, 0.5, 0, 0], loss ≈ 0, converged.
    fn recovers_two_donor_midpoint() {
        let x0 = donors();
        let x1 = (&x0.column(0) + &x0.column(1)) * 0.5;

        for v in [array![1.0, 1.0, 1.0] / 3.0, array![0.7, 0.2, 0.1]] {
            let out =
                solve_simplex_qp(x1.view(), x0.view(), v.view(), &QpOptions::default()).unwrap();

            assert_on_simplex(&out.weights);
            assert_abs_diff_eq!(out.weights[0], 0.5, epsilon = 1e-4);
            assert_abs_diff_eq!(out.weights[1], 0.5, epsilon = 1e-4);
            assert_abs_diff_eq!(out.weights[2], 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(out.weights[3], 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(out.loss, 0.0, epsilon = 1e-8);
            assert!(out.converged);
        }
    }

    #[test]
    // Purpose
    // -------
    // A treated vector identical to one donor puts all weight on it.
    //
    // Given
    // -----
    // - x1 = X0[:,2].
    //
    // Expect
    // ------
    // - W ≈ e₂, loss ≈ 0.
    fn recovers_identical_donor() {
        let x0 = donors();
        let x1 = x0.column(2).to_owned();
        let v = array![0.2, 0.5, 0.3];

        let out = solve_simplex_qp(x1.view(), x0.view(), v.view(), &QpOptions::default()).unwrap();

        assert_on_simplex(&out.weights);
        assert_abs_diff_eq!(out.weights[2], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(out.loss, 0.0, epsilon = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // A target outside the donor hull is matched by the closest hull point.
    //
    // Given
    // -----
    // - P = 1, donors at 1 and 3, treated at 5, V = [1].
    //
    // Expect
    // ------
    // - W = [0, 1], loss = (5 − 3)² = 4.
    fn projects_infeasible_target_to_nearest_face() {
        let x0 = array![[1.0, 3.0]];
        let x1 = array![5.0];
        let v = array![1.0];

        let out = solve_simplex_qp(x1.view(), x0.view(), v.view(), &QpOptions::default()).unwrap();

        assert_abs_diff_eq!(out.weights[1], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(out.loss, 4.0, epsilon = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // One donor means one feasible point, whatever V is.
    //
    // Given
    // -----
    // - D = 1, P = 2, V = [0.9, 0.1].
    //
    // Expect
    // ------
    // - W = [1], zero iterations, converged.
    fn single_donor_short_circuits() {
        let x0 = array![[2.0], [3.0]];
        let x1 = array![1.0, 1.0];
        let v = array![0.9, 0.1];

        let out = solve_simplex_qp(x1.view(), x0.view(), v.view(), &QpOptions::default()).unwrap();

        assert_eq!(out.weights, array![1.0]);
        assert_eq!(out.iterations, 0);
        assert!(out.converged);
        assert_abs_diff_eq!(out.loss, 0.9 * 1.0 + 0.1 * 4.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // With all weight on an all-zero predictor row the objective is flat and
    // the uniform vector is returned.
    //
    // Given
    // -----
    // - Row 0 of X0 and x1 are zero; V = [1, 0].
    //
    // Expect
    // ------
    // - W = [1/3, 1/3, 1/3], converged, loss 0.
    fn flat_objective_returns_uniform_weights() {
        let x0 = array![[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]];
        let x1 = array![0.0, 2.0];
        let v = array![1.0, 0.0];

        let out = solve_simplex_qp(x1.view(), x0.view(), v.view(), &QpOptions::default()).unwrap();

        for &wi in out.weights.iter() {
            assert_abs_diff_eq!(wi, 1.0 / 3.0, epsilon = 1e-15);
        }
        assert!(out.converged);
        assert_abs_diff_eq!(out.loss, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // A one-iteration budget yields a feasible but unconverged result
    // rather than an error.
    //
    // Given
    // -----
    // - Midpoint target, `max_iter = 1`, extremely tight gap tolerance.
    //
    // Expect
    // ------
    // - `converged == false`, `iterations == 1`, weights on the simplex.
    fn exhausted_budget_is_not_an_error() {
        let x0 = donors();
        let x1 = array![2.0, 1.0, 1.0];
        let v = array![1.0, 1.0, 1.0] / 3.0;
        let opts = QpOptions::new(1e-300, 1, 0.0).unwrap();

        let out = solve_simplex_qp(x1.view(), x0.view(), v.view(), &opts).unwrap();

        assert!(!out.converged);
        assert_eq!(out.iterations, 1);
        assert_on_simplex(&out.weights);
    }

    #[test]
    // Purpose
    // -------
    // Predictor weights concentrated on one row make the Gram matrix badly
    // scaled; the active-set polish still reaches the exact optimum well
    // within a small budget.
    //
    // Given
    // -----
    // - Midpoint of donors 0 and 1, V = [0.9998, 1e-4, 1e-4],
    //   `tol_gap = 1e-12`, `max_iter = 200`.
    //
    // Expect
    // ------
    // - Converged, W ≈ [0.5, 0.5, 0, 0] to 1e-8, loss ≈ 0.
    fn badly_scaled_weights_converge_exactly() {
        let x0 = donors();
        let x1 = (&x0.column(0) + &x0.column(1)) * 0.5;
        let v = array![0.9998, 1e-4, 1e-4];
        let opts = QpOptions::new(1e-12, 200, 0.0).unwrap();

        let out = solve_simplex_qp(x1.view(), x0.view(), v.view(), &opts).unwrap();

        assert!(out.converged);
        assert!(out.iterations <= 200);
        assert_on_simplex(&out.weights);
        assert_abs_diff_eq!(out.weights[0], 0.5, epsilon = 1e-8);
        assert_abs_diff_eq!(out.weights[1], 0.5, epsilon = 1e-8);
        assert_abs_diff_eq!(out.weights[2], 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(out.weights[3], 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(out.loss, 0.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Duplicate donors are reported as ill-conditioned while still
    // producing a feasible, zero-loss weight vector.
    //
    // Given
    // -----
    // - Donors 0 and 1 identical; treated equals that shared column.
    //
    // Expect
    // ------
    // - `ill_conditioned`, W₀ + W₁ ≈ 1, loss ≈ 0.
    fn duplicate_donors_flag_ill_conditioning() {
        let x0 = array![[1.0, 1.0, 0.0], [2.0, 2.0, 1.0], [0.0, 0.0, 3.0]];
        let x1 = x0.column(0).to_owned();
        let v = array![1.0, 1.0, 1.0] / 3.0;

        let out = solve_simplex_qp(x1.view(), x0.view(), v.view(), &QpOptions::default()).unwrap();

        assert!(out.conditioning.ill_conditioned);
        assert_on_simplex(&out.weights);
        assert_abs_diff_eq!(out.weights[0] + out.weights[1], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(out.loss, 0.0, epsilon = 1e-8);
    }
}
