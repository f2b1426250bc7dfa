//! Active-set polish for the inner QP.
//!
//! Purpose
//! -------
//! Projected-gradient iterations identify the support of `W*` quickly but
//! converge slowly when `V` makes the Gram matrix badly scaled. Once a
//! candidate support `S` is known, the minimizer over the face
//! `{ w ≥ 0, Σ w = 1, w_i = 0 for i ∉ S }` is the solution of a small linear
//! system, so the last stretch is finished exactly with a primal active-set
//! method started from the current iterate.
//!
//! Key behaviors
//! -------------
//! - Face solve: with `H = G + ρI` restricted to `S`, the current point `w`
//!   and the centering `C = I − 11ᵀ/|S|`, the face minimizer is
//!   `u = w + (C H C)⁺ C (b − H w)`. The pseudoinverse comes from a
//!   symmetric eigendecomposition with rounding-level eigenvalues dropped,
//!   so collinear donors yield the face optimum closest to `w`. A coordinate
//!   that just entered therefore moves strictly into the interior.
//! - A face solution with negative entries is reached only up to the first
//!   blocking coordinate, which then leaves the support.
//! - A feasible face solution is priced against the reduced gradient
//!   `∇f_j − μ` (μ = mean of `∇f` on `S`); the most negative coordinate below
//!   `−tol` enters the support, otherwise the iterate is optimal.
//!
//! Conventions
//! -----------
//! - Every face solve counts as one step against the caller's budget.
//! - `None` means the budget ran out or a face solve produced non-finite
//!   values; the caller keeps its own iterate in that case.
use crate::optimization::{
    numerical_stability::GENERAL_TOL,
    simplex_qp::{conditioning::center, problem::QuadraticForm},
};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Polish a feasible `start` to the exact minimizer of `form` on the simplex.
///
/// Parameters
/// ----------
/// - `form`: expanded inner objective.
/// - `start`: feasible weights; its positive entries form the first support.
/// - `max_steps`: face solves allowed.
/// - `tol`: pricing tolerance on the reduced gradient.
///
/// Returns
/// -------
/// `Some((w, steps))` with an optimal `w` on the simplex, or `None` (see the
/// module conventions).
pub fn polish_support(
    form: &QuadraticForm, start: &Array1<f64>, max_steps: usize, tol: f64,
) -> Option<(Array1<f64>, usize)> {
    let d = form.dim();
    let mut w = start.clone();
    let mut support: Vec<bool> = w.iter().map(|&wi| wi > 0.0).collect();
    if !support.iter().any(|&s| s) {
        return None;
    }

    for step in 1..=max_steps {
        let idx: Vec<usize> = (0..d).filter(|&i| support[i]).collect();
        let u = face_minimizer(form, &idx, &w)?;

        if u.iter().all(|&ui| ui >= 0.0) {
            w.fill(0.0);
            for (&i, &ui) in idx.iter().zip(u.iter()) {
                w[i] = ui;
            }
            let g = form.gradient(&w);
            let mu = idx.iter().map(|&i| g[i]).sum::<f64>() / idx.len() as f64;
            let entering = (0..d)
                .filter(|&j| !support[j])
                .map(|j| (j, g[j] - mu))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            match entering {
                Some((j, reduced)) if reduced < -tol => support[j] = true,
                _ => return Some((w, step)),
            }
        } else {
            let mut alpha = 1.0_f64;
            for (&i, &ui) in idx.iter().zip(u.iter()) {
                if ui < 0.0 {
                    alpha = alpha.min(w[i] / (w[i] - ui));
                }
            }
            for (&i, &ui) in idx.iter().zip(u.iter()) {
                w[i] += alpha * (ui - w[i]);
                if w[i] <= 0.0 || (ui < 0.0 && w[i] <= GENERAL_TOL) {
                    w[i] = 0.0;
                    support[i] = false;
                }
            }
            if !support.iter().any(|&s| s) {
                return None;
            }
        }
    }
    None
}

// Minimizer over the affine hull of the face spanned by `idx`, closest to `w`.
fn face_minimizer(form: &QuadraticForm, idx: &[usize], w: &Array1<f64>) -> Option<Array1<f64>> {
    let k = idx.len();
    if k == 1 {
        return Some(Array1::ones(1));
    }

    let h = Array2::from_shape_fn((k, k), |(a, b)| {
        form.gram[[idx[a], idx[b]]] + if a == b { form.ridge } else { 0.0 }
    });
    let w_s = Array1::from_shape_fn(k, |a| w[idx[a]]);
    let b = Array1::from_shape_fn(k, |a| form.linear[idx[a]]);
    let mut rhs = &b - &h.dot(&w_s);
    let mean = rhs.sum() / k as f64;
    rhs -= mean;

    let u = w_s + pseudo_solve(&center(&h), &rhs);
    u.iter().all(|ui| ui.is_finite()).then_some(u)
}

// M⁺ r for symmetric PSD M, dropping eigenvalues at rounding level.
fn pseudo_solve(m: &Array2<f64>, r: &Array1<f64>) -> Array1<f64> {
    let k = m.nrows();
    let eigen = DMatrix::<f64>::from_fn(k, k, |i, j| m[[i, j]]).symmetric_eigen();
    let lambda_max = eigen.eigenvalues.iter().copied().fold(0.0_f64, f64::max);
    if lambda_max <= GENERAL_TOL {
        return Array1::zeros(k);
    }
    let cutoff = f64::EPSILON * k as f64 * lambda_max;

    let rhs = DVector::<f64>::from_iterator(k, r.iter().copied());
    let q = &eigen.eigenvectors;
    let mut x = DVector::<f64>::zeros(k);
    for (col, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda > cutoff {
            let coef = q.column(col).dot(&rhs) / lambda;
            x.axpy(coef, &q.column(col), 1.0);
        }
    }
    Array1::from_iter(x.iter().copied())
}
