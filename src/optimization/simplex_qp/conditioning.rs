//! Spectral conditioning diagnostics for the inner Gram matrix.
//!
//! Purpose
//! -------
//! Summarize the curvature of `G = X0ᵀ diag(V) X0`. The largest eigenvalue of
//! `G` fixes the projected-gradient step size. Uniqueness of `W` depends only
//! on the curvature along the simplex, i.e. on the centered matrix
//! `C G C` with `C = I − 11ᵀ/D`. A rank of `C G C` below
//! `min(nnz(V), D − 1)` signals near-duplicate (or affinely dependent) donor
//! characteristics, where the optimal `W` is not unique.
//!
//! Conventions
//! -----------
//! - `ndarray` input is copied into a `nalgebra::DMatrix` and decomposed with
//!   `symmetric_eigenvalues`; matrices are assumed symmetric.
//! - An eigenvalue counts toward the rank when it exceeds
//!   `EIGEN_EPS · λ_max(C G C)`. When that maximum itself is below
//!   `GENERAL_TOL` the rank is zero.
//! - A predictor counts as active when `V_i > EIGEN_EPS · max(V)`; softmax
//!   weights never reach exactly zero.
use crate::optimization::numerical_stability::{EIGEN_EPS, GENERAL_TOL};
use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Conditioning — spectral summary of the inner Gram matrix.
///
/// Fields
/// ------
/// - `lambda_max`: largest eigenvalue of `G`.
/// - `effective_rank`: rank of `G` along the simplex.
/// - `max_rank`: `min(nnz(V), D − 1)`, the rank of a well-posed problem.
/// - `ill_conditioned`: `effective_rank < max_rank`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditioning {
    pub lambda_max: f64,
    pub effective_rank: usize,
    pub max_rank: usize,
    pub ill_conditioned: bool,
}

impl Conditioning {
    /// Conditioning of a single-donor problem: no free direction.
    pub fn trivial(lambda: f64) -> Conditioning {
        Conditioning {
            lambda_max: lambda.max(0.0),
            effective_rank: 0,
            max_rank: 0,
            ill_conditioned: false,
        }
    }
}

/// Analyze the symmetric Gram matrix `gram` built with predictor weights `v`.
pub fn analyze_gram(gram: &Array2<f64>, v: ArrayView1<f64>) -> Conditioning {
    let n = gram.nrows();
    let lambda_max = max_eigenvalue(&symmetric_eigenvalues(gram));

    let tangent = symmetric_eigenvalues(&center(gram));
    let tangent_max = max_eigenvalue(&tangent);
    let effective_rank = if tangent_max <= GENERAL_TOL {
        0
    } else {
        tangent.iter().filter(|&&l| l > EIGEN_EPS * tangent_max).count()
    };
    let v_max = v.iter().copied().fold(0.0_f64, f64::max);
    let active = v.iter().filter(|&&vi| vi > EIGEN_EPS * v_max).count();
    let max_rank = active.min(n.saturating_sub(1));

    Conditioning { lambda_max, effective_rank, max_rank, ill_conditioned: effective_rank < max_rank }
}

/// `C G C` with `C = I − 11ᵀ/n` (double centering).
pub(crate) fn center(gram: &Array2<f64>) -> Array2<f64> {
    let n = gram.nrows() as f64;
    let row_means = gram.sum_axis(Axis(1)) / n;
    let col_means = gram.sum_axis(Axis(0)) / n;
    let grand = gram.sum() / (n * n);
    Array2::from_shape_fn(gram.dim(), |(i, j)| {
        gram[[i, j]] - row_means[i] - col_means[j] + grand
    })
}

fn symmetric_eigenvalues(matrix: &Array2<f64>) -> Vec<f64> {
    let n = matrix.nrows();
    let dm = DMatrix::<f64>::from_fn(n, n, |i, j| matrix[[i, j]]);
    dm.symmetric_eigenvalues().iter().copied().collect()
}

fn max_eigenvalue(eigenvalues: &[f64]) -> f64 {
    eigenvalues.iter().copied().fold(0.0_f64, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The step-size eigenvalue of a diagonal Gram matrix.
    // - Rank deficiency along the simplex from duplicate donor columns.
    // - The `min(nnz(V), D − 1)` ceiling when some predictor weights are zero
    //   or vanish relative to the largest one.
    // -------------------------------------------------------------------------

    fn gram_of(x0: &Array2<f64>, v: &ndarray::Array1<f64>) -> Array2<f64> {
        let mut weighted = x0.clone();
        for (mut row, &vi) in weighted.rows_mut().into_iter().zip(v.iter()) {
            row *= vi;
        }
        x0.t().dot(&weighted)
    }

    #[test]
    // Purpose
    // -------
    // A diagonal Gram matrix reports its largest diagonal entry and full
    // rank along the simplex.
    //
    // Given
    // -----
    // - G = diag(4, 1), V = [0.5, 0.5].
    //
    // Expect
    // ------
    // - λ_max = 4, rank 1 = min(2, 1), not ill-conditioned.
    fn diagonal_gram_is_well_conditioned() {
        let gram = array![[4.0, 0.0], [0.0, 1.0]];
        let c = analyze_gram(&gram, array![0.5, 0.5].view());

        assert_relative_eq!(c.lambda_max, 4.0, epsilon = 1e-12);
        assert_eq!(c.effective_rank, 1);
        assert_eq!(c.max_rank, 1);
        assert!(!c.ill_conditioned);
    }

    #[test]
    // Purpose
    // -------
    // Two identical donors leave a flat direction along the simplex.
    //
    // Given
    // -----
    // - X0 with identical columns 0 and 1 and a distinct column 2, P = 3,
    //   V uniform.
    //
    // Expect
    // ------
    // - Rank 1 < min(3, 2) ⇒ ill-conditioned.
    fn duplicate_donors_are_flagged() {
        let x0 = array![[1.0, 1.0, 0.0], [2.0, 2.0, 1.0], [0.0, 0.0, 3.0]];
        let v = array![1.0, 1.0, 1.0] / 3.0;
        let c = analyze_gram(&gram_of(&x0, &v), v.view());

        assert_eq!(c.max_rank, 2);
        assert_eq!(c.effective_rank, 1);
        assert!(c.ill_conditioned);
    }

    #[test]
    // Purpose
    // -------
    // Fewer predictors than donors is not by itself ill-conditioning when
    // the donors differ along the simplex.
    //
    // Given
    // -----
    // - P = 2 with V = [1, 0] (one active predictor), D = 2, G of rank 1.
    //
    // Expect
    // ------
    // - max_rank 1, effective_rank 1, not ill-conditioned.
    fn zero_weights_lower_max_rank() {
        let gram = array![[1.0, 2.0], [2.0, 4.0]];
        let c = analyze_gram(&gram, array![1.0, 0.0].view());

        assert_eq!(c.max_rank, 1);
        assert_eq!(c.effective_rank, 1);
        assert!(!c.ill_conditioned);
    }

    #[test]
    // Purpose
    // -------
    // A predictor weight that vanishes relative to the others does not
    // raise the rank ceiling.
    //
    // Given
    // -----
    // - Three donors on a line in the first predictor; the second predictor
    //   carries V = 2e-12 against V = 1, as softmax produces.
    //
    // Expect
    // ------
    // - max_rank 1, effective_rank 1, not ill-conditioned.
    fn vanishing_weight_is_inactive() {
        let x0 = array![[0.0, 1.0, 3.0], [5.0, -2.0, 1.0]];
        let v = array![1.0, 2e-12];
        let c = analyze_gram(&gram_of(&x0, &v), v.view());

        assert_eq!(c.max_rank, 1);
        assert_eq!(c.effective_rank, 1);
        assert!(!c.ill_conditioned);
    }
}
