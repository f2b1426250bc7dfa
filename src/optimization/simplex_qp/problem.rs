//! Quadratic form of the inner problem.
//!
//! For fixed predictor weights `V`, the inner objective
//! `(x1 − X0·w)ᵀ diag(V) (x1 − X0·w) + ρ‖w‖²` is expanded once into
//!
//! ```text
//! f(w) = wᵀ G w + ρ wᵀw − 2 bᵀw + c
//! G = X0ᵀ diag(V) X0,   b = X0ᵀ diag(V) x1,   c = x1ᵀ diag(V) x1
//! ```
//!
//! so each solver iteration costs one D×D matrix–vector product instead of a
//! pass over the P×D characteristic matrix.
use crate::optimization::{
    errors::{OptError, OptResult},
    validation::{
        validate_finite, validate_finite_matrix, validate_len, validate_non_empty, verify_ridge,
    },
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// QuadraticForm — expanded inner objective for a fixed `V`.
///
/// Fields
/// ------
/// - `gram`: `G = X0ᵀ diag(V) X0`, D×D, symmetric positive semidefinite.
/// - `linear`: `b = X0ᵀ diag(V) x1`, length D.
/// - `constant`: `c = x1ᵀ diag(V) x1`.
/// - `ridge`: ρ ≥ 0.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticForm {
    pub gram: Array2<f64>,
    pub linear: Array1<f64>,
    pub constant: f64,
    pub ridge: f64,
}

impl QuadraticForm {
    /// Build the expanded form from characteristics and predictor weights.
    ///
    /// Parameters
    /// ----------
    /// - `x1`: treated characteristics, length P.
    /// - `x0`: donor characteristics, P×D.
    /// - `v`: predictor weights, length P, nonnegative.
    /// - `ridge`: ridge penalty ρ ≥ 0.
    ///
    /// Errors
    /// ------
    /// - `EmptyProblem` when P or D is zero.
    /// - `DimensionMismatch` for inconsistent shapes.
    /// - `NonFiniteInput` for NaN/±inf entries.
    /// - `InvalidFixedWeights` for negative entries of `v`.
    /// - `InvalidRidge` for a negative or non-finite ridge.
    pub fn new(
        x1: ArrayView1<f64>, x0: ArrayView2<f64>, v: ArrayView1<f64>, ridge: f64,
    ) -> OptResult<Self> {
        validate_non_empty("predictors", x1.len())?;
        validate_non_empty("donors", x0.ncols())?;
        validate_len("donor characteristic rows", x1.len(), x0.nrows())?;
        validate_len("V", x1.len(), v.len())?;
        validate_finite("treated characteristics", x1)?;
        validate_finite_matrix("donor characteristics", x0)?;
        validate_finite("V", v)?;
        if v.iter().any(|&vi| vi < 0.0) {
            return Err(OptError::InvalidFixedWeights { reason: "entries must be non-negative." });
        }
        verify_ridge(ridge)?;

        // diag(V)·X0, scaling row i by v_i.
        let mut weighted = x0.to_owned();
        for (mut row, &vi) in weighted.rows_mut().into_iter().zip(v.iter()) {
            row *= vi;
        }
        let gram = x0.t().dot(&weighted);
        let linear = weighted.t().dot(&x1);
        let constant = x1.iter().zip(v.iter()).map(|(&xi, &vi)| vi * xi * xi).sum();

        Ok(QuadraticForm { gram, linear, constant, ridge })
    }

    /// Number of donors D.
    pub fn dim(&self) -> usize {
        self.linear.len()
    }

    /// Penalized objective `f(w)`.
    pub fn value(&self, w: &Array1<f64>) -> f64 {
        let gw = self.gram.dot(w);
        w.dot(&gw) + self.ridge * w.dot(w) - 2.0 * self.linear.dot(w) + self.constant
    }

    /// Gradient `∇f(w) = 2 (G w + ρ w − b)`.
    pub fn gradient(&self, w: &Array1<f64>) -> Array1<f64> {
        let mut g = self.gram.dot(w);
        g.scaled_add(self.ridge, w);
        g -= &self.linear;
        g * 2.0
    }
}

/// Unpenalized predictor loss `Σ_i v_i (x1_i − (X0 w)_i)²`, computed from the
/// residual so it is nonnegative by construction.
pub fn predictor_loss(
    x1: ArrayView1<f64>, x0: ArrayView2<f64>, v: ArrayView1<f64>, w: &Array1<f64>,
) -> f64 {
    let fitted = x0.dot(w);
    x1.iter().zip(fitted.iter()).zip(v.iter()).map(|((&a, &b), &vi)| vi * (a - b) * (a - b)).sum()
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
    // - Agreement of the expanded form with the residual definition.
    // - The analytic gradient against central differences.
    // - Shape and sign validation.
    // -------------------------------------------------------------------------

    fn toy() -> (Array1<f64>, Array2<f64>, Array1<f64>) {
        let x1 = array![1.0, 2.0, -1.0];
        let x0 = array![[0.0, 2.0, 1.0], [1.0, 3.0, 0.5], [-2.0, 0.0, 1.0]];
        let v = array![0.5, 0.3, 0.2];
        (x1, x0, v)
    }

    #[test]
    // Purpose
    // -------
    // `value` without ridge equals the residual-based predictor loss.
    //
    // Given
    // -----
    // - A 3×3 toy problem and w = [0.2, 0.5, 0.3].
    //
    // Expect
    // ------
    // - `form.value(w) ≈ predictor_loss(..)`.
    fn value_matches_residual_definition() {
        let (x1, x0, v) = toy();
        let form = QuadraticForm::new(x1.view(), x0.view(), v.view(), 0.0).unwrap();
        let w = array![0.2, 0.5, 0.3];

        let expected = predictor_loss(x1.view(), x0.view(), v.view(), &w);
        assert_relative_eq!(form.value(&w), expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient agrees with central finite differences,
    // including the ridge term.
    //
    // Given
    // -----
    // - Toy problem with ρ = 0.1 and w = [0.1, 0.6, 0.3].
    //
    // Expect
    // ------
    // - Componentwise agreement to 1e-6.
    fn gradient_matches_finite_differences() {
        let (x1, x0, v) = toy();
        let form = QuadraticForm::new(x1.view(), x0.view(), v.view(), 0.1).unwrap();
        let w = array![0.1, 0.6, 0.3];
        let g = form.gradient(&w);
        let h = 1e-6;

        for i in 0..3 {
            let mut up = w.clone();
            let mut dn = w.clone();
            up[i] += h;
            dn[i] -= h;
            let fd = (form.value(&up) - form.value(&dn)) / (2.0 * h);
            assert_relative_eq!(g[i], fd, epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Shape mismatches and negative predictor weights are rejected.
    //
    // Given
    // -----
    // - V of length 2 for P = 3; V with a negative entry.
    //
    // Expect
    // ------
    // - `DimensionMismatch` and `InvalidFixedWeights`.
    fn new_rejects_bad_inputs() {
        let (x1, x0, _) = toy();
        let short = array![0.5, 0.5];
        assert!(matches!(
            QuadraticForm::new(x1.view(), x0.view(), short.view(), 0.0),
            Err(OptError::DimensionMismatch { what: "V", .. })
        ));

        let negative = array![0.5, -0.1, 0.6];
        assert!(matches!(
            QuadraticForm::new(x1.view(), x0.view(), negative.view(), 0.0),
            Err(OptError::InvalidFixedWeights { .. })
        ));
    }
}
