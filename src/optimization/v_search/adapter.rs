//! Outer objective and its bridge into argmin.
//!
//! Purpose
//! -------
//! Define the bi-level objective of the predictor-weight search: for a
//! candidate `V`, solve the inner QP for `W*(V)` and score the implied
//! synthetic outcome against the treated outcome over the pre-intervention
//! window. [`VSearchAdapter`] exposes that objective to argmin in the
//! unconstrained θ-coordinates.
//!
//! Key behaviors
//! -------------
//! - [`PredictorFitProblem::new`] validates shapes and finiteness once, so
//!   every later evaluation can assume consistent inputs.
//! - [`PredictorFitProblem::evaluate`] returns the inner outcome plus the
//!   outer MSPE for a given `V`.
//! - [`theta_to_v`] / [`v_to_theta`] map between `V` on the simplex and
//!   θ ∈ ℝ^{P−1}; the first logit is pinned to zero to remove the shift
//!   invariance of softmax.
//!
//! Conventions
//! -----------
//! - Naming follows the synthetic-control literature: `x1`/`x0` are
//!   characteristics (P, P×D), `z1`/`z0` are pre-window outcomes (T0, T0×D).
//! - Errors raised inside `cost` are [`OptError`]s boxed into argmin's error
//!   type; `OptError::from` recovers them after the run.
use crate::optimization::{
    errors::{OptError, OptResult},
    numerical_stability::{safe_softmax, softmax_inv},
    simplex_qp::{QpOptions, QpOutcome, solve_simplex_qp},
    v_search::types::{Cost, Theta},
    validation::{validate_finite, validate_finite_matrix, validate_len, validate_non_empty},
};
use argmin::core::{CostFunction, Error};
use ndarray::{Array1, ArrayView1, ArrayView2, s};

/// PredictorFitProblem — numeric inputs of the bi-level fit.
#[derive(Debug, Clone)]
pub struct PredictorFitProblem<'a> {
    pub x1: ArrayView1<'a, f64>,
    pub x0: ArrayView2<'a, f64>,
    pub z1: ArrayView1<'a, f64>,
    pub z0: ArrayView2<'a, f64>,
    pub qp: QpOptions,
}

/// Evaluation — inner solution and outer loss for one `V`.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub v: Array1<f64>,
    pub qp: QpOutcome,
    pub mspe: f64,
}

impl<'a> PredictorFitProblem<'a> {
    /// Validate and bundle the inputs.
    ///
    /// Errors
    /// ------
    /// - `EmptyProblem` when P, D, or T0 is zero.
    /// - `DimensionMismatch` when `x0` is not P×D or `z0` is not T0×D.
    /// - `NonFiniteInput` for NaN/±inf entries.
    pub fn new(
        x1: ArrayView1<'a, f64>, x0: ArrayView2<'a, f64>, z1: ArrayView1<'a, f64>,
        z0: ArrayView2<'a, f64>, qp: QpOptions,
    ) -> OptResult<Self> {
        validate_non_empty("predictors", x1.len())?;
        validate_non_empty("donors", x0.ncols())?;
        validate_non_empty("pre-intervention periods", z1.len())?;
        validate_len("donor characteristic rows", x1.len(), x0.nrows())?;
        validate_len("donor pre-period rows", z1.len(), z0.nrows())?;
        validate_len("donor pre-period columns", x0.ncols(), z0.ncols())?;
        validate_finite("treated characteristics", x1)?;
        validate_finite_matrix("donor characteristics", x0)?;
        validate_finite("treated pre-period outcomes", z1)?;
        validate_finite_matrix("donor pre-period outcomes", z0)?;
        Ok(PredictorFitProblem { x1, x0, z1, z0, qp })
    }

    pub fn n_predictors(&self) -> usize {
        self.x1.len()
    }

    pub fn n_donors(&self) -> usize {
        self.x0.ncols()
    }

    /// Pre-intervention MSPE of the synthetic outcome built from `w`.
    pub fn mspe(&self, w: &Array1<f64>) -> f64 {
        let synthetic = self.z0.dot(w);
        let sse: f64 =
            self.z1.iter().zip(synthetic.iter()).map(|(&a, &b)| (a - b) * (a - b)).sum();
        sse / self.z1.len() as f64
    }

    /// Solve the inner QP for `v` and score it.
    pub fn evaluate(&self, v: ArrayView1<f64>) -> OptResult<Evaluation> {
        let qp = solve_simplex_qp(self.x1, self.x0, v, &self.qp)?;
        let mspe = self.mspe(&qp.weights);
        if !mspe.is_finite() {
            return Err(OptError::NonFiniteCost { value: mspe });
        }
        Ok(Evaluation { v: v.to_owned(), qp, mspe })
    }
}

/// `V = softmax([0, θ])`.
pub fn theta_to_v(theta: &Theta) -> Array1<f64> {
    let mut logits = Array1::zeros(theta.len() + 1);
    logits.slice_mut(s![1..]).assign(theta);
    safe_softmax(logits.view())
}

/// Inverse of [`theta_to_v`] (zero entries of `v` are floored).
pub fn v_to_theta(v: ArrayView1<f64>) -> Theta {
    let logits = softmax_inv(v);
    let pin = logits[0];
    logits.slice(s![1..]).mapv(|l| l - pin)
}

/// VSearchAdapter — argmin view of the outer objective in θ-space.
#[derive(Debug, Clone)]
pub struct VSearchAdapter<'p, 'a> {
    pub problem: &'p PredictorFitProblem<'a>,
}

impl<'p, 'a> VSearchAdapter<'p, 'a> {
    pub fn new(problem: &'p PredictorFitProblem<'a>) -> Self {
        VSearchAdapter { problem }
    }
}

impl CostFunction for VSearchAdapter<'_, '_> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let v = theta_to_v(theta);
        let evaluation = self.problem.evaluate(v.view())?;
        Ok(evaluation.mspe)
    }
}
