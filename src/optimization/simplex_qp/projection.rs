//! Euclidean projection onto the probability simplex.
//!
//! Sort-based algorithm: with `u` the entries sorted in decreasing order,
//! `ρ = max{ j : u_j − (Σ_{k≤j} u_k − 1) / j > 0 }` and
//! `τ = (Σ_{k≤ρ} u_k − 1) / ρ`, the projection is `max(y − τ, 0)`.
//! O(D log D).
use ndarray::{Array1, ArrayView1};

/// Project `y` onto `{ w : w ≥ 0, Σ w = 1 }` in the Euclidean norm.
///
/// An empty input yields an empty output. Inputs are assumed finite.
pub fn project_simplex(y: ArrayView1<f64>) -> Array1<f64> {
    if y.is_empty() {
        return Array1::zeros(0);
    }
    let mut sorted = y.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumsum = 0.0;
    let mut tau = 0.0;
    for (j, &u) in sorted.iter().enumerate() {
        cumsum += u;
        let candidate = (cumsum - 1.0) / (j + 1) as f64;
        if u - candidate > 0.0 {
            tau = candidate;
        }
    }
    y.mapv(|yi| (yi - tau).max(0.0))
}
