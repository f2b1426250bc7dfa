//! Errors for the synthetic-control orchestration layer.
//!
//! [`SynthError`] wraps the two lower layers ([`PanelError`] from data
//! preparation, [`OptError`] from the weight solver) and adds the failures
//! that only make sense once a fit is assembled: inconsistent weight
//! vectors, invalid reporting options, and accessing results before `fit`.
use crate::{optimization::errors::OptError, panel::errors::PanelError};

/// Result alias for the synth layer.
pub type SynthResult<T> = Result<T, SynthError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthError {
    // ---- Lower layers ----
    /// Panel construction, spec validation, or data preparation failed.
    #[error(transparent)]
    Panel(#[from] PanelError),

    /// The weight solver failed.
    #[error(transparent)]
    Optimization(#[from] OptError),

    // ---- Options ----
    /// Composition threshold must be finite and non-negative.
    #[error("Invalid weight threshold {threshold}: {reason}")]
    InvalidThreshold { threshold: f64, reason: &'static str },

    /// Unknown predictor-scaling name.
    #[error("Invalid predictor scaling '{name}'. Valid options are case insensitive 'UnitVariance' or 'None'.")]
    InvalidScaling { name: String },

    // ---- Estimation ----
    /// `W` does not match the donor count of the prepared data.
    #[error("Donor weight vector has length {found}, expected {expected}.")]
    WeightLengthMismatch { expected: usize, found: usize },

    // ---- Model state ----
    /// Results were requested before a successful fit.
    #[error("Model hasn't been fitted yet.")]
    ModelNotFitted,
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `?`-conversion from the lower layers.
    // - Transparent display of wrapped errors.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Lower-layer errors convert into `SynthError` and keep their message.
    //
    // Given
    // -----
    // - `PanelError::EmptyDonorPool` and `OptError::MissingBestParam`.
    //
    // Expect
    // ------
    // - The matching wrapper variants with identical `Display` output.
    fn lower_layer_errors_convert_transparently() {
        let panel = PanelError::EmptyDonorPool;
        let wrapped: SynthError = panel.clone().into();
        assert_eq!(wrapped, SynthError::Panel(PanelError::EmptyDonorPool));
        assert_eq!(wrapped.to_string(), panel.to_string());

        let opt = OptError::MissingBestParam;
        let wrapped: SynthError = opt.clone().into();
        assert!(matches!(wrapped, SynthError::Optimization(OptError::MissingBestParam)));
        assert_eq!(wrapped.to_string(), opt.to_string());
    }
}
