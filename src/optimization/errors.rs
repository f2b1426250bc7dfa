//! Errors for the optimization layer (inner QP and outer V search).
//!
//! [`OptError`] covers option validation, shape and finiteness checks on the
//! numeric inputs, and failures reported by the `argmin` backend. Soft
//! outcomes such as non-convergence or ill-conditioning are NOT errors; they
//! are carried as flags on the outcome types.
use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptError {
    // ---- Options ----
    /// Standard-deviation tolerance of the simplex search must be positive and finite.
    #[error("Invalid simplex standard-deviation tolerance {tol}: {reason}")]
    InvalidTolSd { tol: f64, reason: &'static str },

    /// Duality-gap tolerance of the inner QP must be positive and finite.
    #[error("Invalid duality-gap tolerance {tol}: {reason}")]
    InvalidTolGap { tol: f64, reason: &'static str },

    /// Maximum iterations needs to be positive.
    #[error("Invalid maximum iterations {max_iter}: {reason}")]
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// Wall-clock budget must be non-zero.
    #[error("Invalid timeout of {millis} ms: {reason}")]
    InvalidTimeout { millis: u128, reason: &'static str },

    /// At least one stopping rule must be provided.
    #[error("No tolerances provided; at least one stopping rule is required.")]
    NoTolerancesProvided,

    /// Initial simplex step must be positive and finite.
    #[error("Invalid initial step {step}: {reason}")]
    InvalidInitialStep { step: f64, reason: &'static str },

    /// Ridge term must be non-negative and finite.
    #[error("Invalid ridge penalty {ridge}: {reason}")]
    InvalidRidge { ridge: f64, reason: &'static str },

    /// Invalid V strategy name.
    #[error("Invalid V strategy '{name}': {reason}")]
    InvalidStrategy { name: String, reason: &'static str },

    /// Caller-supplied predictor weights are unusable.
    #[error("Invalid fixed predictor weights: {reason}")]
    InvalidFixedWeights { reason: &'static str },

    // ---- Inputs ----
    /// Vector/matrix shapes disagree.
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch { what: &'static str, expected: usize, found: usize },

    /// An input array holds NaN or ±inf.
    #[error("Non-finite input in {what} at index {index}: {value}")]
    NonFiniteInput { what: &'static str, index: usize, value: f64 },

    /// The problem has no donors or no predictors.
    #[error("Empty problem: {what} has length zero.")]
    EmptyProblem { what: &'static str },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    #[error("Non-finite cost value: {value}")]
    NonFiniteCost { value: f64 },

    // ---- Optimizer outcome ----
    /// The search stopped before a single iterate was evaluated.
    #[error("Optimizer stopped before completing any iteration ({status}).")]
    NoIterationsCompleted { status: String },

    /// Best parameter is missing from the final state.
    #[error("Missing best parameter in optimizer state.")]
    MissingBestParam,

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    #[error("Invalid parameter: {text}")]
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    #[error("Not implemented: {text}")]
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    #[error("Not initialized: {text}")]
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    #[error("Condition violated: {text}")]
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    #[error("Checkpoint not found: {text}")]
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    #[error("Potential bug: {text}")]
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    #[error("Impossible error: {text}")]
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    #[error("Backend error: {text}")]
    BackendError { text: String },

    // ---- Fallback ----
    #[error("Unknown error")]
    UnknownError,
}

impl From<Error> for OptError {
    /// Errors raised inside our own cost functions travel through argmin as
    /// `anyhow`-style errors; recover them first, then map argmin's own
    /// variants.
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Recovery of `OptError` values that were boxed into `argmin::core::Error`.
    // - Mapping of `ArgminError` variants.
    // - Fallback to `BackendError` for foreign errors.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // An `OptError` raised inside a cost function survives the round trip
    // through argmin's error type unchanged.
    //
    // Given
    // -----
    // - `DimensionMismatch { what: "V", .. }` converted into `Error`.
    //
    // Expect
    // ------
    // - `OptError::from(err)` returns the same variant.
    fn from_argmin_error_recovers_own_variant() {
        let original = OptError::DimensionMismatch { what: "V", expected: 3, found: 2 };
        let boxed: Error = original.clone().into();

        assert_eq!(OptError::from(boxed), original);
    }

    #[test]
    // Purpose
    // -------
    // Argmin's `InvalidParameter` maps onto our wrapper with its text.
    //
    // Given
    // -----
    // - `ArgminError::InvalidParameter { text: "sd_tolerance" }`.
    //
    // Expect
    // ------
    // - `OptError::InvalidParameter { text: "sd_tolerance" }`.
    fn from_argmin_error_maps_invalid_parameter() {
        let boxed: Error =
            ArgminError::InvalidParameter { text: "sd_tolerance".to_string() }.into();

        assert_eq!(
            OptError::from(boxed),
            OptError::InvalidParameter { text: "sd_tolerance".to_string() }
        );
    }

    #[test]
    // Purpose
    // -------
    // Unknown error types become `BackendError` carrying the message.
    //
    // Given
    // -----
    // - A plain `std::io::Error` boxed into `argmin::core::Error`.
    //
    // Expect
    // ------
    // - `BackendError` whose text contains the original message.
    fn from_argmin_error_falls_back_to_backend_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let boxed: Error = io.into();

        match OptError::from(boxed) {
            OptError::BackendError { text } => assert!(text.contains("disk on fire")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
