//! Errors produced while validating and evaluating a model.

use thiserror::Error;

/// Recoverable failure of a single evaluation.
///
/// None of these are fatal: the caller reports the message as a warning and
/// keeps whatever it displayed before.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Parameters outside the domain of the model.
    #[error("invalid parameters: {0}")]
    Validation(String),

    /// Overflow, division by zero or a domain error in a closed-form solution.
    #[error("numeric error in the {model} model at t = {t}: {what}")]
    Numeric {
        model: &'static str,
        t: f64,
        what: String,
    },

    /// The ODE integrator did not reach the end of the time domain.
    #[error("integration failed: {0}")]
    Integration(String),
}

impl ModelError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
