//! Model parameters and their domain checks.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Parameters of exponential growth, `dP/dt = rP`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct ExponentialParams {
    /// Initial population.
    pub p0: f64,
    /// Intrinsic growth rate (any sign).
    pub r: f64,
}

/// Parameters of logistic growth, `dP/dt = rP(1 - P/K)`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Initial population.
    pub p0: f64,
    /// Intrinsic growth rate.
    pub r: f64,
    /// Carrying capacity.
    pub k: f64,
}

/// Parameters of Gompertz growth, `dP/dt = rP ln(K/P)`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct GompertzParams {
    /// Initial population.
    pub p0: f64,
    /// Intrinsic growth rate.
    pub r: f64,
    /// Carrying capacity.
    pub k: f64,
}

/// Parameters of Richards growth, `dP/dt = rP[1 - (P/K)^nu]`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct RichardsParams {
    /// Initial population.
    pub p0: f64,
    /// Intrinsic growth rate.
    pub r: f64,
    /// Carrying capacity.
    pub k: f64,
    /// Shape parameter (`nu = 1` is logistic, `nu -> 0` approaches Gompertz).
    pub nu: f64,
}

/// Parameters of the Lotka-Volterra predator-prey system.
///
/// `dx/dt = alpha x - beta x y` and `dy/dt = delta x y - gamma y`, where `x`
/// is the prey and `y` the predator population.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct PredatorPreyParams {
    /// Initial prey population.
    pub x0: f64,
    /// Initial predator population.
    pub y0: f64,
    /// Prey growth rate.
    pub alpha: f64,
    /// Predation rate.
    pub beta: f64,
    /// Predator death rate.
    pub gamma: f64,
    /// Predator reproduction rate per prey eaten.
    pub delta: f64,
}

impl ExponentialParams {
    /// Any finite `p0` and `r` is accepted.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_finite(&[("p0", self.p0), ("r", self.r)])
    }
}

impl LogisticParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        check_finite(&[("p0", self.p0), ("r", self.r), ("k", self.k)])?;
        check_bounded(self.p0, self.k, self.r)
    }
}

impl GompertzParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        check_finite(&[("p0", self.p0), ("r", self.r), ("k", self.k)])?;
        check_bounded(self.p0, self.k, self.r)
    }
}

impl RichardsParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        check_finite(&[
            ("p0", self.p0),
            ("r", self.r),
            ("k", self.k),
            ("nu", self.nu),
        ])?;
        check_bounded(self.p0, self.k, self.r)?;
        if self.nu <= 0.0 {
            return Err(ModelError::validation(format!(
                "nu must be > 0, but is {}",
                self.nu
            )));
        }
        Ok(())
    }
}

impl PredatorPreyParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        let fields = [
            ("x0", self.x0),
            ("y0", self.y0),
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("delta", self.delta),
        ];
        check_finite(&fields)?;
        let non_positive: Vec<_> = fields
            .iter()
            .filter(|(_, val)| *val <= 0.0)
            .map(|(name, _)| *name)
            .collect();
        if !non_positive.is_empty() {
            return Err(ModelError::validation(format!(
                "all parameters must be > 0 (check {})",
                non_positive.join(", ")
            )));
        }
        Ok(())
    }
}

fn check_finite(fields: &[(&str, f64)]) -> Result<(), ModelError> {
    for &(name, val) in fields {
        if !val.is_finite() {
            return Err(ModelError::validation(format!(
                "{name} must be finite, but is {val}"
            )));
        }
    }
    Ok(())
}

// Shared domain of the models with a carrying capacity.
fn check_bounded(p0: f64, k: f64, r: f64) -> Result<(), ModelError> {
    if !(0.0 < p0 && p0 < k) {
        return Err(ModelError::validation(format!(
            "make sure that 0 < P0 < K (P0 = {p0}, K = {k})"
        )));
    }
    if r <= 0.0 {
        return Err(ModelError::validation(format!(
            "r must be > 0, but is {r}"
        )));
    }
    Ok(())
}
