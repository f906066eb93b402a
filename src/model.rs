//! Closed-form solutions of the single-species growth laws.

use crate::error::ModelError;
use crate::params::{ExponentialParams, GompertzParams, LogisticParams, RichardsParams};
use crate::types::{CriticalPoint, Stability};

/// Single-species growth law with an analytic solution.
///
/// `population` evaluates the solution of the initial value problem and fails
/// with [`ModelError::Numeric`] instead of returning a non-finite value.
pub trait GrowthLaw {
    /// Model name used in messages and file names.
    const NAME: &'static str;

    /// Governing differential equation in plain text.
    const EQUATION: &'static str;

    /// Check the parameters against the domain of the model.
    fn validate(&self) -> Result<(), ModelError>;

    /// Population at time `t`.
    fn population(&self, t: f64) -> Result<f64, ModelError>;

    /// Right-hand side of the governing equation, `dP/dt` at population `p`.
    fn growth_rate(&self, p: f64) -> f64;

    /// Equilibria of the governing equation.
    fn critical_points(&self) -> Vec<CriticalPoint>;
}

impl GrowthLaw for ExponentialParams {
    const NAME: &'static str = "exponential";
    const EQUATION: &'static str = "dP/dt = rP";

    fn validate(&self) -> Result<(), ModelError> {
        ExponentialParams::validate(self)
    }

    fn population(&self, t: f64) -> Result<f64, ModelError> {
        let growth = checked(Self::NAME, t, "e^(rt)", (self.r * t).exp())?;
        checked(Self::NAME, t, "P(t)", self.p0 * growth)
    }

    fn growth_rate(&self, p: f64) -> f64 {
        self.r * p
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        let stability = if self.r > 0.0 {
            Stability::Unstable
        } else if self.r < 0.0 {
            Stability::Stable
        } else {
            Stability::Neutral
        };
        vec![CriticalPoint::new(vec![0.0], stability, "extinction")]
    }
}

impl GrowthLaw for LogisticParams {
    const NAME: &'static str = "logistic";
    const EQUATION: &'static str = "dP/dt = rP(1 - P/K)";

    fn validate(&self) -> Result<(), ModelError> {
        LogisticParams::validate(self)
    }

    fn population(&self, t: f64) -> Result<f64, ModelError> {
        let coef = checked(Self::NAME, t, "(K - P0)/P0", (self.k - self.p0) / self.p0)?;
        let denom = 1.0 + coef * (-self.r * t).exp();
        if denom == 0.0 {
            return Err(numeric(Self::NAME, t, "division by zero"));
        }
        checked(Self::NAME, t, "P(t)", self.k / denom)
    }

    fn growth_rate(&self, p: f64) -> f64 {
        self.r * p * (1.0 - p / self.k)
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        saturating_critical_points(self.k)
    }
}

impl GrowthLaw for GompertzParams {
    const NAME: &'static str = "gompertz";
    const EQUATION: &'static str = "dP/dt = rP ln(K/P)";

    fn validate(&self) -> Result<(), ModelError> {
        GompertzParams::validate(self)
    }

    fn population(&self, t: f64) -> Result<f64, ModelError> {
        let log_ratio = checked(Self::NAME, t, "ln(K/P0)", (self.k / self.p0).ln())?;
        let decay = (-self.r * t).exp();
        checked(Self::NAME, t, "P(t)", self.k * (-log_ratio * decay).exp())
    }

    fn growth_rate(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return 0.0;
        }
        self.r * p * (self.k / p).ln()
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        saturating_critical_points(self.k)
    }
}

impl GrowthLaw for RichardsParams {
    const NAME: &'static str = "richards";
    const EQUATION: &'static str = "dP/dt = rP[1 - (P/K)^nu]";

    fn validate(&self) -> Result<(), ModelError> {
        RichardsParams::validate(self)
    }

    fn population(&self, t: f64) -> Result<f64, ModelError> {
        let ratio = checked(Self::NAME, t, "(K/P0)^nu", (self.k / self.p0).powf(self.nu))?;
        let base = 1.0 + (ratio - 1.0) * (-self.r * self.nu * t).exp();
        if base <= 0.0 {
            return Err(numeric(Self::NAME, t, "non-positive base of the root"));
        }
        let root = checked(Self::NAME, t, "root", base.powf(1.0 / self.nu))?;
        if root == 0.0 {
            return Err(numeric(Self::NAME, t, "division by zero"));
        }
        checked(Self::NAME, t, "P(t)", self.k / root)
    }

    fn growth_rate(&self, p: f64) -> f64 {
        self.r * p * (1.0 - (p / self.k).powf(self.nu))
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        saturating_critical_points(self.k)
    }
}

fn saturating_critical_points(k: f64) -> Vec<CriticalPoint> {
    vec![
        CriticalPoint::new(vec![0.0], Stability::Unstable, "extinction"),
        CriticalPoint::new(vec![k], Stability::Stable, "carrying capacity"),
    ]
}

fn numeric(model: &'static str, t: f64, what: &str) -> ModelError {
    ModelError::Numeric {
        model,
        t,
        what: what.to_string(),
    }
}

fn checked(model: &'static str, t: f64, what: &str, val: f64) -> Result<f64, ModelError> {
    if !val.is_finite() {
        return Err(numeric(model, t, &format!("{what} is not finite ({val})")));
    }
    Ok(val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn logistic() -> LogisticParams {
        LogisticParams {
            p0: 10.0,
            r: 0.15,
            k: 150.0,
        }
    }

    #[test]
    fn exponential_starts_at_p0() {
        let law = ExponentialParams { p0: 10.0, r: 0.2 };
        assert_eq!(law.population(0.0).unwrap(), 10.0);
        assert!(law.population(0.5).unwrap() > 10.0);
        assert_relative_eq!(law.population(10.0).unwrap(), 73.890_560_989, epsilon = 1e-6);
    }

    #[test]
    fn exponential_overflow_is_reported() {
        let law = ExponentialParams { p0: 10.0, r: 50.0 };
        let err = law.population(100.0).unwrap_err();
        assert!(matches!(err, ModelError::Numeric { model: "exponential", .. }));
    }

    #[test]
    fn logistic_matches_closed_form() {
        let law = logistic();
        let (p0, r, k, t) = (10.0_f64, 0.15_f64, 150.0_f64, 20.0_f64);
        let expected = k / (1.0 + ((k - p0) / p0) * (-r * t).exp());
        assert_relative_eq!(law.population(t).unwrap(), expected);
    }

    #[test]
    fn logistic_is_increasing_and_bounded() {
        let law = logistic();
        let mut prev = law.population(0.0).unwrap();
        assert_relative_eq!(prev, 10.0, max_relative = 1e-12);
        for i in 1..=400 {
            let p = law.population(0.25 * i as f64).unwrap();
            assert!(p > prev);
            assert!(p <= law.k);
            prev = p;
        }
        assert_relative_eq!(law.population(500.0).unwrap(), law.k, max_relative = 1e-9);
    }

    #[test]
    fn gompertz_starts_at_p0_and_saturates() {
        let law = GompertzParams {
            p0: 10.0,
            r: 0.15,
            k: 150.0,
        };
        assert_relative_eq!(law.population(0.0).unwrap(), 10.0, max_relative = 1e-12);
        assert_relative_eq!(law.population(400.0).unwrap(), 150.0, max_relative = 1e-9);
        assert_relative_eq!(law.growth_rate(150.0), 0.0);
    }

    #[test]
    fn richards_with_unit_shape_is_logistic() {
        let log = logistic();
        let rich = RichardsParams {
            p0: log.p0,
            r: log.r,
            k: log.k,
            nu: 1.0,
        };
        for i in 0..=60 {
            let t = i as f64;
            assert_relative_eq!(
                rich.population(t).unwrap(),
                log.population(t).unwrap(),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn richards_overflow_is_reported() {
        let law = RichardsParams {
            p0: 10.0,
            r: 0.2,
            k: 100.0,
            nu: 400.0,
        };
        let err = law.population(1.0).unwrap_err();
        assert!(matches!(err, ModelError::Numeric { model: "richards", .. }));

        let law = RichardsParams { nu: 1e-4, ..law };
        assert!(law.population(0.0).is_ok());
    }

    #[test]
    fn critical_points_follow_rate_sign() {
        let points = ExponentialParams { p0: 1.0, r: -0.1 }.critical_points();
        assert_eq!(points[0].stability, Stability::Stable);

        let points = logistic().critical_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].at, vec![150.0]);
        assert_eq!(points[1].stability, Stability::Stable);
    }
}
