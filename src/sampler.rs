//! Uniform time grids and trajectory sampling.

use crate::engine::Engine;
use crate::error::ModelError;
use crate::model::GrowthLaw;
use crate::params::PredatorPreyParams;
use crate::types::{EvaluationPoint, Populations, Trajectory};
use serde::{Deserialize, Serialize};

/// Largest number of grid points a time domain may hold.
pub const MAX_SAMPLES: usize = 100_000;

/// Time interval `[0, t_max]` sampled at `n_samples` uniform points.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct TimeDomain {
    /// End of the interval (the start is always `0`).
    pub t_max: f64,
    /// Number of grid points, endpoints included.
    pub n_samples: usize,
}

impl TimeDomain {
    pub fn new(t_max: f64, n_samples: usize) -> Self {
        Self { t_max, n_samples }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.t_max.is_finite() && self.t_max > 0.0) {
            return Err(ModelError::validation(format!(
                "t_max must be finite and > 0, but is {}",
                self.t_max
            )));
        }
        if !(2..=MAX_SAMPLES).contains(&self.n_samples) {
            return Err(ModelError::validation(format!(
                "number of samples must be in 2..={MAX_SAMPLES}, but is {}",
                self.n_samples
            )));
        }
        Ok(())
    }

    /// Uniform grid from `0` to exactly `t_max`.
    pub fn grid(&self) -> Vec<f64> {
        let last = self.n_samples.saturating_sub(1);
        if last == 0 {
            return vec![0.0; self.n_samples];
        }
        let dt = self.t_max / last as f64;
        (0..self.n_samples)
            .map(|i| if i == last { self.t_max } else { i as f64 * dt })
            .collect()
    }

    /// Clamp an evaluation instant into the domain.
    pub fn clamp(&self, t_eval: f64) -> f64 {
        t_eval.min(self.t_max)
    }
}

/// Evaluate a growth law on the grid of `domain`.
///
/// Fails on the first non-finite sample; no partial trajectory is returned.
pub fn sample<L: GrowthLaw>(law: &L, domain: &TimeDomain) -> Result<Trajectory, ModelError> {
    let t = domain.grid();
    let pop = t
        .iter()
        .map(|&t| law.population(t))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Trajectory {
        t,
        pop: Populations::Single(pop),
    })
}

/// Evaluate a growth law at one instant, clamped to `t_eval <= t_max`.
pub fn evaluate_at<L: GrowthLaw>(
    law: &L,
    domain: &TimeDomain,
    t_eval: f64,
) -> Result<EvaluationPoint, ModelError> {
    if !(t_eval.is_finite() && t_eval >= 0.0) {
        return Err(ModelError::validation(format!(
            "evaluation time must be finite and >= 0, but is {t_eval}"
        )));
    }
    let t = domain.clamp(t_eval);
    let value = law.population(t)?;
    Ok(EvaluationPoint { t, value })
}

/// Integrate the predator-prey system on the grid of `domain`.
pub fn sample_predator_prey(
    params: &PredatorPreyParams,
    domain: &TimeDomain,
) -> Result<Trajectory, ModelError> {
    Engine::new(params).run(&domain.grid())
}
