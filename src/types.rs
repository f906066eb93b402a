//! Evaluation data types.

use serde::{Deserialize, Serialize};

/// Sampled solution of a model over a time grid.
///
/// Times are strictly increasing, start at `0` and end exactly at `t_max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Sample times.
    pub t: Vec<f64>,

    /// Population values, one column per species.
    pub pop: Populations,
}

/// Population columns of a [`Trajectory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Populations {
    /// Single-species growth law.
    Single(Vec<f64>),

    /// Coupled predator-prey system.
    TwoSpecies { prey: Vec<f64>, predator: Vec<f64> },
}

impl Trajectory {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Final time of the trajectory.
    pub fn t_max(&self) -> Option<f64> {
        self.t.last().copied()
    }

    /// Predator against prey, the phase diagram of a two-species trajectory.
    pub fn phase(&self) -> Option<Vec<(f64, f64)>> {
        match &self.pop {
            Populations::Single(_) => None,
            Populations::TwoSpecies { prey, predator } => Some(
                prey.iter()
                    .copied()
                    .zip(predator.iter().copied())
                    .collect(),
            ),
        }
    }
}

/// Single-species model evaluated at one chosen instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPoint {
    /// Evaluation time, already clamped to the time domain.
    pub t: f64,

    /// Population at `t`.
    pub value: f64,
}

/// Stability class of an equilibrium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stability {
    Stable,
    Unstable,
    /// Every point is an equilibrium (zero growth rate).
    Neutral,
    Saddle,
    /// Closed orbits around the point.
    Center,
}

/// Equilibrium of the governing ODE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPoint {
    /// Coordinates of the point (one per species).
    pub at: Vec<f64>,

    pub stability: Stability,

    /// Short description of what the point means for the population.
    pub label: String,
}

impl CriticalPoint {
    pub fn new(at: Vec<f64>, stability: Stability, label: &str) -> Self {
        Self {
            at,
            stability,
            label: label.to_string(),
        }
    }
}
