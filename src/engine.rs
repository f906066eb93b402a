//! Numerical integration of the Lotka-Volterra predator-prey system.

use crate::error::ModelError;
use crate::params::PredatorPreyParams;
use crate::types::{CriticalPoint, Populations, Stability, Trajectory};
use ode_solvers::{Dopri5, System, Vector2};

type State = Vector2<f64>;

/// Default relative tolerance of the integrator.
pub const REL_TOL: f64 = 1e-6;
/// Default absolute tolerance of the integrator.
pub const ABS_TOL: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct LotkaVolterra {
    alpha: f64,
    beta: f64,
    gamma: f64,
    delta: f64,
}

impl System<f64, State> for LotkaVolterra {
    fn system(&self, _t: f64, y: &State, dy: &mut State) {
        let (prey, predator) = (y[0], y[1]);
        dy[0] = self.alpha * prey - self.beta * prey * predator;
        dy[1] = self.delta * prey * predator - self.gamma * predator;
    }
}

/// Predator-prey integration engine.
///
/// Wraps the adaptive Dormand-Prince 5(4) method of `ode_solvers` and
/// reports the solution on a caller-supplied time grid.
pub struct Engine {
    system: LotkaVolterra,
    init: State,
    rel_tol: f64,
    abs_tol: f64,
}

impl Engine {
    /// Create a new `Engine` for the given (already validated) parameters.
    pub fn new(params: &PredatorPreyParams) -> Self {
        Self {
            system: LotkaVolterra {
                alpha: params.alpha,
                beta: params.beta,
                gamma: params.gamma,
                delta: params.delta,
            },
            init: State::new(params.x0, params.y0),
            rel_tol: REL_TOL,
            abs_tol: ABS_TOL,
        }
    }

    /// Override the integrator tolerances.
    pub fn with_tolerances(mut self, rel_tol: f64, abs_tol: f64) -> Self {
        self.rel_tol = rel_tol;
        self.abs_tol = abs_tol;
        self
    }

    /// Integrate over `[grid[0], grid[last]]` and sample at every grid time.
    ///
    /// The grid must be uniform and strictly increasing. Either the whole
    /// trajectory is returned or an [`ModelError::Integration`] error.
    pub fn run(&self, grid: &[f64]) -> Result<Trajectory, ModelError> {
        let (&t_start, &t_end) = match (grid.first(), grid.last()) {
            (Some(first), Some(last)) if grid.len() >= 2 => (first, last),
            _ => {
                return Err(ModelError::Integration(
                    "time grid needs at least 2 points".to_string(),
                ));
            }
        };
        let dt = (t_end - t_start) / (grid.len() - 1) as f64;

        // Overshoot by half a report step so the last report time is emitted
        // even when the dense output accumulates rounding error.
        let mut stepper = Dopri5::new(
            self.system,
            t_start,
            t_end + 0.5 * dt,
            dt,
            self.init,
            self.rel_tol,
            self.abs_tol,
        );
        let stats = stepper
            .integrate()
            .map_err(|err| ModelError::Integration(err.to_string()))?;
        log::debug!(
            "integrated with {} evaluations ({} accepted, {} rejected steps)",
            stats.num_eval,
            stats.accepted_steps,
            stats.rejected_steps
        );

        let x_out = stepper.x_out();
        let y_out = stepper.y_out();

        let mut prey = Vec::with_capacity(grid.len());
        let mut predator = Vec::with_capacity(grid.len());
        let tol = 1e-6 * dt;
        let mut i_out = 0;
        for &t in grid {
            // Outputs are sorted, so advance while the next one is closer.
            while i_out + 1 < x_out.len()
                && (x_out[i_out + 1] - t).abs() <= (x_out[i_out] - t).abs()
            {
                i_out += 1;
            }
            let Some(&x) = x_out.get(i_out) else {
                return Err(ModelError::Integration("solver produced no output".to_string()));
            };
            if (x - t).abs() > tol {
                return Err(ModelError::Integration(format!(
                    "solver produced no output at t = {t}"
                )));
            }
            let state = y_out[i_out];
            check_state(t, state)?;
            prey.push(state[0]);
            predator.push(state[1]);
        }

        Ok(Trajectory {
            t: grid.to_vec(),
            pop: Populations::TwoSpecies { prey, predator },
        })
    }
}

fn check_state(t: f64, state: State) -> Result<(), ModelError> {
    if state.iter().any(|val| !val.is_finite()) {
        return Err(ModelError::Integration(format!(
            "state is not finite at t = {t}"
        )));
    }
    if state.iter().any(|&val| val < 0.0) {
        return Err(ModelError::Integration(format!(
            "population became negative at t = {t}"
        )));
    }
    Ok(())
}

impl PredatorPreyParams {
    /// Right-hand side `(dx/dt, dy/dt)` at prey `x` and predator `y`.
    pub fn derivative(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.alpha * x - self.beta * x * y,
            self.delta * x * y - self.gamma * y,
        )
    }

    /// Quantity conserved along exact orbits:
    /// `delta x - gamma ln x + beta y - alpha ln y`.
    pub fn invariant(&self, x: f64, y: f64) -> f64 {
        self.delta * x - self.gamma * x.ln() + self.beta * y - self.alpha * y.ln()
    }

    /// Extinction saddle and coexistence center.
    pub fn critical_points(&self) -> Vec<CriticalPoint> {
        vec![
            CriticalPoint::new(vec![0.0, 0.0], Stability::Saddle, "extinction"),
            CriticalPoint::new(
                vec![self.gamma / self.delta, self.alpha / self.beta],
                Stability::Center,
                "coexistence",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::TimeDomain;
    use approx::assert_relative_eq;

    fn params() -> PredatorPreyParams {
        PredatorPreyParams {
            x0: 40.0,
            y0: 9.0,
            alpha: 1.0,
            beta: 0.1,
            gamma: 1.5,
            delta: 0.075,
        }
    }

    #[test]
    fn populations_stay_non_negative() {
        let grid = TimeDomain::new(15.0, 500).grid();
        let traj = Engine::new(&params()).run(&grid).unwrap();

        assert_eq!(traj.len(), 500);
        assert_eq!(traj.t.first(), Some(&0.0));
        assert_eq!(traj.t_max(), Some(15.0));
        let Populations::TwoSpecies { prey, predator } = &traj.pop else {
            panic!("expected two species");
        };
        assert_relative_eq!(prey[0], 40.0, max_relative = 1e-9);
        assert_relative_eq!(predator[0], 9.0, max_relative = 1e-9);
        assert!(prey.iter().chain(predator.iter()).all(|&val| val >= 0.0));
    }

    #[test]
    fn invariant_is_conserved() {
        let params = params();
        let grid = TimeDomain::new(15.0, 300).grid();
        let traj = Engine::new(&params).run(&grid).unwrap();
        let Populations::TwoSpecies { prey, predator } = &traj.pop else {
            panic!("expected two species");
        };
        let v0 = params.invariant(prey[0], predator[0]);
        for (&x, &y) in prey.iter().zip(predator) {
            assert_relative_eq!(params.invariant(x, y), v0, max_relative = 1e-3);
        }
    }

    #[test]
    fn equilibrium_is_stationary() {
        let mut params = params();
        params.x0 = params.gamma / params.delta;
        params.y0 = params.alpha / params.beta;
        let (dx, dy) = params.derivative(params.x0, params.y0);
        assert_relative_eq!(dx, 0.0, epsilon = 1e-12);
        assert_relative_eq!(dy, 0.0, epsilon = 1e-12);

        let grid = TimeDomain::new(10.0, 50).grid();
        let traj = Engine::new(&params).run(&grid).unwrap();
        let Populations::TwoSpecies { prey, .. } = &traj.pop else {
            panic!("expected two species");
        };
        for &x in prey {
            assert_relative_eq!(x, params.x0, max_relative = 1e-6);
        }
    }

    #[test]
    fn tighter_tolerances_reduce_drift() {
        let params = params();
        let grid = TimeDomain::new(15.0, 300).grid();
        let traj = Engine::new(&params)
            .with_tolerances(1e-10, 1e-10)
            .run(&grid)
            .unwrap();
        let Populations::TwoSpecies { prey, predator } = &traj.pop else {
            panic!("expected two species");
        };
        let v0 = params.invariant(prey[0], predator[0]);
        for (&x, &y) in prey.iter().zip(predator) {
            assert_relative_eq!(params.invariant(x, y), v0, max_relative = 1e-7);
        }
    }

    #[test]
    fn integration_is_deterministic() {
        let grid = TimeDomain::new(15.0, 100).grid();
        let engine = Engine::new(&params());
        assert_eq!(engine.run(&grid).unwrap(), engine.run(&grid).unwrap());
    }

    #[test]
    fn short_grid_is_rejected() {
        let err = Engine::new(&params()).run(&[0.0]).unwrap_err();
        assert!(matches!(err, ModelError::Integration(_)));
    }
}
