use crate::evaluation::{Evaluation, ModelParams};
use crate::model::GrowthLaw;
use crate::params::PredatorPreyParams;
use crate::stats::{Accumulator, local_maxima};
use crate::types::{Populations, Trajectory};
use anyhow::{Context, Result};
use rmp_serde::decode;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Observable computed over the samples of a trajectory.
pub trait Obs {
    fn update(&mut self, t: f64, vals: &[f64]);
    fn report(&self) -> serde_json::Value;
}

/// Mean, spread and extremes of every species.
pub struct PopStats {
    names: Vec<&'static str>,
    acc_vec: Vec<Accumulator>,
}

impl PopStats {
    pub fn new(names: Vec<&'static str>) -> Self {
        let mut acc_vec = Vec::new();
        acc_vec.resize_with(names.len(), Accumulator::new);
        Self { names, acc_vec }
    }
}

impl Obs for PopStats {
    fn update(&mut self, _t: f64, vals: &[f64]) {
        for (acc, &val) in self.acc_vec.iter_mut().zip(vals) {
            acc.add(val);
        }
    }

    fn report(&self) -> serde_json::Value {
        let reports: serde_json::Map<_, _> = self
            .names
            .iter()
            .zip(&self.acc_vec)
            .map(|(name, acc)| (name.to_string(), serde_json::json!(acc.report())))
            .collect();
        serde_json::json!({ "pop_stats": reports })
    }
}

/// Time and value of the largest growth rate `dP/dt`.
///
/// For the saturating laws this is the inflection point of the curve.
pub struct PeakGrowth<F> {
    growth_rate: F,
    peak: Option<(f64, f64, f64)>,
}

impl<F: Fn(f64) -> f64> PeakGrowth<F> {
    pub fn new(growth_rate: F) -> Self {
        Self {
            growth_rate,
            peak: None,
        }
    }
}

impl<F: Fn(f64) -> f64> Obs for PeakGrowth<F> {
    fn update(&mut self, t: f64, vals: &[f64]) {
        let Some(&pop) = vals.first() else {
            return;
        };
        let rate = (self.growth_rate)(pop);
        if self.peak.is_none_or(|(_, _, max_rate)| rate > max_rate) {
            self.peak = Some((t, pop, rate));
        }
    }

    fn report(&self) -> serde_json::Value {
        let peak = self
            .peak
            .map(|(t, pop, rate)| serde_json::json!({ "t": t, "pop": pop, "rate": rate }));
        serde_json::json!({ "peak_growth": peak })
    }
}

/// Oscillation period estimated from the spacing of prey maxima.
pub struct Period {
    t_vec: Vec<f64>,
    prey_vec: Vec<f64>,
}

impl Period {
    pub fn new() -> Self {
        Self {
            t_vec: Vec::new(),
            prey_vec: Vec::new(),
        }
    }

    fn estimate(&self) -> Option<f64> {
        let peaks = local_maxima(&self.prey_vec);
        if peaks.len() < 2 {
            return None;
        }
        let (first, last) = (peaks[0], peaks[peaks.len() - 1]);
        Some((self.t_vec[last] - self.t_vec[first]) / (peaks.len() - 1) as f64)
    }
}

impl Obs for Period {
    fn update(&mut self, t: f64, vals: &[f64]) {
        if let Some(&prey) = vals.first() {
            self.t_vec.push(t);
            self.prey_vec.push(prey);
        }
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "period": self.estimate() })
    }
}

/// Largest relative drift of the conserved Lotka-Volterra quantity.
pub struct InvariantDrift {
    params: PredatorPreyParams,
    init: Option<f64>,
    max_drift: f64,
}

impl InvariantDrift {
    pub fn new(params: PredatorPreyParams) -> Self {
        Self {
            params,
            init: None,
            max_drift: 0.0,
        }
    }
}

impl Obs for InvariantDrift {
    fn update(&mut self, _t: f64, vals: &[f64]) {
        let &[x, y] = vals else {
            return;
        };
        let val = self.params.invariant(x, y);
        let init = *self.init.get_or_insert(val);
        let drift = (val - init).abs() / init.abs().max(f64::EPSILON);
        self.max_drift = self.max_drift.max(drift);
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "invariant_drift": self.max_drift })
    }
}

/// Summary of one trajectory file.
pub struct Analyzer {
    eval: Evaluation,
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new(eval: Evaluation) -> Self {
        let mut obs_ptr_vec: Vec<Box<dyn Obs>> = Vec::new();
        match eval.request.params {
            ModelParams::Exponential(law) => {
                obs_ptr_vec.push(Box::new(PopStats::new(vec!["population"])));
                obs_ptr_vec.push(Box::new(PeakGrowth::new(move |p| law.growth_rate(p))));
            }
            ModelParams::Logistic(law) => {
                obs_ptr_vec.push(Box::new(PopStats::new(vec!["population"])));
                obs_ptr_vec.push(Box::new(PeakGrowth::new(move |p| law.growth_rate(p))));
            }
            ModelParams::Gompertz(law) => {
                obs_ptr_vec.push(Box::new(PopStats::new(vec!["population"])));
                obs_ptr_vec.push(Box::new(PeakGrowth::new(move |p| law.growth_rate(p))));
            }
            ModelParams::Richards(law) => {
                obs_ptr_vec.push(Box::new(PopStats::new(vec!["population"])));
                obs_ptr_vec.push(Box::new(PeakGrowth::new(move |p| law.growth_rate(p))));
            }
            ModelParams::PredatorPrey(params) => {
                obs_ptr_vec.push(Box::new(PopStats::new(vec!["prey", "predator"])));
                obs_ptr_vec.push(Box::new(Period::new()));
                obs_ptr_vec.push(Box::new(InvariantDrift::new(params)));
            }
        }
        Self { eval, obs_ptr_vec }
    }

    /// Load the evaluation stored in a trajectory file.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);
        let eval: Evaluation =
            decode::from_read(&mut reader).context("failed to deserialize evaluation")?;
        Ok(Self::new(eval))
    }

    /// Feed every sample of the stored trajectory to the observables.
    pub fn analyze(&mut self) -> Result<serde_json::Value> {
        let traj = self
            .eval
            .trajectory
            .as_ref()
            .context("evaluation has no trajectory")?;
        for (i_t, &t) in traj.t.iter().enumerate() {
            let vals = sample_values(traj, i_t);
            for obs in &mut self.obs_ptr_vec {
                obs.update(t, &vals);
            }
        }

        let reports: Vec<_> = self.obs_ptr_vec.iter().map(|obs| obs.report()).collect();
        Ok(serde_json::json!({
            "model": self.eval.model,
            "equation": self.eval.equation,
            "status": self.eval.status.to_string(),
            "eval_point": self.eval.eval_point,
            "critical_points": self.eval.critical_points,
            "observables": reports,
        }))
    }
}

fn sample_values(traj: &Trajectory, i_t: usize) -> Vec<f64> {
    match &traj.pop {
        Populations::Single(pop) => vec![pop[i_t]],
        Populations::TwoSpecies { prey, predator } => vec![prey[i_t], predator[i_t]],
    }
}

/// Write a list of reports as pretty-printed JSON.
pub fn save_results<P: AsRef<Path>>(reports: &[serde_json::Value], file: P) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, reports).context("failed to serialize results")?;
    Ok(())
}
