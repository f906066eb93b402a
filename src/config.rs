use crate::evaluation::{ModelKind, ModelParams, ModelRequest};
use crate::params::{
    ExponentialParams, GompertzParams, LogisticParams, PredatorPreyParams, RichardsParams,
};
use crate::sampler::{MAX_SAMPLES, TimeDomain};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Evaluation configuration.
///
/// Loaded from a TOML file with one optional table per model.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub exponential: Option<ModelConfig<ExponentialParams>>,
    pub logistic: Option<ModelConfig<LogisticParams>>,
    pub gompertz: Option<ModelConfig<GompertzParams>>,
    pub richards: Option<ModelConfig<RichardsParams>>,
    pub predator_prey: Option<ModelConfig<PredatorPreyParams>>,
}

/// Parameters of one model plus its time domain.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelConfig<P> {
    /// Model parameters, flattened into the table.
    #[serde(flatten)]
    pub params: P,

    /// End of the time domain (model default if missing).
    pub t_max: Option<f64>,
    /// Number of samples (model default if missing).
    pub n_samples: Option<usize>,
    /// Instant to evaluate single-species models at.
    pub t_eval: Option<f64>,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Only the structure is checked here; parameters outside the domain of
    /// a model are reported later as warnings by the evaluation.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.requests().is_empty() {
            bail!("config must contain at least one model table");
        }
        for req in self.requests() {
            let kind = req.params.kind();
            check_num(req.domain.n_samples, 2..=MAX_SAMPLES)
                .with_context(|| format!("invalid number of samples for the {kind} model"))?;
        }
        Ok(())
    }

    /// Requests for every configured model.
    pub fn requests(&self) -> Vec<ModelRequest> {
        ModelKind::ALL
            .into_iter()
            .filter_map(|kind| self.request(kind))
            .collect()
    }

    /// Request for a single model, if it is configured.
    pub fn request(&self, kind: ModelKind) -> Option<ModelRequest> {
        match kind {
            ModelKind::Exponential => self
                .exponential
                .as_ref()
                .map(|cfg| cfg.request(kind, ModelParams::Exponential(cfg.params))),
            ModelKind::Logistic => self
                .logistic
                .as_ref()
                .map(|cfg| cfg.request(kind, ModelParams::Logistic(cfg.params))),
            ModelKind::Gompertz => self
                .gompertz
                .as_ref()
                .map(|cfg| cfg.request(kind, ModelParams::Gompertz(cfg.params))),
            ModelKind::Richards => self
                .richards
                .as_ref()
                .map(|cfg| cfg.request(kind, ModelParams::Richards(cfg.params))),
            ModelKind::PredatorPrey => self
                .predator_prey
                .as_ref()
                .map(|cfg| cfg.request(kind, ModelParams::PredatorPrey(cfg.params))),
        }
    }
}

impl<P> ModelConfig<P> {
    fn request(&self, kind: ModelKind, params: ModelParams) -> ModelRequest {
        let default = kind.default_domain();
        let domain = TimeDomain::new(
            self.t_max.unwrap_or(default.t_max),
            self.n_samples.unwrap_or(default.n_samples),
        );
        ModelRequest {
            params,
            domain,
            t_eval: self.t_eval,
        }
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_model_tables() {
        let config: Config = toml::from_str(
            r#"
[logistic]
p0 = 10.0
r = 0.15
k = 150.0
t_max = 60.0
t_eval = 20.0

[predator_prey]
x0 = 40.0
y0 = 9.0
alpha = 1.0
beta = 0.1
gamma = 1.5
delta = 0.075
n_samples = 250
"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());

        let reqs = config.requests();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].params.kind(), ModelKind::Logistic);
        assert_eq!(reqs[0].domain, TimeDomain::new(60.0, 400));
        assert_eq!(reqs[0].t_eval, Some(20.0));
        assert_eq!(reqs[1].domain, TimeDomain::new(15.0, 250));
        assert!(config.request(ModelKind::Richards).is_none());
    }

    #[test]
    fn rejects_unknown_tables_and_empty_configs() {
        assert!(toml::from_str::<Config>("[verhulst]\np0 = 1.0\n").is_err());

        let config: Config = toml::from_str("").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_sample_count_out_of_range() {
        let config: Config =
            toml::from_str("[exponential]\np0 = 10.0\nr = 0.2\nn_samples = 1\n").unwrap();
        assert!(config.validate().is_err());
    }
}
