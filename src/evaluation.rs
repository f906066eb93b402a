//! Single entry point from parameters to a displayable result.

use crate::error::ModelError;
use crate::model::GrowthLaw;
use crate::params::{
    ExponentialParams, GompertzParams, LogisticParams, PredatorPreyParams, RichardsParams,
};
use crate::sampler::{TimeDomain, evaluate_at, sample, sample_predator_prey};
use crate::types::{CriticalPoint, EvaluationPoint, Trajectory};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Exponential,
    Logistic,
    Gompertz,
    Richards,
    PredatorPrey,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::Exponential,
        ModelKind::Logistic,
        ModelKind::Gompertz,
        ModelKind::Richards,
        ModelKind::PredatorPrey,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Exponential => ExponentialParams::NAME,
            ModelKind::Logistic => LogisticParams::NAME,
            ModelKind::Gompertz => GompertzParams::NAME,
            ModelKind::Richards => RichardsParams::NAME,
            ModelKind::PredatorPrey => "predator-prey",
        }
    }

    pub fn equation(self) -> &'static str {
        match self {
            ModelKind::Exponential => ExponentialParams::EQUATION,
            ModelKind::Logistic => LogisticParams::EQUATION,
            ModelKind::Gompertz => GompertzParams::EQUATION,
            ModelKind::Richards => RichardsParams::EQUATION,
            ModelKind::PredatorPrey => "dx/dt = alpha x - beta x y, dy/dt = delta x y - gamma y",
        }
    }

    /// Time domain used when the caller does not choose one.
    pub fn default_domain(self) -> TimeDomain {
        match self {
            ModelKind::Exponential => TimeDomain::new(10.0, 200),
            ModelKind::Logistic | ModelKind::Gompertz => TimeDomain::new(60.0, 400),
            ModelKind::Richards => TimeDomain::new(30.0, 400),
            ModelKind::PredatorPrey => TimeDomain::new(15.0, 500),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of any of the models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelParams {
    Exponential(ExponentialParams),
    Logistic(LogisticParams),
    Gompertz(GompertzParams),
    Richards(RichardsParams),
    PredatorPrey(PredatorPreyParams),
}

impl ModelParams {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelParams::Exponential(_) => ModelKind::Exponential,
            ModelParams::Logistic(_) => ModelKind::Logistic,
            ModelParams::Gompertz(_) => ModelKind::Gompertz,
            ModelParams::Richards(_) => ModelKind::Richards,
            ModelParams::PredatorPrey(_) => ModelKind::PredatorPrey,
        }
    }
}

/// Everything needed for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub params: ModelParams,
    pub domain: TimeDomain,
    /// Optional instant to evaluate single-species models at.
    pub t_eval: Option<f64>,
}

impl ModelRequest {
    /// Request over the default domain of the model.
    pub fn new(params: ModelParams) -> Self {
        Self {
            params,
            domain: params.kind().default_domain(),
            t_eval: None,
        }
    }

    pub fn with_domain(mut self, domain: TimeDomain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_t_eval(mut self, t_eval: f64) -> Self {
        self.t_eval = Some(t_eval);
        self
    }
}

/// Outcome message for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Status {
    Success(String),
    /// Nothing was computed; the previous result should stay on display.
    Warning(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success(msg) => f.write_str(msg),
            Status::Warning(msg) => write!(f, "warning: {msg}"),
        }
    }
}

/// Result record of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub model: ModelKind,
    pub equation: String,
    pub request: ModelRequest,
    /// Present only on success.
    pub trajectory: Option<Trajectory>,
    pub eval_point: Option<EvaluationPoint>,
    pub critical_points: Vec<CriticalPoint>,
    pub status: Status,
}

impl Evaluation {
    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Success(_))
    }
}

/// Validate, sample and describe one model.
///
/// Never fails: validation, numeric and integration errors become a
/// [`Status::Warning`] with no trajectory.
pub fn evaluate(req: &ModelRequest) -> Evaluation {
    let model = req.params.kind();
    let result = try_evaluate(req);
    let (trajectory, eval_point, critical_points, status) = match result {
        Ok(computed) => computed,
        Err(err) => (None, None, Vec::new(), Status::Warning(err.to_string())),
    };
    Evaluation {
        model,
        equation: model.equation().to_string(),
        request: *req,
        trajectory,
        eval_point,
        critical_points,
        status,
    }
}

type Computed = (
    Option<Trajectory>,
    Option<EvaluationPoint>,
    Vec<CriticalPoint>,
    Status,
);

fn try_evaluate(req: &ModelRequest) -> Result<Computed, ModelError> {
    let domain = &req.domain;
    match &req.params {
        ModelParams::Exponential(law) => evaluate_law(law, domain, req.t_eval),
        ModelParams::Logistic(law) => evaluate_law(law, domain, req.t_eval),
        ModelParams::Gompertz(law) => evaluate_law(law, domain, req.t_eval),
        ModelParams::Richards(law) => evaluate_law(law, domain, req.t_eval),
        ModelParams::PredatorPrey(params) => {
            params.validate()?;
            domain.validate()?;
            let trajectory = sample_predator_prey(params, domain)?;
            let status = Status::Success(format!(
                "simulation completed up to t = {}",
                domain.t_max
            ));
            Ok((Some(trajectory), None, params.critical_points(), status))
        }
    }
}

fn evaluate_law<L: GrowthLaw>(
    law: &L,
    domain: &TimeDomain,
    t_eval: Option<f64>,
) -> Result<Computed, ModelError> {
    law.validate()?;
    domain.validate()?;
    let trajectory = sample(law, domain)?;
    let eval_point = t_eval
        .map(|t| evaluate_at(law, domain, t))
        .transpose()?;
    let status = match eval_point {
        Some(point) => format!("population at t = {}: P(t) = {:.2}", point.t, point.value),
        None => format!("trajectory computed up to t = {}", domain.t_max),
    };
    Ok((
        Some(trajectory),
        eval_point,
        law.critical_points(),
        Status::Success(status),
    ))
}
