//! Evaluation of classic population-growth models.
//!
//! Closed-form exponential, logistic, Gompertz and Richards growth laws and a
//! numerically integrated Lotka-Volterra predator-prey system. The entry point
//! is [`evaluation::evaluate`], which turns a [`evaluation::ModelRequest`]
//! into a trajectory plus a status message and never fails.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod manager;
pub mod model;
pub mod params;
pub mod sampler;
pub mod stats;
pub mod types;
