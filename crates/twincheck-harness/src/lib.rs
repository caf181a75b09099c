//! Experiment campaign orchestration
//!
//! A campaign takes a UPPAAL project template and a scenario, expands the
//! scenario into concrete parameter points, renders one project instance per
//! point, and runs verifyta on every (instance, property) pair with bounded
//! parallelism. Results are collected into a serializable report; simulation
//! trajectories are additionally written out as CSV series for plotting.

pub mod campaign;
pub mod report;

pub use campaign::{Campaign, CampaignConfig, Outcome, RunRecord};
pub use report::{
    CampaignReport, CampaignSummary, ProbabilityOutcome, QueryOutcome, SimulationOutcome,
};

use thiserror::Error;
use twincheck_model::ModelError;
use twincheck_uppaal::UppaalError;

/// Errors from running a campaign
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Scenario or template error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// verifyta could not be located
    #[error(transparent)]
    Uppaal(#[from] UppaalError),

    /// A worker task panicked or was cancelled
    #[error("verification task failed: {0}")]
    Task(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
