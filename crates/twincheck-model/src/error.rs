//! Error types for scenario and template handling

use thiserror::Error;

/// Errors from loading or using scenario configurations and templates
#[derive(Error, Debug)]
pub enum ModelError {
    /// Scenario configuration is malformed or inconsistent
    #[error("invalid scenario configuration: {0}")]
    Config(String),

    /// Requested scenario is not present in the configuration file
    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Project template is malformed
    #[error("invalid project template: {0}")]
    Template(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
