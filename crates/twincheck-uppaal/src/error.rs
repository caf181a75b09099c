//! Error types for the verifyta driver

use std::time::Duration;
use thiserror::Error;

/// Errors from locating or running verifyta
#[derive(Error, Debug)]
pub enum UppaalError {
    /// verifyta binary could not be located
    #[error("verifyta not found: {0}")]
    NotFound(String),

    /// verifyta did not finish within the configured timeout
    #[error("verifyta timed out after {0:?}")]
    Timeout(Duration),

    /// verifyta exited with a failure
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
