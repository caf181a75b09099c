//! Configuration for the verifyta driver

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for running verifyta
#[derive(Debug, Clone)]
pub struct UppaalConfig {
    /// Path to the verifyta binary; searched on `PATH` when unset
    pub verifyta_path: Option<PathBuf>,
    /// Timeout for a single verification run
    pub timeout: Duration,
}

impl Default for UppaalConfig {
    fn default() -> Self {
        Self {
            verifyta_path: None,
            timeout: Duration::from_secs(300),
        }
    }
}

impl UppaalConfig {
    /// Set an explicit verifyta path
    pub fn with_verifyta_path(mut self, path: PathBuf) -> Self {
        self.verifyta_path = Some(path);
        self
    }

    /// Set the per-run timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
