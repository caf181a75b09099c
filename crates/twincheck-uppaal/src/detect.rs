//! verifyta installation detection

use crate::config::UppaalConfig;
use crate::error::UppaalError;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Locate a working verifyta binary
///
/// Uses the explicit path from the configuration when present, otherwise
/// searches `PATH`. The binary is probed with `verifyta -v` and its reported
/// version is logged at debug level.
pub async fn detect_verifyta(config: &UppaalConfig) -> Result<PathBuf, UppaalError> {
    let verifyta = config
        .verifyta_path
        .clone()
        .or_else(|| which::which("verifyta").ok())
        .ok_or_else(|| {
            UppaalError::NotFound(
                "verifyta not on PATH; install UPPAAL from https://uppaal.org/ or pass --verifyta"
                    .to_string(),
            )
        })?;

    let output = Command::new(&verifyta)
        .arg("-v")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| UppaalError::NotFound(format!("failed to execute {:?}: {}", verifyta, e)))?;

    if output.status.success() {
        let version = String::from_utf8_lossy(&output.stdout);
        debug!("detected verifyta: {}", version.trim());
        Ok(verifyta)
    } else {
        Err(UppaalError::NotFound(format!(
            "{:?} -v exited with {}",
            verifyta, output.status
        )))
    }
}
