//! verifyta execution

use crate::error::UppaalError;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Captured verifyta run
#[derive(Debug, Clone)]
pub struct VerifytaOutput {
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
    /// Wall time of the run
    pub duration: Duration,
}

/// Run verifyta on one concrete project and one property file
///
/// Mirrors the `verifyta project.xml property.txt` invocation. A non-zero
/// exit is reported as [`UppaalError::VerificationFailed`] carrying stderr;
/// property violations do not make verifyta exit non-zero, they show up in
/// stdout instead.
pub async fn run_verifyta(
    verifyta: &Path,
    project: &Path,
    property: &Path,
    timeout: Duration,
) -> Result<VerifytaOutput, UppaalError> {
    let start = Instant::now();

    let mut cmd = Command::new(verifyta);
    cmd.arg(project)
        .arg(property)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| UppaalError::Timeout(timeout))?
        .map_err(|e| UppaalError::VerificationFailed(format!("failed to run verifyta: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let duration = start.elapsed();

    debug!("verifyta stdout:\n{}", stdout.trim_end());
    if !stderr.is_empty() {
        debug!("verifyta stderr:\n{}", stderr.trim_end());
    }

    if !output.status.success() {
        return Err(UppaalError::VerificationFailed(format!(
            "verifyta exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(VerifytaOutput {
        stdout,
        stderr,
        duration,
    })
}
