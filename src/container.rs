//! Quickstart container lifecycle
//!
//! Starting and stopping the stellar/quickstart validator container via the
//! docker CLI. The container is a prerequisite the readiness gate assumes
//! has been initiated; nothing here waits for the validator to come up.

use anyhow::{anyhow, Context, Result};
use log::info;
use std::process::Command;

/// Container configuration
#[derive(Clone, Debug)]
pub struct ContainerConfig {
    /// Container name used for start/stop
    pub name: String,
    /// Image to run
    pub image: String,
    /// Host port mapped to the quickstart HTTP port
    pub port: u16,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: "stellar".to_string(),
            image: "stellar/quickstart:latest".to_string(),
            port: 8000,
        }
    }
}

/// Start the validator container in the background.
///
/// Fire-and-forget: `docker run -d` returns as soon as the container is
/// created. Readiness is the gate's job.
pub fn start(config: &ContainerConfig) -> Result<()> {
    info!(
        "Starting container '{}' from image {}",
        config.name, config.image
    );

    let status = Command::new("docker")
        .args([
            "run",
            "-d",
            "--rm",
            "--name",
            &config.name,
            "-p",
            &format!("{}:8000", config.port),
            &config.image,
            "--local",
            "--enable-soroban-rpc",
        ])
        .status()
        .context("Failed to execute 'docker run'")?;

    if !status.success() {
        return Err(anyhow!("'docker run' failed with status: {}", status));
    }

    info!("Container '{}' started", config.name);
    Ok(())
}

/// Stop the validator container
pub fn stop(config: &ContainerConfig) -> Result<()> {
    info!("Stopping container '{}'", config.name);

    let status = Command::new("docker")
        .args(["stop", &config.name])
        .status()
        .context("Failed to execute 'docker stop'")?;

    if !status.success() {
        return Err(anyhow!("'docker stop' failed with status: {}", status));
    }

    info!("Container '{}' stopped", config.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ContainerConfig::default();
        assert_eq!(config.name, "stellar");
        assert_eq!(config.port, 8000);
    }
}
