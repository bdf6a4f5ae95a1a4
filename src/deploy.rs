//! Contract artifact deployment
//!
//! Deploys compiled WASM artifacts from the artifact directory to the
//! target network through the soroban CLI.

use anyhow::{anyhow, Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Deploys WASM artifacts via the soroban CLI
pub struct ContractDeployer {
    /// Identity that signs the deployment
    account: String,
    /// Network name handed to the CLI
    network: String,
    /// Directory holding the compiled *.wasm artifacts
    artifact_dir: PathBuf,
}

impl ContractDeployer {
    pub fn new(account: &str, network: &str, artifact_dir: PathBuf) -> Self {
        Self {
            account: account.to_string(),
            network: network.to_string(),
            artifact_dir,
        }
    }

    /// Deploy a single named artifact, returning the contract id printed by
    /// the CLI.
    pub async fn deploy(&self, name: &str) -> Result<String> {
        let wasm_path = self.artifact_dir.join(format!("{}.wasm", name));
        if !wasm_path.exists() {
            return Err(anyhow!(
                "Artifact not found at {:?}; run the build step first",
                wasm_path
            ));
        }

        info!("Deploying contract '{}' from {:?}", name, wasm_path);

        let output = Command::new("soroban")
            .args([
                "contract",
                "deploy",
                "--wasm",
                wasm_path
                    .to_str()
                    .ok_or_else(|| anyhow!("Non-UTF8 artifact path: {:?}", wasm_path))?,
                "--source",
                &self.account,
                "--network",
                &self.network,
            ])
            .output()
            .context("Failed to execute 'soroban contract deploy'")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "'soroban contract deploy' for '{}' failed with status {}: {}",
                name,
                output.status,
                stderr.trim()
            ));
        }

        let contract_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if contract_id.is_empty() {
            return Err(anyhow!("Deploy of '{}' produced no contract id", name));
        }

        println!("✅ Contract '{}' deployed successfully!", name);
        println!("🏷️  Contract ID: {}", contract_id);

        Ok(contract_id)
    }

    /// Deploy every *.wasm artifact in the artifact directory
    pub async fn deploy_all(&self) -> Result<Vec<(String, String)>> {
        let names = self.artifact_names()?;
        if names.is_empty() {
            return Err(anyhow!(
                "No *.wasm artifacts found in {:?}; run the build step first",
                self.artifact_dir
            ));
        }

        let mut deployed = Vec::new();
        for name in names {
            let contract_id = self.deploy(&name).await?;
            deployed.push((name, contract_id));
        }
        Ok(deployed)
    }

    /// List artifact names (file stems of *.wasm files) in the artifact
    /// directory, sorted for a stable deploy order.
    pub fn artifact_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.artifact_dir)
            .with_context(|| format!("Failed to read artifact directory {:?}", self.artifact_dir))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("wasm") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
