//! Contract WASM build step
//!
//! Builds the contract workspace for the wasm32 target and copies the
//! produced artifacts into the artifact directory the deployer reads from.

use anyhow::{anyhow, Context, Result};
use log::info;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Build the contract workspace and collect the artifacts into `out_dir`
pub fn build(contracts_dir: &Path, out_dir: &Path) -> Result<()> {
    let contracts_dir = fs::canonicalize(contracts_dir)
        .with_context(|| format!("Failed to find contracts directory at {:?}", contracts_dir))?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create artifact directory at {:?}", out_dir))?;

    info!("Building contracts in {:?}", contracts_dir);

    let status = Command::new("cargo")
        .args(["build", "--release", "--target", "wasm32-unknown-unknown"])
        .current_dir(&contracts_dir)
        .status()
        .context("Failed to execute 'cargo build' for contracts")?;

    if !status.success() {
        return Err(anyhow!(
            "'cargo build' for contracts failed with status: {}",
            status
        ));
    }

    let wasm_dir = contracts_dir.join("target/wasm32-unknown-unknown/release");
    if !wasm_dir.exists() {
        return Err(anyhow!("WASM output directory not found at {:?}", wasm_dir));
    }

    let mut copied = 0;
    for entry in fs::read_dir(&wasm_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("wasm") {
            if let Some(file_name) = path.file_name() {
                let dest_path = out_dir.join(file_name);
                info!("Copying {:?} to {:?}", path, dest_path);
                fs::copy(&path, &dest_path)
                    .with_context(|| format!("Failed to copy wasm file to {:?}", dest_path))?;
                copied += 1;
            }
        }
    }

    if copied == 0 {
        return Err(anyhow!("Contract build produced no *.wasm artifacts"));
    }

    info!("Collected {} artifact(s) in {:?}", copied, out_dir);
    Ok(())
}
