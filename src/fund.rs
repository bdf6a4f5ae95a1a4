//! Funding the deploy identity
//!
//! The mutating side of the readiness gate: funding an account via the
//! soroban CLI. The CLI's fund command is idempotent for an already-funded
//! account, which is what lets the gate retry it per ladder step.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::process::Command;

use crate::gate::FundingAction;

/// Funds an account through `soroban keys fund`
#[derive(Clone, Debug)]
pub struct CliFunder {
    /// Identity name known to the soroban CLI
    pub account: String,
    /// Network name handed to the CLI
    pub network: String,
}

impl CliFunder {
    pub fn new(account: &str, network: &str) -> Self {
        Self {
            account: account.to_string(),
            network: network.to_string(),
        }
    }

    /// Create the identity if the CLI does not know it yet.
    ///
    /// `soroban keys generate` fails when the identity already exists; that
    /// is fine and is not treated as an error.
    pub fn ensure_identity(&self) -> Result<()> {
        debug!("Ensuring identity '{}' exists", self.account);

        let output = Command::new("soroban")
            .args(["keys", "generate", "--no-fund", &self.account])
            .output()
            .context("Failed to execute 'soroban keys generate'")?;

        if output.status.success() {
            info!("Created identity '{}'", self.account);
        } else {
            debug!("Identity '{}' already exists", self.account);
        }
        Ok(())
    }
}

#[async_trait]
impl FundingAction for CliFunder {
    async fn fund(&self) -> Result<()> {
        debug!(
            "Funding account '{}' on network '{}'",
            self.account, self.network
        );

        let status = Command::new("soroban")
            .args(["keys", "fund", &self.account, "--network", &self.network])
            .status()
            .context("Failed to execute 'soroban keys fund'")?;

        if !status.success() {
            return Err(anyhow!(
                "'soroban keys fund {}' failed with status: {}",
                self.account,
                status
            ));
        }

        info!("Funded account '{}'", self.account);
        Ok(())
    }
}
