//! Horizon status client
//!
//! This module handles:
//! - Communication with the Horizon root endpoint
//! - Parsing the status payload into the latest history ledger
//! - Error handling for unreachable or still-booting validators

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;

use crate::gate::ProgressSource;

/// Horizon client configuration
#[derive(Clone, Debug)]
pub struct HorizonConfig {
    /// Horizon root URL (e.g. http://localhost:8000)
    pub url: String,
    /// Connection timeout in seconds
    pub timeout: u64,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            timeout: 30,
        }
    }
}

/// The subset of the Horizon root payload the readiness gate consumes
#[derive(Deserialize, Debug)]
struct HorizonStatus {
    /// Latest ledger sequence ingested into history
    history_latest_ledger: u64,
}

/// HTTP client for the Horizon status endpoint
pub struct HorizonClient {
    /// HTTP client
    client: Client,
    /// Client configuration
    config: HorizonConfig,
}

impl HorizonClient {
    /// Create a new Horizon client
    pub fn new(config: HorizonConfig) -> Self {
        // Create HTTP client with appropriate timeouts
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Get the latest history ledger sequence from Horizon
    ///
    /// A non-200 response or an unparseable payload is an `Err` here; the
    /// readiness gate decides whether that is fatal.
    pub async fn get_latest_ledger(&self) -> Result<u64> {
        debug!("Querying Horizon status at {}", self.config.url);

        let response = self
            .client
            .get(&self.config.url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .context("Failed to send Horizon status request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "Horizon status request failed with status: {}",
                status
            ));
        }

        let body = response
            .json::<HorizonStatus>()
            .await
            .context("Failed to parse Horizon status response")?;

        debug!(
            "Horizon history latest ledger: {}",
            body.history_latest_ledger
        );
        Ok(body.history_latest_ledger)
    }
}

#[async_trait]
impl ProgressSource for HorizonClient {
    async fn query(&self) -> Result<u64> {
        self.get_latest_ledger().await
    }
}
