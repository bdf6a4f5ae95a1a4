//! Network parameters for Stellar networks
//!
//! This module provides functionality for configuring network parameters
//! for the networks the tool can target: the local quickstart validator,
//! testnet and futurenet.

/// Network parameters shared by the status client and the soroban CLI
#[derive(Clone, Debug)]
pub struct NetworkParams {
    /// Network name handed to the soroban CLI (e.g. "local")
    pub name: String,
    /// Horizon root URL; also the source of the readiness counter
    pub horizon_url: String,
    /// Network passphrase
    pub network_passphrase: String,
}

impl NetworkParams {
    /// Create network parameters for the local quickstart validator
    pub fn local() -> Self {
        Self {
            name: String::from("local"),
            horizon_url: String::from("http://localhost:8000"),
            network_passphrase: String::from("Standalone Network ; February 2017"),
        }
    }

    /// Create network parameters for testnet
    pub fn testnet() -> Self {
        Self {
            name: String::from("testnet"),
            horizon_url: String::from("https://horizon-testnet.stellar.org"),
            network_passphrase: String::from("Test SDF Network ; September 2015"),
        }
    }

    /// Create network parameters for futurenet
    pub fn futurenet() -> Self {
        Self {
            name: String::from("futurenet"),
            horizon_url: String::from("https://horizon-futurenet.stellar.org"),
            network_passphrase: String::from("Test SDF Future Network ; October 2022"),
        }
    }

    /// Get the network parameters for a given provider preset
    pub fn from_provider(provider: &str) -> Result<Self, String> {
        match provider.to_lowercase().as_str() {
            "local" | "localhost" | "standalone" => Ok(Self::local()),
            "testnet" => Ok(Self::testnet()),
            "futurenet" => Ok(Self::futurenet()),
            _ => Err(format!(
                "Unknown provider: {}. Supported networks: local, testnet, futurenet",
                provider
            )),
        }
    }
}

/// Get the Horizon URL for a given provider preset
pub fn get_horizon_url(provider: &str) -> String {
    match provider {
        "testnet" => "https://horizon-testnet.stellar.org".to_string(),
        "futurenet" => "https://horizon-futurenet.stellar.org".to_string(),
        "local" | "localhost" | "standalone" => "http://localhost:8000".to_string(),
        url if url.starts_with("http://") || url.starts_with("https://") => url.to_string(),
        _ => "http://localhost:8000".to_string(),
    }
}
