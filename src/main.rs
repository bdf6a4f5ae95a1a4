//! STANDUP CLI - bring up a local Soroban validator and deploy contracts
//!
//! This is the main binary for the standup project. It sequences the
//! external systems a contract developer needs for a local loop: the
//! quickstart validator container, the Horizon readiness signal, account
//! funding and artifact deployment.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use standup::{
    build_contracts, container,
    container::ContainerConfig,
    network::NetworkParams,
    CliFunder, ContractDeployer, HorizonClient, HorizonConfig, ReadinessGate, RetryLadder,
};

/// Main CLI arguments
#[derive(Parser)]
#[command(name = "standup")]
#[command(about = "STANDUP - local Soroban validator bring-up and contract deployment")]
#[command(version = "0.1.0")]
struct Args {
    /// Network provider
    #[arg(short = 'p', long, default_value = "local")]
    provider: String,

    /// Horizon URL (overrides the provider preset)
    #[arg(long)]
    horizon_url: Option<String>,

    /// Identity that funds and signs deployments
    #[arg(short = 'a', long, default_value = "alice")]
    account: String,

    /// Validator container name
    #[arg(long, default_value = "stellar")]
    container_name: String,

    /// Validator container image
    #[arg(long, default_value = "stellar/quickstart:latest")]
    container_image: String,

    /// Contracts workspace directory
    #[arg(long, default_value = "contracts")]
    contracts_dir: PathBuf,

    /// Artifact directory the build step fills and the deploy step reads
    #[arg(long, default_value = "out")]
    artifact_dir: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Command to execute (defaults to the full bring-up sequence)
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Start the validator container
    Start,
    /// Stop the validator container
    Stop,
    /// Print the latest history ledger reported by Horizon
    Status,
    /// Build the contract workspace to WASM artifacts
    Build,
    /// Fund the deploy identity, waiting on chain progress between retries
    Fund,
    /// Deploy a named artifact, or every artifact when no name is given
    Deploy {
        /// Artifact name (file stem of the *.wasm file)
        name: Option<String>,
    },
    /// Full sequence: start, wait for readiness, fund, build, deploy
    Up,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    // Determine network parameters from the provider preset
    let network = NetworkParams::from_provider(&args.provider)
        .map_err(|e| anyhow!("Invalid provider: {}", e))?;
    let horizon_url = args
        .horizon_url
        .clone()
        .unwrap_or_else(|| network.horizon_url.clone());

    let container_config = ContainerConfig {
        name: args.container_name.clone(),
        image: args.container_image.clone(),
        ..Default::default()
    };

    let horizon_config = HorizonConfig {
        url: horizon_url,
        ..Default::default()
    };
    let gate = ReadinessGate::new(HorizonClient::new(horizon_config.clone()));

    match args.command.unwrap_or(Commands::Up) {
        Commands::Start => {
            container::start(&container_config)?;
        }
        Commands::Stop => {
            container::stop(&container_config)?;
        }
        Commands::Status => {
            let horizon = HorizonClient::new(horizon_config.clone());
            let ledger = horizon
                .get_latest_ledger()
                .await
                .context("Failed to query Horizon status")?;
            println!("history_latest_ledger: {}", ledger);
        }
        Commands::Build => {
            build_contracts::build(&args.contracts_dir, &args.artifact_dir)?;
        }
        Commands::Fund => {
            fund(&gate, &args.account, &network).await?;
        }
        Commands::Deploy { name } => {
            let deployer =
                ContractDeployer::new(&args.account, &network.name, args.artifact_dir.clone());
            match name {
                Some(name) => {
                    deployer.deploy(&name).await?;
                }
                None => {
                    deployer.deploy_all().await?;
                }
            }
        }
        Commands::Up => {
            container::start(&container_config)?;

            info!("Waiting for the validator to produce its first ledgers");
            gate.await_progress(0).await;
            info!("Validator is producing ledgers");

            fund(&gate, &args.account, &network).await?;

            build_contracts::build(&args.contracts_dir, &args.artifact_dir)?;

            let deployer =
                ContractDeployer::new(&args.account, &network.name, args.artifact_dir.clone());
            let deployed = deployer.deploy_all().await?;
            info!("Deployed {} contract(s)", deployed.len());
        }
    }

    Ok(())
}

/// Fund the deploy identity with ladder-paced retries
async fn fund(
    gate: &ReadinessGate<HorizonClient>,
    account: &str,
    network: &NetworkParams,
) -> Result<()> {
    let funder = CliFunder::new(account, &network.name);
    funder.ensure_identity()?;

    gate.fund_with_retry(&funder, &RetryLadder::default())
        .await
        .context("Could not fund the deploy identity")?;
    Ok(())
}
