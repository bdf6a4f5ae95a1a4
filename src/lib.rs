//! Standup library
//!
//! This library contains the building blocks of the `standup` CLI: the
//! readiness gate that waits for a local validator to come up, the Horizon
//! status client it polls, and the subprocess plumbing for the container,
//! funding and deployment steps.

pub mod build_contracts;
pub mod container;
pub mod deploy;
pub mod fund;
pub mod gate;
pub mod network;
pub mod rpc;

pub use deploy::ContractDeployer;
pub use fund::CliFunder;
pub use gate::{GateConfig, GateError, GateResult, ReadinessGate, RetryLadder};
pub use rpc::{HorizonClient, HorizonConfig};
