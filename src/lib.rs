//! ollama-stack - Ollama and Open WebUI in two containers
//!
//! Deploys an Ollama inference server and the Open WebUI front end through
//! a container runtime's CLI (`docker` by default, `podman` works too).
//!
//! # Architecture
//!
//! - **runtime**: the [`ContainerRuntime`] seam and its CLI-backed client
//! - **orchestrator**: the idempotent deploy/teardown sequence
//! - **probe**: readiness polling of the inference server
//! - **prompt**: the two yes/no decisions of the deploy flow
//! - **cli**: subcommands wiring the above together
//!
//! # Example
//!
//! ```bash
//! # Deploy, answering prompts interactively
//! ollama-stack up
//!
//! # Recreate everything and fetch a model without prompts
//! ollama-stack up --replace --pull --model qwen2.5:0.5b
//!
//! # Remove containers and the network, keep data volumes
//! ollama-stack down --network
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod probe;
pub mod prompt;
pub mod runtime;

// Re-export key types
pub use config::{ProbeConfig, ServiceConfig, StackConfig};
pub use error::DeployError;
pub use orchestrator::{DeployOutcome, Interrupt, Orchestrator, Reconciliation, Teardown};
pub use probe::{HttpProbe, Probe};
pub use prompt::{Decider, TerminalDecider};
pub use runtime::{CliRuntime, ContainerRuntime, ContainerSpec, RuntimeError};
