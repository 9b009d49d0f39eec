//! Container runtime client
//!
//! The orchestrator only ever talks to a container engine through
//! [`ContainerRuntime`]. [`CliRuntime`] implements it by shelling out to the
//! `docker` (or compatible) binary.

mod cli;
#[cfg(test)]
pub(crate) mod fake;

pub use cli::{exec_args, logs_args, run_args, CliRuntime};

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("container runtime '{0}' not found on PATH")]
    NotInstalled(String),

    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {stderr}", exit_label(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

/// Everything needed to start one detached container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub network: String,
    /// `host:container` mappings
    pub ports: Vec<String>,
    /// `volume:path` mounts
    pub volumes: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub restart_policy: String,
}

/// Lifecycle state reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Exited,
    Created,
    Paused,
    Other(String),
}

impl ContainerState {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "exited" => Self::Exited,
            "created" => Self::Created,
            "paused" => Self::Paused,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// A container observed through `ps`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub name: String,
    pub state: ContainerState,
}

/// Operations the deployment needs from a container engine
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Binary name used in follow-up hints
    fn binary(&self) -> &str;

    /// Whether the runtime binary can be found
    fn is_installed(&self) -> bool;

    /// Status query; fails when the engine is not reachable
    async fn info(&self) -> Result<(), RuntimeError>;

    async fn network_exists(&self, name: &str) -> Result<bool, RuntimeError>;

    async fn create_network(&self, name: &str) -> Result<(), RuntimeError>;

    async fn remove_network(&self, name: &str) -> Result<(), RuntimeError>;

    /// Containers, running or not, whose name is exactly one of `names`
    async fn list_containers(
        &self,
        names: &[&str],
    ) -> Result<Vec<ContainerSummary>, RuntimeError>;

    /// Start a detached container, returning its id
    async fn run(&self, spec: &ContainerSpec) -> Result<String, RuntimeError>;

    async fn start(&self, name: &str) -> Result<(), RuntimeError>;

    async fn unpause(&self, name: &str) -> Result<(), RuntimeError>;

    async fn stop(&self, name: &str) -> Result<(), RuntimeError>;

    async fn remove(&self, name: &str) -> Result<(), RuntimeError>;

    async fn remove_volume(&self, name: &str) -> Result<(), RuntimeError>;

    /// Run a command inside a container with the terminal attached
    async fn exec(&self, name: &str, command: &[String]) -> Result<(), RuntimeError>;

    /// Stream container logs to the terminal
    async fn logs(
        &self,
        name: &str,
        tail: Option<usize>,
        follow: bool,
    ) -> Result<(), RuntimeError>;

    /// Name/status/ports table rendered by the runtime itself
    async fn status_table(&self, names: &[&str]) -> Result<String, RuntimeError>;
}
