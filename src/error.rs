//! Deployment errors

use thiserror::Error;

use crate::runtime::RuntimeError;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("container runtime '{0}' is not installed. See https://docs.docker.com/get-docker/")]
    RuntimeNotInstalled(String),

    #[error("container runtime '{binary}' is not running or not reachable: {source}")]
    RuntimeUnreachable {
        binary: String,
        #[source]
        source: RuntimeError,
    },

    #[error("container '{0}' is not running. Start the stack with `ollama-stack up`")]
    NotRunning(String),

    #[error("interrupted")]
    Interrupted,

    #[error("failed to read answer: {0}")]
    Prompt(#[from] std::io::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl DeployError {
    /// Whether the failure happened before anything was touched
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::RuntimeNotInstalled(_) | Self::RuntimeUnreachable { .. }
        )
    }
}
