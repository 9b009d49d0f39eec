//! CLI commands
//!
//! `up` is the deploy flow and runs when no subcommand is given.

mod down;
mod logs;
mod pull;
mod status;
mod up;

pub use down::down;
pub use logs::logs;
pub use pull::pull;
pub use status::status;
pub use up::up;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::StackConfig;
use crate::orchestrator::Orchestrator;
use crate::probe::HttpProbe;
use crate::prompt::TerminalDecider;
use crate::runtime::CliRuntime;

/// ollama-stack - run Ollama and Open WebUI in containers
#[derive(Parser)]
#[command(name = "ollama-stack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (.yaml, .yml or .json)
    #[arg(long, short, global = true, env = "OLLAMA_STACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Container runtime binary, e.g. docker or podman
    #[arg(long, global = true, env = "OLLAMA_STACK_RUNTIME")]
    pub runtime: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Deploy the stack (default)
    Up {
        /// Replace existing containers without asking
        #[arg(long, conflicts_with = "keep")]
        replace: bool,

        /// Keep existing containers without asking
        #[arg(long)]
        keep: bool,

        /// Pull the default model without asking
        #[arg(long, conflicts_with = "no_pull")]
        pull: bool,

        /// Skip the model download without asking
        #[arg(long)]
        no_pull: bool,

        /// Model to offer instead of the configured default
        #[arg(long, short)]
        model: Option<String>,
    },

    /// Stop and remove both containers
    Down {
        /// Also remove the network
        #[arg(long)]
        network: bool,

        /// Also remove the data volumes (deletes models and chats)
        #[arg(long)]
        volumes: bool,
    },

    /// Show endpoints and container status
    Status,

    /// Show logs of one service
    Logs {
        /// Service to show
        service: Service,

        /// Keep streaming new output
        #[arg(long, short)]
        follow: bool,

        /// Number of lines from the end
        #[arg(long)]
        tail: Option<usize>,
    },

    /// Pull a model into the running Ollama container
    Pull {
        /// Model name (defaults to the configured default model)
        model: Option<String>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Up {
            replace: false,
            keep: false,
            pull: false,
            no_pull: false,
            model: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Service {
    Ollama,
    Webui,
}

impl Service {
    /// Container name of this service under `config`
    pub fn container_name(self, config: &StackConfig) -> &str {
        match self {
            Service::Ollama => &config.ollama.name,
            Service::Webui => &config.webui.name,
        }
    }
}

/// Map a `--yes`/`--no` flag pair to a preset answer
pub fn flag_answer(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Build the stack configuration from an optional file and overrides
pub fn load_config(path: Option<&Path>, runtime: Option<String>) -> Result<StackConfig> {
    let mut config = match path {
        Some(path) => StackConfig::load(path)?,
        None => StackConfig::default(),
    };

    if let Some(runtime) = runtime {
        config.runtime = runtime;
        config.validate()?;
    }

    Ok(config)
}

type CliOrchestrator = Orchestrator<CliRuntime, HttpProbe, TerminalDecider>;

fn orchestrator(config: StackConfig, decider: TerminalDecider) -> Result<CliOrchestrator> {
    let runtime = CliRuntime::new(config.runtime.clone());
    let probe = HttpProbe::new(config.probe.request_timeout())?;
    Ok(Orchestrator::new(config, runtime, probe, decider))
}
