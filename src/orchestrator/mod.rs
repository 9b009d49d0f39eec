//! Deployment orchestrator
//!
//! Runs the deploy flow against a [`ContainerRuntime`]:
//!
//! ```text
//! PREFLIGHT -> NETWORK -> RECONCILE -> { KEEP EXISTING | PROVISION -> MODEL? } -> REPORT
//! ```
//!
//! Every step is safe to re-run. A failure while creating the network or
//! provisioning containers stops and removes both containers before the
//! error is returned; probe, model pull and teardown failures only warn.
//! Ctrl-C during those two steps is handled the same way (see [`Interrupt`]).

mod interrupt;
mod report;

pub use interrupt::{Interrupt, INTERRUPTED_EXIT_CODE};
pub use report::{commands, endpoints};

use std::future::Future;

use tracing::{debug, error, info, warn};

use crate::config::StackConfig;
use crate::error::DeployError;
use crate::probe::{wait_ready, Probe};
use crate::prompt::Decider;
use crate::runtime::{ContainerRuntime, ContainerState};

/// Result of comparing existing containers with the desired stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing installed yet
    Fresh,
    /// Existing containers kept; `started` lists those started or unpaused
    KeepExisting { started: Vec<String> },
    /// Existing containers removed before provisioning
    Replace { removed: Vec<String> },
}

/// How a deploy run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    KeptExisting {
        started: Vec<String>,
    },
    Provisioned {
        /// Whether the inference server answered its readiness probe
        ready: bool,
        model_pulled: bool,
    },
}

/// What `down` removes besides the containers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Teardown {
    pub network: bool,
    pub volumes: bool,
}

pub struct Orchestrator<R, P, D> {
    config: StackConfig,
    runtime: R,
    probe: P,
    decider: D,
    interrupt: Interrupt,
}

impl<R, P, D> Orchestrator<R, P, D>
where
    R: ContainerRuntime,
    P: Probe,
    D: Decider,
{
    pub fn new(config: StackConfig, runtime: R, probe: P, decider: D) -> Self {
        Self {
            config,
            runtime,
            probe,
            decider,
            interrupt: Interrupt::new(),
        }
    }

    /// Use `interrupt` to abandon guarded steps
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Run the whole deploy flow
    pub async fn deploy(&mut self) -> Result<DeployOutcome, DeployError> {
        self.preflight().await?;
        self.guarded(self.ensure_network()).await?;

        match self.reconcile().await? {
            Reconciliation::KeepExisting { started } => {
                info!("Keeping existing containers");
                self.report().await;
                return Ok(DeployOutcome::KeptExisting { started });
            }
            Reconciliation::Replace { removed } => {
                info!("Removed existing containers: {}", removed.join(", "));
            }
            Reconciliation::Fresh => {}
        }

        let ready = self.guarded(self.provision()).await?;

        let model = self.config.default_model.clone();
        let model_pulled = self.fetch_model(&model).await?;

        self.report().await;
        info!("Deployment complete");

        Ok(DeployOutcome::Provisioned {
            ready,
            model_pulled,
        })
    }

    /// Check that the runtime is installed and answering
    pub async fn preflight(&self) -> Result<(), DeployError> {
        let binary = self.runtime.binary().to_string();

        if !self.runtime.is_installed() {
            return Err(DeployError::RuntimeNotInstalled(binary));
        }

        self.runtime
            .info()
            .await
            .map_err(|source| DeployError::RuntimeUnreachable {
                binary: binary.clone(),
                source,
            })?;

        info!("Container runtime '{}' is available", binary);
        Ok(())
    }

    /// Create the stack network unless it exists; returns whether it was created
    pub async fn ensure_network(&self) -> Result<bool, DeployError> {
        let network = &self.config.network;

        if self.runtime.network_exists(network).await? {
            warn!("Network '{}' already exists", network);
            return Ok(false);
        }

        self.runtime.create_network(network).await?;
        info!("Created network '{}'", network);
        Ok(true)
    }

    /// Look for containers from an earlier install and keep or remove them
    pub async fn reconcile(&mut self) -> Result<Reconciliation, DeployError> {
        let names = self.config.container_names();
        let existing = self.runtime.list_containers(&names).await?;

        if existing.is_empty() {
            debug!("no existing containers");
            return Ok(Reconciliation::Fresh);
        }

        let found: Vec<String> = existing.iter().map(|c| c.name.clone()).collect();
        warn!("Found existing containers: {}", found.join(", "));

        if !self.decider.replace_existing(&found)? {
            let mut started = Vec::new();
            for container in &existing {
                let name = &container.name;
                match &container.state {
                    ContainerState::Running => continue,
                    ContainerState::Paused => {
                        self.runtime.unpause(name).await?;
                        info!("Unpaused container '{}'", name);
                    }
                    ContainerState::Exited | ContainerState::Created => {
                        self.runtime.start(name).await?;
                        info!("Started container '{}'", name);
                    }
                    ContainerState::Other(state) => {
                        warn!("Container '{}' is {}; leaving it alone", name, state);
                        continue;
                    }
                }
                started.push(name.clone());
            }
            return Ok(Reconciliation::KeepExisting { started });
        }

        for name in &found {
            self.remove_quietly(name).await;
        }
        Ok(Reconciliation::Replace { removed: found })
    }

    /// Start both services; returns whether the inference server became ready
    pub async fn provision(&self) -> Result<bool, DeployError> {
        let ollama = self.config.ollama_spec();
        info!("Starting '{}' ({})", ollama.name, ollama.image);
        let id = self.runtime.run(&ollama).await?;
        debug!(container = %ollama.name, %id, "container started");

        let url = self.config.probe_url();
        info!("Waiting for Ollama at {}", url);
        let ready = wait_ready(&self.probe, &url, &self.config.probe).await;
        if ready {
            info!("Ollama is ready");
        } else {
            warn!(
                "Ollama did not answer at {} yet; it may still be starting",
                url
            );
        }

        let webui = self.config.webui_spec();
        info!("Starting '{}' ({})", webui.name, webui.image);
        let id = self.runtime.run(&webui).await?;
        debug!(container = %webui.name, %id, "container started");
        info!("Open WebUI is starting at {}", self.config.webui.host_url());

        Ok(ready)
    }

    /// Offer to pull `model`; a failed pull only warns
    pub async fn fetch_model(&mut self, model: &str) -> Result<bool, DeployError> {
        let hint = format!(
            "{} exec -it {} ollama pull {}",
            self.runtime.binary(),
            self.config.ollama.name,
            model
        );

        if !self.decider.pull_model(model)? {
            warn!("Skipping model download. Pull one later with: {}", hint);
            return Ok(false);
        }

        info!("Pulling model '{}'", model);
        match self
            .runtime
            .exec(&self.config.ollama.name, &pull_command(model))
            .await
        {
            Ok(()) => {
                info!("Model '{}' is available", model);
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to pull model '{}': {}", model, e);
                warn!("Pull it manually with: {}", hint);
                Ok(false)
            }
        }
    }

    /// Pull `model` into a running inference server
    pub async fn pull_model(&self, model: &str) -> Result<(), DeployError> {
        let name = &self.config.ollama.name;
        let running = self
            .runtime
            .list_containers(&[name.as_str()])
            .await?
            .iter()
            .any(|c| c.state.is_running());
        if !running {
            return Err(DeployError::NotRunning(name.clone()));
        }

        info!("Pulling model '{}'", model);
        self.runtime.exec(name, &pull_command(model)).await?;
        info!("Model '{}' is available", model);
        Ok(())
    }

    /// Stop and remove both containers, optionally the network and volumes
    pub async fn teardown(&self, teardown: Teardown) -> Result<(), DeployError> {
        let names = self.config.container_names();
        let existing = self.runtime.list_containers(&names).await?;

        for name in names {
            if !existing.iter().any(|c| c.name == name) {
                info!("Container '{}' is not present", name);
                continue;
            }
            if let Err(e) = self.runtime.stop(name).await {
                debug!(container = name, "stop failed: {}", e);
            }
            match self.runtime.remove(name).await {
                Ok(()) => info!("Removed container '{}'", name),
                Err(e) => warn!("Failed to remove container '{}': {}", name, e),
            }
        }

        if teardown.volumes {
            for service in self.config.services() {
                match self.runtime.remove_volume(&service.volume).await {
                    Ok(()) => info!("Removed volume '{}'", service.volume),
                    Err(e) => warn!("Failed to remove volume '{}': {}", service.volume, e),
                }
            }
        }

        if teardown.network {
            let network = &self.config.network;
            match self.runtime.remove_network(network).await {
                Ok(()) => info!("Removed network '{}'", network),
                Err(e) => warn!("Failed to remove network '{}': {}", network, e),
            }
        }

        Ok(())
    }

    /// Stream logs of the container called `name`
    pub async fn logs(
        &self,
        name: &str,
        tail: Option<usize>,
        follow: bool,
    ) -> Result<(), DeployError> {
        self.runtime.logs(name, tail, follow).await?;
        Ok(())
    }

    /// Print endpoints, the container table and follow-up commands
    pub async fn report(&self) {
        println!();
        print!("{}", endpoints(&self.config));
        println!();

        let names = self.config.container_names();
        match self.runtime.status_table(&names).await {
            Ok(table) => {
                println!("Containers:");
                print!("{}", table);
                println!();
            }
            Err(e) => warn!("Could not list containers: {}", e),
        }

        println!("Useful commands:");
        print!("{}", commands(&self.config, self.runtime.binary()));
    }

    /// Best-effort removal of both containers after a fatal error
    pub async fn cleanup(&self) {
        warn!("Cleaning up containers");
        for name in self.config.container_names() {
            self.remove_quietly(name).await;
        }
    }

    /// Run `step`, cleaning up if it fails or is interrupted
    async fn guarded<T, F>(&self, step: F) -> Result<T, DeployError>
    where
        F: Future<Output = Result<T, DeployError>>,
    {
        let scope = self.interrupt.guard();
        let result = tokio::select! {
            result = step => result,
            () = self.interrupt.fired() => Err(DeployError::Interrupted),
        };
        drop(scope);

        if let Err(ref e) = result {
            error!("Deployment failed: {}", e);
            self.cleanup().await;
        }
        result
    }

    /// Stop then remove, ignoring errors from absent containers
    async fn remove_quietly(&self, name: &str) {
        if let Err(e) = self.runtime.stop(name).await {
            debug!(container = name, "stop failed: {}", e);
        }
        if let Err(e) = self.runtime.remove(name).await {
            debug!(container = name, "remove failed: {}", e);
        }
    }
}

fn pull_command(model: &str) -> Vec<String> {
    vec!["ollama".to_string(), "pull".to_string(), model.to_string()]
}
