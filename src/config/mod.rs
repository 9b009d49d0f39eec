//! Configuration system for ollama-stack
//!
//! Every name, port, image and volume the deployment touches lives in
//! [`StackConfig`]. The defaults reproduce the stock Ollama + Open WebUI
//! setup; a YAML or JSON file can override any of them.

mod probe;
mod service;

pub use probe::ProbeConfig;
pub use service::ServiceConfig;

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::runtime::ContainerSpec;

/// Environment variable through which Open WebUI finds Ollama
pub const OLLAMA_BASE_URL_ENV: &str = "OLLAMA_BASE_URL";

/// Stack configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Container runtime binary (`docker`, `podman`, or a path)
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Network joining both containers
    #[serde(default = "default_network")]
    pub network: String,

    /// Restart policy applied to both containers
    #[serde(default = "default_restart_policy")]
    pub restart_policy: String,

    /// Model offered for download after provisioning
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Inference server
    #[serde(default = "ServiceConfig::ollama")]
    pub ollama: ServiceConfig,

    /// Web front end
    #[serde(default = "ServiceConfig::webui")]
    pub webui: ServiceConfig,

    /// Readiness polling of the inference server
    #[serde(default)]
    pub probe: ProbeConfig,
}

fn default_runtime() -> String {
    "docker".to_string()
}

fn default_network() -> String {
    "ollama-network".to_string()
}

fn default_restart_policy() -> String {
    "always".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            network: default_network(),
            restart_policy: default_restart_policy(),
            default_model: default_model(),
            ollama: ServiceConfig::ollama(),
            webui: ServiceConfig::webui(),
            probe: ProbeConfig::default(),
        }
    }
}

impl StackConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load and validate a config file, choosing the format by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(path),
            Some("yaml") | Some("yml") => Self::from_yaml(path),
            other => Err(anyhow!(
                "unsupported config format '{}', expected .yaml, .yml or .json",
                other.unwrap_or("")
            )),
        }
        .with_context(|| format!("failed to load config from {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the deployment relies on
    pub fn validate(&self) -> Result<()> {
        if self.runtime.trim().is_empty() {
            bail!("runtime must not be empty");
        }
        if self.network.trim().is_empty() {
            bail!("network name must not be empty");
        }
        if self.default_model.trim().is_empty() {
            bail!("default_model must not be empty");
        }
        if self.probe.attempts == 0 {
            bail!("probe.attempts must be at least 1");
        }

        for service in self.services() {
            if service.name.trim().is_empty() {
                bail!("container name must not be empty");
            }
            if service.image.trim().is_empty() {
                bail!("image for '{}' must not be empty", service.name);
            }
            if service.volume.trim().is_empty() || service.mount_path.trim().is_empty() {
                bail!("volume for '{}' must name a volume and a path", service.name);
            }
            if service.host_port == 0 || service.container_port == 0 {
                bail!("ports for '{}' must be non-zero", service.name);
            }
        }

        if self.ollama.name == self.webui.name {
            bail!("container names must differ, both are '{}'", self.ollama.name);
        }
        if self.ollama.host_port == self.webui.host_port {
            bail!("host port {} is used by both services", self.ollama.host_port);
        }

        if self.ollama.volume == self.webui.volume {
            bail!("volume '{}' is used by both services", self.ollama.volume);
        }

        Ok(())
    }

    /// Both services, inference server first
    pub fn services(&self) -> [&ServiceConfig; 2] {
        [&self.ollama, &self.webui]
    }

    /// Both container names, inference server first
    pub fn container_names(&self) -> [&str; 2] {
        [self.ollama.name.as_str(), self.webui.name.as_str()]
    }

    /// Status endpoint of the inference server on the host
    pub fn probe_url(&self) -> String {
        self.probe.url(&self.ollama.host_url())
    }

    /// Run request for the inference server
    pub fn ollama_spec(&self) -> ContainerSpec {
        self.spec_for(&self.ollama)
    }

    /// Run request for the web front end
    ///
    /// `OLLAMA_BASE_URL` always points at the inference server's address on
    /// the stack network and overrides any value from the config file.
    pub fn webui_spec(&self) -> ContainerSpec {
        let mut spec = self.spec_for(&self.webui);
        spec.env
            .insert(OLLAMA_BASE_URL_ENV.to_string(), self.ollama.network_url());
        spec
    }

    fn spec_for(&self, service: &ServiceConfig) -> ContainerSpec {
        ContainerSpec {
            name: service.name.clone(),
            image: service.image.clone(),
            network: self.network.clone(),
            ports: vec![service.port_mapping()],
            volumes: vec![service.volume_mount()],
            env: service.env.clone(),
            restart_policy: self.restart_policy.clone(),
        }
    }
}
