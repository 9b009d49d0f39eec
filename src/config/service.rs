//! Per-service container settings

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Container settings for one service of the stack
///
/// A service section in a config file must name every field except `env`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Container name, also its hostname on the stack network
    pub name: String,

    /// Image reference including tag
    pub image: String,

    /// Port published on the host
    pub host_port: u16,

    /// Port the service listens on inside the container
    pub container_port: u16,

    /// Named volume holding the service's persistent data
    pub volume: String,

    /// Mount path of the volume inside the container
    pub mount_path: String,

    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ServiceConfig {
    /// Default settings for the Ollama inference server
    pub fn ollama() -> Self {
        Self {
            name: "ollama".to_string(),
            image: "ollama/ollama:latest".to_string(),
            host_port: 11434,
            container_port: 11434,
            volume: "ollama".to_string(),
            mount_path: "/root/.ollama".to_string(),
            env: BTreeMap::new(),
        }
    }

    /// Default settings for the Open WebUI front end
    pub fn webui() -> Self {
        Self {
            name: "open-webui".to_string(),
            image: "ghcr.io/open-webui/open-webui:main".to_string(),
            host_port: 3000,
            container_port: 8080,
            volume: "open-webui".to_string(),
            mount_path: "/app/backend/data".to_string(),
            env: BTreeMap::new(),
        }
    }

    /// URL of the service as seen from the host
    pub fn host_url(&self) -> String {
        format!("http://localhost:{}", self.host_port)
    }

    /// URL of the service as seen from another container on the same network
    pub fn network_url(&self) -> String {
        format!("http://{}:{}", self.name, self.container_port)
    }

    /// `host:container` port mapping
    pub fn port_mapping(&self) -> String {
        format!("{}:{}", self.host_port, self.container_port)
    }

    /// `volume:path` mount
    pub fn volume_mount(&self) -> String {
        format!("{}:{}", self.volume, self.mount_path)
    }
}
