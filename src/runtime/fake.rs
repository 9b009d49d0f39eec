//! In-memory runtime that records every call, for orchestrator tests.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{ContainerRuntime, ContainerSpec, ContainerState, ContainerSummary, RuntimeError};

#[derive(Debug, Clone)]
pub struct FakeContainer {
    /// `None` for containers seeded as pre-existing
    pub spec: Option<ContainerSpec>,
    pub running: bool,
    /// Paused containers also count as running, like in docker
    pub paused: bool,
}

#[derive(Debug)]
pub struct FakeState {
    pub installed: bool,
    pub reachable: bool,
    pub networks: BTreeSet<String>,
    pub volumes: BTreeSet<String>,
    pub containers: BTreeMap<String, FakeContainer>,
    /// Operations that fail, keyed like `run:open-webui`
    pub failing: HashSet<String>,
    /// Every call in order, e.g. `stop:ollama`
    pub calls: Vec<String>,
    pub runs: u32,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            installed: true,
            reachable: true,
            networks: BTreeSet::new(),
            volumes: BTreeSet::new(),
            containers: BTreeMap::new(),
            failing: HashSet::new(),
            calls: Vec::new(),
            runs: 0,
        }
    }
}

/// Cloning shares state, so a test keeps a handle after handing one over
#[derive(Debug, Clone, Default)]
pub struct FakeRuntime {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_container(self, name: &str, running: bool) -> Self {
        self.state().containers.insert(
            name.to_string(),
            FakeContainer {
                spec: None,
                running,
                paused: false,
            },
        );
        self
    }

    pub fn with_paused_container(self, name: &str) -> Self {
        self.state().containers.insert(
            name.to_string(),
            FakeContainer {
                spec: None,
                running: true,
                paused: true,
            },
        );
        self
    }

    pub fn with_network(self, name: &str) -> Self {
        self.state().networks.insert(name.to_string());
        self
    }

    pub fn failing(self, op: &str) -> Self {
        self.state().failing.insert(op.to_string());
        self
    }

    pub fn unreachable(self) -> Self {
        self.state().reachable = false;
        self
    }

    pub fn not_installed(self) -> Self {
        self.state().installed = false;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn called(&self, call: &str) -> bool {
        self.state().calls.iter().any(|c| c == call)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.state()
            .containers
            .get(name)
            .map(|c| c.running && !c.paused)
            .unwrap_or(false)
    }

    pub fn spec_of(&self, name: &str) -> Option<ContainerSpec> {
        self.state()
            .containers
            .get(name)
            .and_then(|c| c.spec.clone())
    }

    /// Record `call`, failing it if the test asked for that
    fn record(&self, call: String) -> Result<MutexGuard<'_, FakeState>, RuntimeError> {
        let mut state = self.state();
        let failing = state.failing.contains(&call);
        state.calls.push(call.clone());
        if failing {
            return Err(RuntimeError::Failed {
                command: call,
                code: Some(1),
                stderr: "injected failure".to_string(),
            });
        }
        Ok(state)
    }
}

fn no_such(kind: &str, name: &str) -> RuntimeError {
    RuntimeError::Failed {
        command: format!("{} {}", kind, name),
        code: Some(1),
        stderr: format!("No such {}: {}", kind, name),
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    fn binary(&self) -> &str {
        "docker"
    }

    fn is_installed(&self) -> bool {
        self.state().installed
    }

    async fn info(&self) -> Result<(), RuntimeError> {
        let state = self.record("info".to_string())?;
        if !state.reachable {
            return Err(RuntimeError::Failed {
                command: "docker info".to_string(),
                code: Some(1),
                stderr: "Cannot connect to the Docker daemon".to_string(),
            });
        }
        Ok(())
    }

    async fn network_exists(&self, name: &str) -> Result<bool, RuntimeError> {
        let state = self.record(format!("network_exists:{}", name))?;
        Ok(state.networks.contains(name))
    }

    async fn create_network(&self, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.record(format!("create_network:{}", name))?;
        if !state.networks.insert(name.to_string()) {
            return Err(RuntimeError::Failed {
                command: format!("network create {}", name),
                code: Some(1),
                stderr: format!("network with name {} already exists", name),
            });
        }
        Ok(())
    }

    async fn remove_network(&self, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.record(format!("remove_network:{}", name))?;
        if !state.networks.remove(name) {
            return Err(no_such("network", name));
        }
        Ok(())
    }

    async fn list_containers(
        &self,
        names: &[&str],
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let state = self.record("list_containers".to_string())?;
        Ok(state
            .containers
            .iter()
            .filter(|(name, _)| names.contains(&name.as_str()))
            .map(|(name, container)| ContainerSummary {
                name: name.clone(),
                state: match (container.running, container.paused) {
                    (_, true) => ContainerState::Paused,
                    (true, false) => ContainerState::Running,
                    (false, false) => ContainerState::Exited,
                },
            })
            .collect())
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let mut state = self.record(format!("run:{}", spec.name))?;
        if state.containers.contains_key(&spec.name) {
            return Err(RuntimeError::Failed {
                command: format!("run {}", spec.name),
                code: Some(125),
                stderr: format!("container name \"/{}\" is already in use", spec.name),
            });
        }
        if !state.networks.contains(&spec.network) {
            return Err(no_such("network", &spec.network));
        }
        for volume in &spec.volumes {
            if let Some((name, _)) = volume.split_once(':') {
                state.volumes.insert(name.to_string());
            }
        }
        state.runs += 1;
        let id = format!("{:012x}", state.runs);
        state.containers.insert(
            spec.name.clone(),
            FakeContainer {
                spec: Some(spec.clone()),
                running: true,
                paused: false,
            },
        );
        Ok(id)
    }

    async fn start(&self, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.record(format!("start:{}", name))?;
        match state.containers.get_mut(name) {
            Some(container) if container.paused => Err(RuntimeError::Failed {
                command: format!("start {}", name),
                code: Some(1),
                stderr: "cannot start a paused container, try unpause instead".to_string(),
            }),
            Some(container) => {
                container.running = true;
                Ok(())
            }
            None => Err(no_such("container", name)),
        }
    }

    async fn unpause(&self, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.record(format!("unpause:{}", name))?;
        match state.containers.get_mut(name) {
            Some(container) if container.paused => {
                container.paused = false;
                Ok(())
            }
            Some(_) => Err(RuntimeError::Failed {
                command: format!("unpause {}", name),
                code: Some(1),
                stderr: format!("Container {} is not paused", name),
            }),
            None => Err(no_such("container", name)),
        }
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.record(format!("stop:{}", name))?;
        match state.containers.get_mut(name) {
            Some(container) => {
                container.running = false;
                container.paused = false;
                Ok(())
            }
            None => Err(no_such("container", name)),
        }
    }

    async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.record(format!("remove:{}", name))?;
        match state.containers.get(name) {
            Some(container) if container.running => Err(RuntimeError::Failed {
                command: format!("rm {}", name),
                code: Some(1),
                stderr: "cannot remove a running container".to_string(),
            }),
            Some(_) => {
                state.containers.remove(name);
                Ok(())
            }
            None => Err(no_such("container", name)),
        }
    }

    async fn remove_volume(&self, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.record(format!("remove_volume:{}", name))?;
        if !state.volumes.remove(name) {
            return Err(no_such("volume", name));
        }
        Ok(())
    }

    async fn exec(&self, name: &str, command: &[String]) -> Result<(), RuntimeError> {
        let state = self.record(format!("exec:{}:{}", name, command.join(" ")))?;
        match state.containers.get(name) {
            Some(container) if container.running && !container.paused => Ok(()),
            _ => Err(no_such("container", name)),
        }
    }

    async fn logs(
        &self,
        name: &str,
        tail: Option<usize>,
        follow: bool,
    ) -> Result<(), RuntimeError> {
        let state = self.record(format!("logs:{}:{:?}:{}", name, tail, follow))?;
        if !state.containers.contains_key(name) {
            return Err(no_such("container", name));
        }
        Ok(())
    }

    async fn status_table(&self, names: &[&str]) -> Result<String, RuntimeError> {
        let state = self.record("status_table".to_string())?;
        let mut table = "NAMES\tSTATUS\tPORTS\n".to_string();
        for (name, container) in state.containers.iter() {
            if names.contains(&name.as_str()) {
                let status = match (container.running, container.paused) {
                    (_, true) => "Up (Paused)",
                    (true, false) => "Up",
                    (false, false) => "Exited (0)",
                };
                table.push_str(&format!("{}\t{}\t\n", name, status));
            }
        }
        Ok(table)
    }
}
