//! Runtime client that shells out to the container engine binary

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{ContainerRuntime, ContainerSpec, ContainerState, ContainerSummary, RuntimeError};

const PS_FORMAT: &str = "{{.Names}}\t{{.State}}";
const TABLE_FORMAT: &str = "table {{.Names}}\t{{.Status}}\t{{.Ports}}";

/// [`ContainerRuntime`] backed by the `docker` CLI or a compatible one
#[derive(Debug, Clone)]
pub struct CliRuntime {
    binary: String,
}

impl CliRuntime {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn render(&self, args: &[&str]) -> String {
        let mut rendered = self.binary.clone();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    fn spawn_error(&self, command: String, source: std::io::Error) -> RuntimeError {
        if source.kind() == std::io::ErrorKind::NotFound {
            RuntimeError::NotInstalled(self.binary.clone())
        } else {
            RuntimeError::Spawn { command, source }
        }
    }

    /// Run to completion, returning stdout
    async fn capture(&self, args: &[&str]) -> Result<String, RuntimeError> {
        let command = self.render(args);
        debug!(%command, "invoking runtime");

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(command.clone(), e))?;

        if !output.status.success() {
            return Err(RuntimeError::Failed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run to completion with the terminal attached
    async fn attach(&self, args: &[&str]) -> Result<(), RuntimeError> {
        let command = self.render(args);
        debug!(%command, "invoking runtime (attached)");

        let status = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| self.spawn_error(command.clone(), e))?;

        if !status.success() {
            return Err(RuntimeError::Failed {
                command,
                code: status.code(),
                stderr: String::new(),
            });
        }

        Ok(())
    }
}

/// Arguments for `run` that start `spec` detached
pub fn run_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        spec.name.clone(),
        "--network".to_string(),
        spec.network.clone(),
    ];

    for port in &spec.ports {
        args.push("-p".to_string());
        args.push(port.clone());
    }
    for volume in &spec.volumes {
        args.push("-v".to_string());
        args.push(volume.clone());
    }
    for (key, value) in &spec.env {
        args.push("-e".to_string());
        args.push(format!("{}={}", key, value));
    }

    args.push("--restart".to_string());
    args.push(spec.restart_policy.clone());
    args.push(spec.image.clone());
    args
}

/// Arguments for `exec` that run `command` inside `name`
pub fn exec_args(name: &str, command: &[String]) -> Vec<String> {
    let mut args = vec!["exec".to_string(), name.to_string()];
    args.extend(command.iter().cloned());
    args
}

/// Arguments for `logs`; options come before the container name
pub fn logs_args(name: &str, tail: Option<usize>, follow: bool) -> Vec<String> {
    let mut args = vec!["logs".to_string()];
    if let Some(tail) = tail {
        args.push("--tail".to_string());
        args.push(tail.to_string());
    }
    if follow {
        args.push("--follow".to_string());
    }
    args.push(name.to_string());
    args
}

fn name_filters(names: &[&str]) -> Vec<String> {
    names
        .iter()
        .flat_map(|name| ["--filter".to_string(), format!("name=^{}$", name)])
        .collect()
}

/// Parse `Names\tState` lines, keeping exact name matches only
fn parse_ps_output(stdout: &str, names: &[&str]) -> Vec<ContainerSummary> {
    stdout
        .lines()
        .filter_map(|line| {
            let (name, state) = line.split_once('\t')?;
            let name = name.trim();
            names.contains(&name).then(|| ContainerSummary {
                name: name.to_string(),
                state: ContainerState::parse(state),
            })
        })
        .collect()
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    fn binary(&self) -> &str {
        &self.binary
    }

    fn is_installed(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    async fn info(&self) -> Result<(), RuntimeError> {
        self.capture(&["info"]).await.map(|_| ())
    }

    async fn network_exists(&self, name: &str) -> Result<bool, RuntimeError> {
        let filter = format!("name=^{}$", name);
        let stdout = self
            .capture(&["network", "ls", "--filter", &filter, "--format", "{{.Name}}"])
            .await?;
        Ok(stdout.lines().any(|line| line.trim() == name))
    }

    async fn create_network(&self, name: &str) -> Result<(), RuntimeError> {
        self.capture(&["network", "create", name]).await.map(|_| ())
    }

    async fn remove_network(&self, name: &str) -> Result<(), RuntimeError> {
        self.capture(&["network", "rm", name]).await.map(|_| ())
    }

    async fn list_containers(
        &self,
        names: &[&str],
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let filters = name_filters(names);
        let mut args = vec!["ps", "-a"];
        args.extend(filters.iter().map(String::as_str));
        args.extend(["--format", PS_FORMAT]);

        let stdout = self.capture(&args).await?;
        Ok(parse_ps_output(&stdout, names))
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let args = run_args(spec);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let stdout = self.capture(&args).await?;
        Ok(stdout.trim().to_string())
    }

    async fn start(&self, name: &str) -> Result<(), RuntimeError> {
        self.capture(&["start", name]).await.map(|_| ())
    }

    async fn unpause(&self, name: &str) -> Result<(), RuntimeError> {
        self.capture(&["unpause", name]).await.map(|_| ())
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        self.capture(&["stop", name]).await.map(|_| ())
    }

    async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
        self.capture(&["rm", name]).await.map(|_| ())
    }

    async fn remove_volume(&self, name: &str) -> Result<(), RuntimeError> {
        self.capture(&["volume", "rm", name]).await.map(|_| ())
    }

    async fn exec(&self, name: &str, command: &[String]) -> Result<(), RuntimeError> {
        let args = exec_args(name, command);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.attach(&args).await
    }

    async fn logs(
        &self,
        name: &str,
        tail: Option<usize>,
        follow: bool,
    ) -> Result<(), RuntimeError> {
        let args = logs_args(name, tail, follow);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.attach(&args).await
    }

    async fn status_table(&self, names: &[&str]) -> Result<String, RuntimeError> {
        let filters = name_filters(names);
        let mut args = vec!["ps", "-a"];
        args.extend(filters.iter().map(String::as_str));
        args.extend(["--format", TABLE_FORMAT]);
        self.capture(&args).await
    }
}
