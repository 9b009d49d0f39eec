//! Logs command

use anyhow::Result;

use super::Service;
use crate::config::StackConfig;
use crate::prompt::TerminalDecider;

/// Show the logs of one service's container
pub async fn logs(
    config: StackConfig,
    service: Service,
    tail: Option<usize>,
    follow: bool,
) -> Result<()> {
    let name = service.container_name(&config).to_string();
    let orchestrator = super::orchestrator(config, TerminalDecider::default())?;
    orchestrator.preflight().await?;
    orchestrator.logs(&name, tail, follow).await?;
    Ok(())
}
