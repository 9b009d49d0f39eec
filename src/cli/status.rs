//! Status command

use anyhow::Result;

use crate::config::StackConfig;
use crate::prompt::TerminalDecider;

/// Print endpoints, container status and follow-up commands
pub async fn status(config: StackConfig) -> Result<()> {
    let orchestrator = super::orchestrator(config, TerminalDecider::default())?;
    orchestrator.preflight().await?;
    orchestrator.report().await;
    Ok(())
}
