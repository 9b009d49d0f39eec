//! Teardown command

use anyhow::Result;

use crate::config::StackConfig;
use crate::orchestrator::Teardown;
use crate::prompt::TerminalDecider;

/// Stop and remove the stack's containers
pub async fn down(config: StackConfig, network: bool, volumes: bool) -> Result<()> {
    let orchestrator = super::orchestrator(config, TerminalDecider::default())?;
    orchestrator.preflight().await?;
    orchestrator.teardown(Teardown { network, volumes }).await?;
    Ok(())
}
