//! Pull a model into the running inference server

use anyhow::Result;

use crate::config::StackConfig;
use crate::prompt::TerminalDecider;

/// Pull `model`, or the configured default model
pub async fn pull(config: StackConfig, model: Option<String>) -> Result<()> {
    let model = model.unwrap_or_else(|| config.default_model.clone());

    let orchestrator = super::orchestrator(config, TerminalDecider::default())?;
    orchestrator.preflight().await?;
    orchestrator.pull_model(&model).await?;
    Ok(())
}
