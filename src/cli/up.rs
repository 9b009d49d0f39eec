//! Deploy command

use anyhow::Result;

use crate::config::StackConfig;
use crate::orchestrator::{DeployOutcome, Interrupt};
use crate::prompt::TerminalDecider;

/// Deploy the stack, asking only the questions not answered up front
pub async fn up(
    mut config: StackConfig,
    replace: Option<bool>,
    pull: Option<bool>,
    model: Option<String>,
) -> Result<()> {
    if let Some(model) = model {
        config.default_model = model;
    }

    let interrupt = Interrupt::new();
    let listener = interrupt.listen_ctrl_c();
    let mut orchestrator = super::orchestrator(config, TerminalDecider::new(replace, pull))?
        .with_interrupt(interrupt);

    let result = orchestrator.deploy().await;
    listener.abort();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_precondition() => {
            tracing::info!("Nothing was changed");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    match outcome {
        DeployOutcome::KeptExisting { started } if started.is_empty() => {
            tracing::info!("Existing installation is already running");
        }
        DeployOutcome::KeptExisting { started } => {
            tracing::info!("Restarted existing containers: {}", started.join(", "));
        }
        DeployOutcome::Provisioned { .. } => {}
    }

    Ok(())
}
