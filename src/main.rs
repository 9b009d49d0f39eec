use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ollama_stack::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ollama_stack=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false),
        )
        .init();

    let args = Cli::parse();
    let config = cli::load_config(args.config.as_deref(), args.runtime)?;

    match args.command.unwrap_or_default() {
        Commands::Up {
            replace,
            keep,
            pull,
            no_pull,
            model,
        } => {
            cli::up(
                config,
                cli::flag_answer(replace, keep),
                cli::flag_answer(pull, no_pull),
                model,
            )
            .await?;
        }
        Commands::Down { network, volumes } => {
            cli::down(config, network, volumes).await?;
        }
        Commands::Status => {
            cli::status(config).await?;
        }
        Commands::Logs {
            service,
            follow,
            tail,
        } => {
            cli::logs(config, service, tail, follow).await?;
        }
        Commands::Pull { model } => {
            cli::pull(config, model).await?;
        }
    }

    Ok(())
}
