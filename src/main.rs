//! Task List Agent - Terminal Entry Point
//!
//! Interactive line-based chat with the task list assistant.

use tasklist_agent::{agent::Agent, cli, config::Config, history::SessionHistory};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr so they do not interleave with the conversation.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklist_agent=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        "Loaded configuration: model={} tasks={}",
        config.default_model,
        config.tasklist_path.display()
    );

    let agent = Agent::from_config(&config)?;
    let mut history = SessionHistory::new(config.history_limit);

    cli::run_terminal(
        &agent,
        &mut history,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    Ok(())
}
