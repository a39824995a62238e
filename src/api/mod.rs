//! Web front end.
//!
//! Serves two chat pages over one JSON API:
//! - `GET /` - chat plus a task panel with "Clear All Tasks" and
//!   "Clear Conversation" buttons
//! - `GET /chat` - chat only
//!
//! Sessions live in server memory keyed by a UUID the page keeps in tab state.
//! A page ends its session when the tab goes away; idle sessions are evicted.

mod pages;
pub mod routes;
pub mod sessions;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use crate::agent::Agent;
use crate::config::Config;
use crate::store::TaskStore;

pub use routes::{router, AppState};
pub use sessions::InMemorySessionStore;

/// Build the agent from `config` and serve until the process is stopped.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let agent = Agent::from_config(&config)?;
    let state = Arc::new(AppState {
        agent,
        store: TaskStore::new(config.tasklist_path.clone()),
        sessions: InMemorySessionStore::with_limits(
            config.history_limit,
            config.max_sessions,
            Duration::from_secs(config.session_idle_secs),
        ),
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
