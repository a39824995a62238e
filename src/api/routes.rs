//! HTTP routes for the chat pages and their JSON API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::agent::{Agent, SessionPhase};
use crate::store::TaskStore;
use crate::tools::NO_TASKS_MESSAGE;

use super::pages;
use super::sessions::{ChatSession, InMemorySessionStore};
use super::types::{
    CreateSessionResponse, HealthResponse, SendMessageRequest, SendMessageResponse,
    SessionView, TasksResponse,
};

/// Shared state for all handlers.
pub struct AppState {
    pub agent: Agent,
    pub store: TaskStore,
    pub sessions: InMemorySessionStore,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(panel_page))
        .route("/chat", get(chat_page))
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(end_session))
        .route("/api/sessions/:id/messages", post(send_message))
        .route("/api/sessions/:id/history", delete(clear_history))
        .route("/api/tasks", get(list_tasks).delete(clear_tasks))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Chat with a live task panel.
async fn panel_page() -> Html<&'static str> {
    Html(pages::PANEL_PAGE)
}

/// GET /chat - Chat only.
async fn chat_page() -> Html<&'static str> {
    Html(pages::CHAT_PAGE)
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.agent.model().to_string(),
    })
}

/// POST /api/sessions - Start a conversation.
async fn create_session(State(state): State<Arc<AppState>>) -> Json<CreateSessionResponse> {
    let session = state.sessions.create().await;
    Json(CreateSessionResponse { id: session.id() })
}

/// GET /api/sessions/:id - Phase and history of a conversation.
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, (StatusCode, String)> {
    let session = find_session(&state, id).await?;
    Ok(Json(session_view(&session).await))
}

/// POST /api/sessions/:id/messages - Run one turn.
///
/// Model and tool failures are reported in the body's `error` field with a
/// 200 status; the session stays usable.
async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, (StatusCode, String)> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Message is empty".to_string()));
    }
    let session = find_session(&state, id).await?;

    let _turn = session.begin_turn().await;
    let history = session.history_snapshot().await;
    let observe = |phase: SessionPhase| session.set_phase(phase);
    let result = state
        .agent
        .run_turn_observed(message, &history, &observe)
        .await;

    let (reply, error, log) = match result {
        Ok(outcome) => {
            session.record_turn(message, outcome.answer.clone()).await;
            (Some(outcome.answer), None, outcome.log)
        }
        Err(e) => {
            tracing::warn!(session = %id, error = %e, "Turn failed");
            (None, Some(e.to_string()), Vec::new())
        }
    };
    let turns = session.turns().await;

    let tasks = match read_tasks(&state.store).await {
        Ok(snapshot) => snapshot.display,
        Err((_, message)) => message,
    };

    Ok(Json(SendMessageResponse {
        reply,
        error,
        turns,
        tasks,
        log,
    }))
}

/// DELETE /api/sessions/:id/history - Forget the conversation.
async fn clear_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, (StatusCode, String)> {
    let session = find_session(&state, id).await?;
    session.clear_history().await;
    tracing::info!(session = %id, "Cleared conversation");
    Ok(Json(session_view(&session).await))
}

/// DELETE /api/sessions/:id - End a conversation and drop its history.
async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.sessions.remove(id).await {
        tracing::debug!(session = %id, "Ended chat session");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Session {} not found", id)))
    }
}

/// GET /api/tasks - Current task list.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TasksResponse>, (StatusCode, String)> {
    read_tasks(&state.store).await.map(Json)
}

/// DELETE /api/tasks - Erase every task.
async fn clear_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TasksResponse>, (StatusCode, String)> {
    state.store.clear().await.map_err(internal_error)?;
    read_tasks(&state.store).await.map(Json)
}

async fn find_session(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<ChatSession>, (StatusCode, String)> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Session {} not found", id)))
}

async fn session_view(session: &ChatSession) -> SessionView {
    SessionView {
        id: session.id(),
        phase: session.phase(),
        turns: session.turns().await,
    }
}

async fn read_tasks(store: &TaskStore) -> Result<TasksResponse, (StatusCode, String)> {
    let tasks = store.list().await.map_err(internal_error)?;
    let display = if tasks.is_empty() {
        NO_TASKS_MESSAGE.to_string()
    } else {
        tasks.join("\n")
    };
    Ok(TasksResponse { tasks, display })
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("task operation failed: {}", e),
    )
}
