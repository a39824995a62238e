//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::{SessionPhase, TurnLogEntry};
use crate::history::Turn;

/// Response after creating a session.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    pub id: Uuid,
}

/// Current state of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub phase: SessionPhase,
    pub turns: Vec<Turn>,
}

/// A user message for the assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Outcome of one turn.
///
/// Exactly one of `reply` and `error` is set. A failed turn leaves the
/// session usable and is not added to `turns`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub turns: Vec<Turn>,
    /// Task panel text, re-read after the turn
    pub tasks: String,
    pub log: Vec<TurnLogEntry>,
}

/// Task list snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<String>,
    /// Panel text: the joined tasks, or the "no tasks" sentinel
    pub display: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
}
