//! Scripted model client for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatMessage, ChatResponse, LlmClient, LlmError, ToolCall, ToolDefinition};

/// Replays queued responses in order; once the queue is drained it repeats
/// `fallback`, or fails if there is none.
pub(crate) struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    fallback: Option<ChatResponse>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    pub(crate) fn new(responses: Vec<Result<ChatResponse, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A model that requests `read_tasks` forever.
    pub(crate) fn always_tool_call() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: Some(tool_call("read_tasks", "{}")),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Conversations received so far, one entry per model call.
    pub(crate) fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

pub(crate) fn answer(text: &str) -> Result<ChatResponse, LlmError> {
    Ok(ChatResponse {
        content: Some(text.to_string()),
        tool_calls: None,
    })
}

pub(crate) fn tool_call(name: &str, arguments: &str) -> ChatResponse {
    ChatResponse {
        content: None,
        tool_calls: Some(vec![ToolCall::new("call_1", name, arguments)]),
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat_completion(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or_else(|| LlmError::Request("script exhausted".to_string()))
    }
}

/// Holds every call until the test releases it, so a turn can be observed
/// while the model request is in flight.
pub(crate) struct GatedLlm {
    inner: ScriptedLlm,
    pub(crate) entered: tokio::sync::Notify,
    pub(crate) release: tokio::sync::Notify,
}

impl GatedLlm {
    pub(crate) fn new(responses: Vec<Result<ChatResponse, LlmError>>) -> Self {
        Self {
            inner: ScriptedLlm::new(responses),
            entered: tokio::sync::Notify::new(),
            release: tokio::sync::Notify::new(),
        }
    }
}

#[async_trait]
impl LlmClient for GatedLlm {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatResponse, LlmError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.chat_completion(model, messages, tools).await
    }
}
