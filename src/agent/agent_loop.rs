//! Core agent loop implementation.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::history::SessionHistory;
use crate::llm::{self, ChatMessage, LlmClient, LlmError, ToolCall};
use crate::store::TaskStore;
use crate::tools::{ToolError, ToolRegistry};

use super::prompt::{assemble_messages, build_system_prompt};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent failure: {0}")]
    Llm(#[from] LlmError),

    #[error("agent failure: model returned an empty response")]
    EmptyResponse,

    #[error("gave up after {iterations} model calls without a final answer")]
    GaveUp { iterations: usize },
}

/// Where a session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for user input
    Idle,
    /// A model request is in flight
    AwaitingModel,
    /// Executing a tool the model asked for
    ToolCall,
    /// Terminal adapter received the exit command
    Exit,
}

/// Types of log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryType {
    ToolCall,
    ToolResult,
    Response,
}

/// A single entry in a turn's execution log.
#[derive(Debug, Clone, Serialize)]
pub struct TurnLogEntry {
    /// Timestamp (RFC 3339)
    pub timestamp: String,
    pub entry_type: LogEntryType,
    pub content: String,
}

/// Result of a completed turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub answer: String,
    /// Model calls made, including the final one
    pub iterations: usize,
    pub log: Vec<TurnLogEntry>,
}

/// The task list agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    model: String,
    max_iterations: usize,
    system_prompt: String,
}

impl Agent {
    /// Create an agent around an existing model client and tool set.
    pub fn new(config: &Config, llm: Arc<dyn LlmClient>, tools: ToolRegistry) -> Self {
        let system_prompt = build_system_prompt(&tools);
        Self {
            llm,
            tools,
            model: config.default_model.clone(),
            max_iterations: config.max_iterations.max(1),
            system_prompt,
        }
    }

    /// Wire up the configured provider client and the task tools.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let llm = llm::client_from_config(config)?;
        let tools = ToolRegistry::new(TaskStore::new(config.tasklist_path.clone()));
        Ok(Self::new(config, llm, tools))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one turn and return the final answer.
    pub async fn run_turn(
        &self,
        input: &str,
        history: &SessionHistory,
    ) -> Result<TurnOutcome, AgentError> {
        self.run_turn_observed(input, history, &|_| {}).await
    }

    /// Like [`Agent::run_turn`], reporting phase changes to `observe`.
    ///
    /// The observer always sees `Idle` last, whether the turn succeeds or not.
    pub async fn run_turn_observed(
        &self,
        input: &str,
        history: &SessionHistory,
        observe: &(dyn Fn(SessionPhase) + Send + Sync),
    ) -> Result<TurnOutcome, AgentError> {
        let result = self.drive(input, history, observe).await;
        observe(SessionPhase::Idle);
        result
    }

    async fn drive(
        &self,
        input: &str,
        history: &SessionHistory,
        observe: &(dyn Fn(SessionPhase) + Send + Sync),
    ) -> Result<TurnOutcome, AgentError> {
        let mut log = Vec::new();
        let mut messages = assemble_messages(&self.system_prompt, history, input);
        let tool_schemas = self.tools.get_tool_schemas();

        for iteration in 0..self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);
            observe(SessionPhase::AwaitingModel);

            let response = self
                .llm
                .chat_completion(&self.model, &messages, Some(tool_schemas.as_slice()))
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "Model call failed"))?;

            if let Some(tool_calls) = response.tool_calls.filter(|c| !c.is_empty()) {
                messages.push(ChatMessage::assistant_tool_calls(
                    response.content.clone(),
                    tool_calls.clone(),
                ));

                for tool_call in &tool_calls {
                    observe(SessionPhase::ToolCall);
                    log.push(log_entry(
                        LogEntryType::ToolCall,
                        format!(
                            "Calling tool: {} with args: {}",
                            tool_call.function.name, tool_call.function.arguments
                        ),
                    ));

                    // Failures go back to the model as the tool result so it can
                    // correct itself or explain the problem.
                    let result_str = match self.execute_tool_call(tool_call).await {
                        Ok(output) => output,
                        Err(e) => {
                            tracing::warn!(tool = %tool_call.function.name, error = %e, "Tool call failed");
                            e.to_string()
                        }
                    };

                    log.push(log_entry(
                        LogEntryType::ToolResult,
                        truncate_for_log(&result_str, 1000),
                    ));
                    messages.push(ChatMessage::tool_result(tool_call.id.clone(), result_str));
                }

                continue;
            }

            return match response.content.filter(|c| !c.trim().is_empty()) {
                Some(content) => {
                    log.push(log_entry(
                        LogEntryType::Response,
                        truncate_for_log(&content, 2000),
                    ));
                    Ok(TurnOutcome {
                        answer: content,
                        iterations: iteration + 1,
                        log,
                    })
                }
                None => Err(AgentError::EmptyResponse),
            };
        }

        tracing::warn!(
            max_iterations = self.max_iterations,
            "Turn ended without a final answer"
        );
        Err(AgentError::GaveUp {
            iterations: self.max_iterations,
        })
    }

    /// Execute a single tool call.
    async fn execute_tool_call(&self, tool_call: &ToolCall) -> Result<String, ToolError> {
        let raw = tool_call.function.arguments.trim();
        let args = if raw.is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_json::from_str(raw).map_err(|e| {
                ToolError::InvalidArguments(format!("Arguments are not valid JSON: {}", e))
            })?
        };

        self.tools.execute(&tool_call.function.name, args).await
    }
}

fn log_entry(entry_type: LogEntryType, content: String) -> TurnLogEntry {
    TurnLogEntry {
        timestamp: Utc::now().to_rfc3339(),
        entry_type,
        content,
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}
