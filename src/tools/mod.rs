//! Tools the model can call.
//!
//! Every tool has a name, a natural-language description the model uses to
//! decide when to call it, and a JSON schema for its arguments. Tools perform
//! their side effect and return a typed result; they never print.

mod tasks;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::llm::ToolDefinition;
use crate::store::{StoreError, TaskStore};

pub use tasks::{AddTask, ReadTasks, NO_TASKS_MESSAGE};

#[derive(Debug, Error)]
pub enum ToolError {
    /// Argument problems the model can fix on its next attempt.
    #[error("{0}")]
    InvalidArguments(String),

    #[error("task operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// A capability exposed to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema describing the arguments object.
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<String, ToolError>;
}

/// Name and description, for prompts and listings.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Ordered set of tools offered to the model.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with the task tools bound to `store`.
    pub fn new(store: TaskStore) -> Self {
        Self::empty()
            .with_tool(AddTask::new(store.clone()))
            .with_tool(ReadTasks::new(store))
    }

    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    pub fn get_tool_schemas(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> (tempfile::TempDir, ToolRegistry) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TaskStore::new(dir.path().join("tasklist.txt"));
        (dir, ToolRegistry::new(store))
    }

    #[test]
    fn registry_lists_task_tools_in_order() {
        let (_dir, registry) = registry();
        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["add_task", "read_tasks"]);

        let schemas = registry.get_tool_schemas();
        assert_eq!(schemas[0].parameters["required"], json!(["task"]));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported() {
        let (_dir, registry) = registry();
        let err = registry
            .execute("delete_everything", json!({}))
            .await
            .expect_err("should fail");
        assert_eq!(err.to_string(), "unknown tool: delete_everything");
    }

    #[tokio::test]
    async fn store_failures_use_task_operation_prefix() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where the file should be makes every operation fail.
        let store = TaskStore::new(dir.path());
        let registry = ToolRegistry::new(store);

        let err = registry
            .execute("read_tasks", json!({}))
            .await
            .expect_err("reading a directory should fail");
        assert!(err.to_string().starts_with("task operation failed: "));
    }
}
