//! Task list tools backed by the flat-file store.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolError};
use crate::store::TaskStore;

/// Returned by `read_tasks` when the list is empty or the file is absent.
pub const NO_TASKS_MESSAGE: &str = "No tasks yet.";

const EMPTY_TASK_MESSAGE: &str = "Cannot add an empty task.";

/// Append a task to the list.
pub struct AddTask {
    store: TaskStore,
}

impl AddTask {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for AddTask {
    fn name(&self) -> &str {
        "add_task"
    }

    fn description(&self) -> &str {
        "Used to add a task to the user's task list. Call once per task with the task text as a single line."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "The task to add, as a short single line of text"
                }
            },
            "required": ["task"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let raw = args["task"].as_str().ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'task' argument: expected a string".to_string())
        })?;

        let task = single_line(raw);
        if task.is_empty() {
            return Err(ToolError::InvalidArguments(EMPTY_TASK_MESSAGE.to_string()));
        }

        self.store.append(&task).await?;
        Ok(format!("Added task: {}", task))
    }
}

/// Read the whole task list.
pub struct ReadTasks {
    store: TaskStore,
}

impl ReadTasks {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ReadTasks {
    fn name(&self) -> &str {
        "read_tasks"
    }

    fn description(&self) -> &str {
        "Used to retrieve the entire existing task list, one task per line."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: Value) -> Result<String, ToolError> {
        let content = self.store.read_all().await?;
        if content.trim().is_empty() {
            Ok(NO_TASKS_MESSAGE.to_string())
        } else {
            Ok(content)
        }
    }
}

/// Trim and join any line breaks with single spaces.
fn single_line(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
