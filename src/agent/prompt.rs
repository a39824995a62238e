//! System prompt and per-turn message assembly.

use crate::history::SessionHistory;
use crate::llm::ChatMessage;
use crate::tools::ToolRegistry;

const INSTRUCTIONS: &str = "You are a helpful assistant.
You will help the user update their task list if the user asks you to.
You will also tell them their tasks as a bulleted list if they ask for it.
Your primary task is to be a task list maintainer.";

/// Build the system prompt with tool descriptions.
pub fn build_system_prompt(tools: &ToolRegistry) -> String {
    let tool_descriptions = tools
        .list_tools()
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{INSTRUCTIONS}

## Tools

{tool_descriptions}

Add each task with its own add_task call. Read the list with read_tasks before answering questions about it; never guess what is on it."#
    )
}

/// Messages for one turn: system, prior turns, then the new user message.
///
/// The agent loop appends tool calls and tool results after these.
pub fn assemble_messages(system: &str, history: &SessionHistory, input: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.to_prompt_messages());
    messages.push(ChatMessage::user(input));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::store::TaskStore;

    #[test]
    fn system_prompt_lists_tools() {
        let tools = ToolRegistry::new(TaskStore::new("unused.txt"));
        let prompt = build_system_prompt(&tools);
        assert!(prompt.starts_with("You are a helpful assistant."));
        assert!(prompt.contains("- **add_task**:"));
        assert!(prompt.contains("- **read_tasks**:"));
    }

    #[test]
    fn history_sits_between_system_and_new_input() {
        let mut history = SessionHistory::new(10);
        for n in 0..3 {
            history.append_turn(format!("question {}", n), format!("answer {}", n));
        }

        let messages = assemble_messages("sys", &history, "what now?");
        assert_eq!(messages.len(), 1 + 3 * 2 + 1);
        assert_eq!(messages[0], ChatMessage::system("sys"));
        for n in 0..3 {
            assert_eq!(messages[1 + n * 2].role, Role::User);
            assert_eq!(messages[1 + n * 2].content, Some(format!("question {}", n)));
            assert_eq!(messages[2 + n * 2].role, Role::Assistant);
            assert_eq!(messages[2 + n * 2].content, Some(format!("answer {}", n)));
        }
        assert_eq!(messages.last(), Some(&ChatMessage::user("what now?")));
    }

    #[test]
    fn empty_history_yields_system_and_user_only() {
        let messages = assemble_messages("sys", &SessionHistory::new(5), "hi");
        assert_eq!(messages, vec![ChatMessage::system("sys"), ChatMessage::user("hi")]);
    }
}
