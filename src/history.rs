//! In-memory conversation history for one session.

use std::collections::VecDeque;

use serde::Serialize;

use crate::llm::ChatMessage;

/// One completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

/// Ordered turns, oldest first, capped at `capacity` turns.
///
/// When full, appending evicts the oldest turn.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl SessionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn append_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(Turn {
            user: user.into(),
            assistant: assistant.into(),
        });
    }

    /// Alternating user/assistant messages in chronological order.
    pub fn to_prompt_messages(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .flat_map(|turn| {
                [
                    ChatMessage::user(turn.user.clone()),
                    ChatMessage::assistant(turn.assistant.clone()),
                ]
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn prompt_messages_alternate_in_order() {
        let mut history = SessionHistory::new(10);
        history.append_turn("add buy milk", "Added buy milk.");
        history.append_turn("show tasks", "- buy milk");

        let messages = history.to_prompt_messages();
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(messages[0].content.as_deref(), Some("add buy milk"));
        assert_eq!(messages[3].content.as_deref(), Some("- buy milk"));
    }

    #[test]
    fn capacity_evicts_oldest_turns() {
        let mut history = SessionHistory::new(2);
        history.append_turn("one", "1");
        history.append_turn("two", "2");
        history.append_turn("three", "3");

        let users: Vec<&str> = history.turns().map(|t| t.user.as_str()).collect();
        assert_eq!(users, vec!["two", "three"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = SessionHistory::new(0);
        history.append_turn("hello", "hi");
        assert!(history.is_empty());
        assert!(history.to_prompt_messages().is_empty());
    }

    #[test]
    fn clear_empties_history() {
        let mut history = SessionHistory::new(5);
        history.append_turn("hello", "hi");
        history.clear();
        assert!(history.is_empty());
        assert!(history.to_prompt_messages().is_empty());
    }
}
