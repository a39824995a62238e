//! Agent module - the tool-calling conversation loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build context with system prompt, session history, and user input
//! 2. Call LLM with available tools
//! 3. If LLM requests tool call, execute it and feed result back
//! 4. Repeat until LLM produces final response or max iterations reached

mod agent_loop;
mod prompt;

pub use agent_loop::{
    Agent, AgentError, LogEntryType, SessionPhase, TurnLogEntry, TurnOutcome,
};
pub use prompt::{assemble_messages, build_system_prompt};
