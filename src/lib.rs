//! # Task List Agent
//!
//! A conversational task-list assistant backed by a hosted LLM.
//!
//! This library provides:
//! - A flat-file task store and two tools over it (`add_task`, `read_tasks`)
//! - A tool-calling agent loop with bounded iterations
//! - Per-session conversation history
//! - A terminal front end and a web front end (chat with or without a task panel)
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Assemble system prompt, prior turns, and the new user message
//! 2. Call the LLM with the tool manifest
//! 3. Execute any requested tool calls and feed the results back
//! 4. Repeat until the LLM answers or the iteration cap is reached
//!
//! ## Example
//!
//! ```rust,ignore
//! use tasklist_agent::{agent::Agent, config::Config, history::SessionHistory};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::from_config(&config)?;
//! let history = SessionHistory::new(config.history_limit);
//! let outcome = agent.run_turn("Add a task: buy milk", &history).await?;
//! println!("{}", outcome.answer);
//! ```

pub mod agent;
pub mod api;
pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod store;
pub mod tools;

pub use config::Config;
