//! Line-based terminal front end.
//!
//! Reads one line per turn after a `You: ` prompt, prints the assistant's
//! answer, and keeps the session history for the lifetime of the process.
//! A line that is exactly `exit` (any case) or end of input stops the loop;
//! `" exit "` with surrounding spaces is an ordinary message.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::agent::{Agent, SessionPhase};
use crate::history::SessionHistory;

pub const PROMPT: &str = "You: ";
pub const EXIT_COMMAND: &str = "exit";

/// Run the interactive loop until `exit` or end of input.
///
/// Turn failures are printed and the loop continues; only I/O errors on the
/// terminal itself end it early.
pub async fn run_terminal<R, W>(
    agent: &Agent,
    history: &mut SessionHistory,
    input: R,
    mut output: W,
) -> std::io::Result<SessionPhase>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };
        if line.eq_ignore_ascii_case(EXIT_COMMAND) {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match agent.run_turn(line, history).await {
            Ok(outcome) => {
                output.write_all(outcome.answer.as_bytes()).await?;
                output.write_all(b"\n").await?;
                history.append_turn(line, outcome.answer);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Turn failed");
                output
                    .write_all(format!("Sorry, something went wrong: {}\n", e).as_bytes())
                    .await?;
            }
        }
        output.flush().await?;
    }

    output.flush().await?;
    tracing::debug!(turns = history.len(), "Terminal session finished");
    Ok(SessionPhase::Exit)
}
