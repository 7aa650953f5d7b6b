//! The reasoning-oracle collaborator.
//!
//! Builds a textual prompt from the cycle's snapshot, sends it to an
//! OpenAI-compatible chat-completions endpoint with a bounded timeout,
//! and parses the structured decision block out of the response text.
//! The core only ever sees the resulting [`Signal`](sage_core::types::Signal)
//! or a failure.

mod client;
mod parser;
mod prompt;

pub use client::{ChatOracle, FallbackSettings, OracleSettings};
pub use parser::{parse_signal, strip_think_blocks};
pub use prompt::PromptBuilder;
