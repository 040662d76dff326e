//! Companion text generation for venti.
//!
//! [`LlmClient`] talks to an OpenAI-compatible chat-completions API and backs
//! the server-side functions; [`FunctionsClient`] calls those functions from
//! the client side. Both implement `venti_core::Companion`.

pub mod ai_types;
mod client;
mod companion;
mod error;
pub mod functions;
mod prompts;
#[cfg(test)]
mod tests;

pub use client::{DEFAULT_MODEL, LlmClient, strip_markdown_json, truncate};
pub use error::LlmError;
pub use functions::FunctionsClient;
