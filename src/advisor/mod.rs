//! Advisor Module
//!
//! Natural-language recommendations over the monitor data, backed by an
//! OpenAI-compatible chat completions endpoint.

mod provider;
mod recommend;

pub use provider::{ChatMessage, CompletionProvider, CompletionRequest, OpenAiCompatProvider};
pub use recommend::{Advisor, UNAVAILABLE_REPLY};
