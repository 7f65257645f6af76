//! LLM providers
//!
//! Generators talk to the model through [`LlmProvider`] so they can be driven
//! by a stub in tests.

use async_trait::async_trait;

use crate::Result;

pub mod gemini;

pub use gemini::GeminiClient;

/// A hosted text-generation model answering a single prompt
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send `prompt` as one user turn and return the model's text answer
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Name used in logs and upstream error messages
    fn provider_name(&self) -> &'static str;
}
