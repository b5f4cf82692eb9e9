use crate::error::LlmError;
use std::future::Future;
use std::pin::Pin;

/// Text-completion backend. Output is untrusted: it may be malformed,
/// partial, or wrapped in prose.
pub trait Generator: Send + Sync {
    /// Backend identifier (e.g. "ollama").
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        model: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}
