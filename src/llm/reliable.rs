use super::traits::Generator;
use crate::error::LlmError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const MAX_BACKOFF_MS: u64 = 10_000;

/// Retries transport failures of the wrapped generator with exponential
/// backoff. Schema problems are not its concern: any text that arrives is
/// returned as is.
pub struct ReliableGenerator {
    inner: Box<dyn Generator>,
    max_retries: u32,
    base_backoff_ms: u64,
}

impl ReliableGenerator {
    pub fn new(inner: Box<dyn Generator>, max_retries: u32, base_backoff_ms: u64) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff_ms: base_backoff_ms.max(50),
        }
    }
}

impl Generator for ReliableGenerator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        model: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(async move {
            let mut backoff_ms = self.base_backoff_ms;
            let mut attempt = 0;
            loop {
                match self.inner.generate(prompt, model).await {
                    Ok(text) => {
                        if attempt > 0 {
                            tracing::info!(
                                generator = self.inner.name(),
                                attempt,
                                "generator recovered after retries"
                            );
                        }
                        return Ok(text);
                    }
                    Err(e) if !e.is_retryable() || attempt >= self.max_retries => {
                        tracing::warn!(
                            generator = self.inner.name(),
                            attempts = attempt + 1,
                            error = %e,
                            "generation failed"
                        );
                        return Err(e);
                    }
                    Err(e) => {
                        attempt += 1;
                        tracing::warn!(
                            generator = self.inner.name(),
                            attempt,
                            max_retries = self.max_retries,
                            error = %e,
                            "generation call failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        backoff_ms = backoff_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
                    }
                }
            }
        })
    }
}
