use super::extract::collect_generate_response;
use super::http_client::build_client;
use super::traits::Generator;
use crate::config::LlmConfig;
use crate::error::LlmError;
use reqwest::Client;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Local Ollama server, `/api/generate` endpoint.
pub struct OllamaGenerator {
    base_url: String,
    client: Client,
    temperature: f64,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f64,
    top_p: f64,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            base_url: config.host.trim_end_matches('/').to_string(),
            client: build_client(config.timeout_secs),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        }
    }

    fn build_request<'a>(&self, prompt: &'a str, model: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model,
            prompt,
            stream: false,
            format: "json",
            options: Options {
                temperature: self.temperature,
                top_p: 1.0,
            },
        }
    }

    async fn call_api(&self, prompt: &str, model: &str) -> Result<String, LlmError> {
        let request = self.build_request(prompt, model);
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(&e))?;
        if !status.is_success() {
            let message: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(LlmError::Status {
                generator: self.name().to_string(),
                status: status.as_u16(),
                message: format!("{message}. Is Ollama running and is the model pulled?"),
            });
        }

        let text = collect_generate_response(&body);
        tracing::debug!(
            target: "biotools_curator::llm",
            model,
            prompt,
            response = %text,
            "ollama exchange"
        );
        Ok(text)
    }

    fn transport_error(&self, err: &reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                generator: self.name().to_string(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            LlmError::Request {
                generator: self.name().to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl Generator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        model: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.call_api(prompt, model))
    }
}
