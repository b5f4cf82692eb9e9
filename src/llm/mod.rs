pub mod extract;
pub mod http_client;
pub mod ollama;
pub mod reliable;
pub mod traits;

pub use extract::{collect_generate_response, extract_json_object, parse_model_output};
pub use http_client::build_client;
pub use ollama::OllamaGenerator;
pub use reliable::ReliableGenerator;
pub use traits::Generator;

use crate::config::LlmConfig;

/// Ollama generator wrapped with transport retries from `config`.
pub fn create_generator(config: &LlmConfig) -> Box<dyn Generator> {
    let ollama = OllamaGenerator::new(config);
    Box::new(ReliableGenerator::new(
        Box::new(ollama),
        config.transport_retries,
        config.backoff_ms,
    ))
}
