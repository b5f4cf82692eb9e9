use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("BIOTOOLS_CURATOR_MODEL")
            && !model.is_empty()
        {
            self.llm.model = model;
        }

        if let Ok(host) =
            std::env::var("BIOTOOLS_CURATOR_LLM_HOST").or_else(|_| std::env::var("OLLAMA_HOST"))
            && !host.is_empty()
        {
            self.llm.host = host;
        }

        if let Ok(raw) = std::env::var("BIOTOOLS_CURATOR_CONCURRENCY")
            && let Ok(concurrency) = raw.parse::<usize>()
        {
            self.pipeline.concurrency = concurrency;
        }

        if let Ok(raw) = std::env::var("BIOTOOLS_CURATOR_TIMEOUT_SECS")
            && let Ok(timeout) = raw.parse::<u64>()
            && timeout > 0
        {
            self.crawl.timeout_secs = timeout;
        }

        if let Ok(dir) = std::env::var("BIOTOOLS_CURATOR_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.pipeline.output_dir = dir;
        }
    }
}
