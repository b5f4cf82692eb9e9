use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_base_url() -> String {
    "https://www.ebi.ac.uk/europepmc/webservices/rest".into()
}

fn default_max_publications() -> usize {
    1
}

fn default_max_full_text_chars() -> usize {
    4000
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub europe_pmc: EuropePmcConfig,
}

/// Publication abstract / full-text lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EuropePmcConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_enabled")]
    pub include_full_text: bool,

    /// Publication identifiers looked up per candidate.
    #[serde(default = "default_max_publications")]
    pub max_publications: usize,

    #[serde(default = "default_max_full_text_chars")]
    pub max_full_text_chars: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EuropePmcConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
            include_full_text: default_enabled(),
            max_publications: default_max_publications(),
            max_full_text_chars: default_max_full_text_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EnrichmentConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let pmc = &self.europe_pmc;
        if pmc.enabled {
            if pmc.timeout_secs == 0 {
                errors.push("enrichment.europe_pmc.timeout_secs must be > 0".to_string());
            }
            if url::Url::parse(&pmc.base_url).is_err() {
                errors.push(format!(
                    "enrichment.europe_pmc.base_url is not a valid URL: {}",
                    pmc.base_url
                ));
            }
        }
        errors
    }
}
