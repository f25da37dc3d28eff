// runtime configuration, loaded from env after shuttle secrets are copied in

use shuttle_runtime::SecretStore;
use tracing::{info, warn};

const DEFAULT_PRIMARY_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_FALLBACK_MODEL: &str = "gemini-pro";
const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 30;

const SECRET_KEYS: [&str; 4] = [
    "GEMINI_API_KEY",
    "GEMINI_PRIMARY_MODEL",
    "GEMINI_FALLBACK_MODEL",
    "FETCH_TIMEOUT_SECONDS",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,
    pub fetch_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            gemini_api_key: None,
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            fetch_timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECONDS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = AppConfig::default();

        AppConfig {
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            primary_model: non_empty("GEMINI_PRIMARY_MODEL").unwrap_or(defaults.primary_model),
            fallback_model: non_empty("GEMINI_FALLBACK_MODEL").unwrap_or(defaults.fallback_model),
            fetch_timeout_seconds: non_empty("FETCH_TIMEOUT_SECONDS")
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.fetch_timeout_seconds),
        }
    }

    pub fn summaries_enabled(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

// load secrets into env vars
pub fn configure_secrets(secret_store: &SecretStore) {
    for key in SECRET_KEYS {
        if let Some(value) = secret_store.get(key) {
            std::env::set_var(key, value);
            info!("{} configured from secrets", key);
        }
    }
}

// plans and subjects work without gemini, only summaries need it
pub fn report_configuration(config: &AppConfig) {
    if config.summaries_enabled() {
        info!(
            "AI summaries enabled (primary: {}, fallback: {})",
            config.primary_model, config.fallback_model
        );
    } else {
        warn!("GEMINI_API_KEY not found in secrets - /api/summarize will be unavailable");
    }
    info!(
        "Material fetch timeout set to {}s",
        config.fetch_timeout_seconds
    );
}
