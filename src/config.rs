//! Configuration management for Grimoire using the prefer crate.

use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Default backend location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default lifetime of a flash message in seconds.
pub const DEFAULT_FLASH_TTL_SECS: u64 = 5;

/// Client settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Backend base URL.
    pub base_url: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// How long a flash message stays visible, in seconds.
    pub flash_ttl_secs: u64,
    /// Characters of extracted text shown in the action card.
    pub preview_chars: usize,
    /// Search-as-you-type debounce delay in milliseconds.
    pub debounce_ms: u64,
    /// Default page size for connector searches.
    pub results_per_page: u32,
    /// chrono format string for dates in result cards.
    pub date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("Grimoire/{}", env!("CARGO_PKG_VERSION")),
            // Summarization runs an LLM server-side and can be slow.
            request_timeout: 300,
            flash_ttl_secs: DEFAULT_FLASH_TTL_SECS,
            preview_chars: 500,
            debounce_ms: 300,
            results_per_page: 20,
            date_format: "%-d/%-m/%Y".to_string(),
        }
    }
}

impl Settings {
    /// Create settings pointing at a specific backend.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn flash_ttl(&self) -> Duration {
        Duration::from_secs(self.flash_ttl_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub request_timeout: Option<u64>,
    #[serde(default)]
    pub flash_ttl_secs: Option<u64>,
    #[serde(default)]
    pub preview_chars: Option<usize>,
    #[serde(default)]
    pub debounce_ms: Option<u64>,
    #[serde(default)]
    pub results_per_page: Option<u32>,
    #[serde(default)]
    pub date_format: Option<String>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers grimoire config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("grimoire").await {
            Ok(pref_config) => {
                let base_url: Option<String> = pref_config.get("base_url").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let flash_ttl_secs: Option<u64> = pref_config.get("flash_ttl_secs").ok();
                let preview_chars: Option<usize> = pref_config.get("preview_chars").ok();
                let debounce_ms: Option<u64> = pref_config.get("debounce_ms").ok();
                let results_per_page: Option<u32> =
                    pref_config.get("results_per_page").ok();
                let date_format: Option<String> = pref_config.get("date_format").ok();

                Config {
                    base_url,
                    user_agent,
                    request_timeout,
                    flash_ttl_secs,
                    preview_chars,
                    debounce_ms,
                    results_per_page,
                    date_format,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                tracing::debug!("No grimoire config file found");
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref base_url) = self.base_url {
            let expanded = shellexpand::env(base_url)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| base_url.clone());
            settings.base_url = expanded.trim_end_matches('/').to_string();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ttl) = self.flash_ttl_secs {
            settings.flash_ttl_secs = ttl;
        }
        if let Some(chars) = self.preview_chars {
            settings.preview_chars = chars;
        }
        if let Some(ms) = self.debounce_ms {
            settings.debounce_ms = ms;
        }
        if let Some(per_page) = self.results_per_page.filter(|n| *n > 0) {
            settings.results_per_page = per_page;
        }
        if let Some(ref format) = self.date_format {
            if is_valid_date_format(format) {
                settings.date_format = format.clone();
            } else {
                tracing::warn!(
                    "Ignoring invalid date_format {:?}, using {:?}",
                    format,
                    settings.date_format
                );
            }
        }
    }
}

fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Load settings from configuration (async version).
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.flash_ttl(), Duration::from_secs(5));
        assert_eq!(settings.preview_chars, 500);
        assert_eq!(settings.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_apply_overrides_only_set_values() {
        let config = Config {
            base_url: Some("http://grimoire.local:8080/".to_string()),
            flash_ttl_secs: Some(10),
            results_per_page: Some(0),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);

        assert_eq!(settings.base_url, "http://grimoire.local:8080");
        assert_eq!(settings.flash_ttl_secs, 10);
        // Zero page size is ignored.
        assert_eq!(settings.results_per_page, 20);
        assert_eq!(settings.preview_chars, 500);
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let settings = Settings::with_base_url("http://example.com/");
        assert_eq!(settings.base_url, "http://example.com");
    }

    #[test]
    fn test_invalid_date_format_keeps_default() {
        let config = Config {
            date_format: Some("%Q".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);
        assert_eq!(settings.date_format, "%-d/%-m/%Y");

        let config = Config {
            date_format: Some("%Y-%m-%d".to_string()),
            ..Default::default()
        };
        config.apply_to_settings(&mut settings);
        assert_eq!(settings.date_format, "%Y-%m-%d");
    }
}
