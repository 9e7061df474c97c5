use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Articles requested per category per page.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

/// Pages a single fetch epoch may load before pagination stops.
pub const DEFAULT_MAX_PAGE_LIMIT: u32 = 5;

/// Lifetime of a cached category result (5 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

/// Public NewsAPI endpoint.
pub const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org/v2";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Paging and caching parameters, fixed for the lifetime of an orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Page size passed to the content source.
    pub items_per_page: u32,
    /// Hard ceiling on pages per fetch epoch.
    pub max_page_limit: u32,
    /// Time-to-live of cache entries, in seconds.
    pub cache_ttl_secs: u64,
}

impl FetchConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Reject configurations that would make paging or caching meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.items_per_page == 0 {
            return Err(anyhow!("items_per_page must be > 0"));
        }
        if self.max_page_limit == 0 {
            return Err(anyhow!("max_page_limit must be > 0"));
        }
        if self.cache_ttl_secs == 0 {
            return Err(anyhow!("cache_ttl_secs must be > 0"));
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            max_page_limit: DEFAULT_MAX_PAGE_LIMIT,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// Connection settings for the NewsAPI-backed content source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NEWS_API_BASE_URL.to_string(),
            api_key: String::new(),
        }
    }
}

/// Log output settings for the host process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives applied when `RUST_LOG` is unset.
    pub filter: String,
    /// Colorize output. Hosts that capture stdout into a file turn this off.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            ansi: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FetchConfig::default();
        assert_eq!(config.items_per_page, 10);
        assert_eq!(config.max_page_limit, 5);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = FetchConfig {
            max_page_limit: 0,
            ..FetchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = FetchConfig {
            items_per_page: 0,
            ..FetchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.filter, DEFAULT_LOG_FILTER);
        assert!(config.ansi);
    }
}
