use crate::config::types::{CrawlConfig, EngineConfig};
use crate::url::normalize_domain;
use crate::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

/// Dot-separated labels with an optional port suffix
static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9.\-]+(\.[a-z0-9.\-]+)+(:[0-9]{1,5})?$").expect("domain pattern")
});

/// Normalizes the crawl configuration in place and validates it
///
/// Zero budgets are replaced by their defaults and the domain is reduced to a
/// bare host before the shape check runs, so `https://www.example.com/feed`
/// validates as `www.example.com`.
pub fn normalize_and_validate(config: &mut CrawlConfig) -> Result<(), ConfigError> {
    config.apply_defaults();
    config.domain = normalize_domain(&config.domain);
    validate_domain(&config.domain)
}

/// Validates a normalized domain string
pub fn validate_domain(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidDomain(
            "domain cannot be empty".to_string(),
        ));
    }

    if !DOMAIN_PATTERN.is_match(domain) {
        return Err(ConfigError::InvalidDomain(domain.to_string()));
    }

    Ok(())
}

/// Validates fetch engine settings
pub fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.parallelism < 1 || config.parallelism > 64 {
        return Err(ConfigError::Validation(format!(
            "parallelism must be between 1 and 64, got {}",
            config.parallelism
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
