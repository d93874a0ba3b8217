use crate::config::types::{Config, CrawlConfig};
use crate::config::validation::validate_engine_config;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Only the `[engine]` table is validated here. The `[crawl]` table is a
/// template that CLI flags may still override, so its domain is normalized
/// and checked when the crawl starts.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use feedcast_crawler::config::load_config;
///
/// let config = load_config(Path::new("crawler.toml")).unwrap();
/// println!("Parallelism: {}", config.engine.parallelism);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;

    validate_engine_config(&config.engine)?;

    Ok(config)
}

/// Parses a crawl request from a JSON document
///
/// Used by the HTTP endpoint; missing fields take their zero value and are
/// later replaced by defaults.
pub fn parse_crawl_request(body: &[u8]) -> Result<CrawlConfig, ConfigError> {
    Ok(serde_json::from_slice(body)?)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be matched to the configuration they used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
