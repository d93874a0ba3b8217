//! Feedcast crawler: a bounded, same-origin content snapshotter
//!
//! This crate crawls a single web domain from its root, follows same-domain
//! links within a depth, page-count and wall-clock budget, and streams a
//! summary (title, meta description, meta keywords, sanitized body text) for
//! every page it reaches.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sanitize;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid domain: '{0}'")]
    InvalidDomain(String),

    #[error("Domain {domain} is unreachable: {reason}")]
    Unreachable { domain: String, reason: String },

    #[error("Domain {domain} answered with http status code: {status}")]
    HttpStatus { domain: String, status: u16 },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig, EngineConfig, Scheme};
pub use crawler::{crawl, Crawler, PageStream};
pub use state::{CrawlPhase, PageRecord};
pub use self::url::{normalize_domain, LinkScope};
