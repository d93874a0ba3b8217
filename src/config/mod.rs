//! Configuration module
//!
//! This module holds the crawl request value object, the fetch engine
//! settings, TOML file loading and domain validation.
//!
//! # Example
//!
//! ```no_run
//! use feedcast_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawl.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, EngineConfig, Scheme, DEFAULT_MAX_DEPTH, DEFAULT_MAX_DURATION_SECS,
    DEFAULT_MAX_PAGES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_crawl_request};

// Re-export validation functions
pub use validation::{normalize_and_validate, validate_domain, validate_engine_config};
