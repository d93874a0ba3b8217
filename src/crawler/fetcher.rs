//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client from the engine settings
//! - The preflight reachability check run before a crawl starts
//! - GET requests for page content, classified into a [`FetchResult`]

use crate::config::EngineConfig;
use crate::ConfigError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, redirect limit, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch engine settings (user agent, timeouts, redirects)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use feedcast_crawler::config::EngineConfig;
/// use feedcast_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&EngineConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &EngineConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Checks that the crawl root answers before any crawling starts
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `domain` - The normalized domain, used in error messages
/// * `root_url` - The crawl entry point
///
/// # Returns
///
/// * `Ok(())` - The root answered with a status below 400
/// * `Err(ConfigError::Unreachable)` - The request itself failed
/// * `Err(ConfigError::HttpStatus)` - The root answered with status >= 400
pub async fn preflight(client: &Client, domain: &str, root_url: &str) -> Result<(), ConfigError> {
    let response = client
        .get(root_url)
        .send()
        .await
        .map_err(|e| ConfigError::Unreachable {
            domain: domain.to_string(),
            reason: classify_error(&e),
        })?;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(ConfigError::HttpStatus {
            domain: domain.to_string(),
            status: status.as_u16(),
        });
    }

    tracing::debug!("Preflight of {} answered {}", root_url, status);
    Ok(())
}

/// Fetches a URL and classifies the outcome
///
/// Transient failures are not retried.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: classify_error(&e),
            }
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    // Check Content-Type
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.to_ascii_lowercase().contains("html") {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else {
        error.to_string()
    }
}
