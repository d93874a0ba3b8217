use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Page budget applied when `max_pages` is left at zero
pub const DEFAULT_MAX_PAGES: u16 = 100;

/// Duration budget (seconds) applied when `max_duration` is left at zero
pub const DEFAULT_MAX_DURATION_SECS: u8 = 30;

/// Hop-count budget applied when `max_depth` is left at zero
pub const DEFAULT_MAX_DEPTH: u8 = 4;

/// Configuration file layout: a `[crawl]` table and an `[engine]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// What to crawl and the budgets bounding the crawl
///
/// Field names match the JSON accepted by the HTTP endpoint, so the same
/// struct deserializes a request body and the `[crawl]` table of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Target host, e.g. `www.example.com`
    pub domain: String,

    /// Maximum number of pages reserved for fetching (root included)
    pub max_pages: u16,

    /// Wall-clock budget in seconds; no link is admitted after it expires
    pub max_duration: u8,

    /// Maximum hop count from the root page
    pub max_depth: u8,

    /// Return full page records instead of a URL list over HTTP
    pub with_page_content: bool,

    /// Follow links found inside `<header>` and `<footer>` regions
    #[serde(rename = "keep_header_links", alias = "keep_header_footer_links")]
    pub keep_header_footer_links: bool,

    /// Scheme used for the root URL and for relative links
    pub scheme: Scheme,
}

impl CrawlConfig {
    /// Creates a configuration for `domain` with every budget at its default
    pub fn for_domain(domain: impl Into<String>) -> Self {
        let mut config = Self {
            domain: domain.into(),
            ..Self::default()
        };
        config.apply_defaults();
        config
    }

    /// Replaces zero-valued budgets with their defaults
    pub fn apply_defaults(&mut self) {
        if self.max_pages == 0 {
            self.max_pages = DEFAULT_MAX_PAGES;
        }
        if self.max_duration == 0 {
            self.max_duration = DEFAULT_MAX_DURATION_SECS;
        }
        if self.max_depth == 0 {
            self.max_depth = DEFAULT_MAX_DEPTH;
        }
    }

    /// The duration budget as a [`Duration`]
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.max_duration))
    }

    /// The crawl entry point, `<scheme>://<domain>`
    pub fn root_url(&self) -> String {
        format!("{}://{}", self.scheme, self.domain)
    }
}

/// URL scheme used when building crawl URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Https,
    Http,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Http => "http",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetch engine behavior, fixed for the duration of a crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    /// Maximum number of pages fetched and parsed concurrently
    pub parallelism: usize,

    /// Pause after each request while still holding its parallelism slot (milliseconds)
    pub politeness_delay_ms: u64,

    /// Whole-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Redirect hops followed before a fetch is abandoned
    pub max_redirects: usize,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl EngineConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            politeness_delay_ms: 100,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
            user_agent: format!("feedcast-crawler/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
