use crate::config::Scheme;
use url::Url;

/// The set of hosts a crawl may visit
///
/// The allow-list holds the configured domain and, unless the domain already
/// starts with `www.`, its `www.`-prefixed variant. Protocol-relative,
/// scheme-less and other-subdomain links fall outside the scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkScope {
    scheme: Scheme,
    domain: String,
    allowed_hosts: Vec<String>,
}

impl LinkScope {
    /// Builds the scope for a normalized domain
    pub fn new(scheme: Scheme, domain: &str) -> Self {
        let domain = domain.to_lowercase();
        let mut allowed_hosts = vec![domain.clone()];

        if !domain.starts_with("www.") {
            allowed_hosts.push(format!("www.{}", domain));
        }

        Self {
            scheme,
            domain,
            allowed_hosts,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    /// The crawl root, `<scheme>://<domain>/`
    pub fn root_url(&self) -> Option<Url> {
        Url::parse(&format!("{}://{}", self.scheme, self.domain)).ok()
    }

    /// Turns an href (already stripped of fragment and query) into an
    /// absolute in-scope URL
    ///
    /// Root-relative hrefs are prefixed with `<scheme>://<domain>`; absolute
    /// hrefs must start with `<scheme>://<allowed host>` and parse to exactly
    /// that host. Returns `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use feedcast_crawler::config::Scheme;
    /// use feedcast_crawler::url::LinkScope;
    ///
    /// let scope = LinkScope::new(Scheme::Https, "example.com");
    /// let url = scope.canonicalize("/about").unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/about");
    /// assert!(scope.canonicalize("https://other.com/x").is_none());
    /// ```
    pub fn canonicalize(&self, href: &str) -> Option<Url> {
        let candidate = if href.starts_with("//") {
            return None;
        } else if href.starts_with('/') {
            format!("{}://{}{}", self.scheme, self.domain, href)
        } else if self.has_allowed_prefix(href) {
            href.to_string()
        } else {
            return None;
        };

        let url = Url::parse(&candidate).ok()?;

        if self.is_allowed_authority(&url) {
            Some(url)
        } else {
            None
        }
    }

    fn has_allowed_prefix(&self, href: &str) -> bool {
        self.allowed_hosts
            .iter()
            .any(|host| href.starts_with(&format!("{}://{}", self.scheme, host)))
    }

    /// Host and explicit port must match an allowed host exactly, so that
    /// `https://example.com.evil.org/` does not pass the prefix check
    fn is_allowed_authority(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        self.allowed_hosts.iter().any(|allowed| *allowed == authority)
    }
}
