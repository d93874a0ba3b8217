/// Reduces a user-supplied domain to a bare, lowercase host
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace and lowercase
/// 2. Strip a leading `https://` or `http://`
/// 3. Drop everything from the first `/`, `?` or `#` (path, query, fragment)
///
/// An optional `:port` suffix is kept. The function is idempotent: feeding
/// its output back in returns the same string.
///
/// # Examples
///
/// ```
/// use feedcast_crawler::url::normalize_domain;
///
/// assert_eq!(normalize_domain("https://www.google.com/"), "www.google.com");
/// assert_eq!(normalize_domain("www.google.com/sitemap.xml"), "www.google.com");
/// ```
pub fn normalize_domain(input: &str) -> String {
    let lowered = input.trim().to_lowercase();

    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Strips the fragment and then the query string from a raw href
///
/// Surrounding whitespace, which HTML allows inside attribute values, is
/// trimmed first.
pub fn strip_fragment_and_query(href: &str) -> &str {
    let href = href.trim();
    let href = href.split('#').next().unwrap_or_default();
    href.split('?').next().unwrap_or_default()
}
