use url::Url;

/// Extracts the lowercase host from a URL string
///
/// Returns None if the string does not parse or carries no host.
///
/// # Examples
///
/// ```
/// use sumi_trail::url::extract_host;
///
/// assert_eq!(extract_host("https://EXAMPLE.com/path"), Some("example.com".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_lowercase()))
}
