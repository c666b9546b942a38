use crate::UrlError;
use url::Url;

/// Returns true if `href` starts with `http://` or `https://` (any case)
pub fn is_absolute_http(href: &str) -> bool {
    let bytes = href.as_bytes();
    let has_prefix = |prefix: &[u8]| {
        bytes
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    has_prefix(b"http://") || has_prefix(b"https://")
}

/// Turns a raw anchor reference into an absolute http(s) URL
///
/// # Rules
///
/// 1. Empty references and fragment-only references (`#...`) are rejected
/// 2. References that are already absolute http(s) URLs are returned unchanged
/// 3. Everything else is resolved against `current_page_url`
/// 4. The resolved URL must use the `http` or `https` scheme, which rejects
///    `mailto:`, `javascript:`, `tel:` and friends
///
/// The function is pure; callers build their page-local dedup set on top of it.
///
/// # Examples
///
/// ```
/// use sumi_trail::url::normalize_link;
///
/// assert_eq!(normalize_link("/y", "http://a.com/x").unwrap(), "http://a.com/y");
/// assert!(normalize_link("#section", "http://a.com/x").is_err());
/// ```
pub fn normalize_link(raw_href: &str, current_page_url: &str) -> Result<String, UrlError> {
    let href = raw_href.trim();

    if href.is_empty() {
        return Err(UrlError::Empty);
    }

    if href.starts_with('#') {
        return Err(UrlError::FragmentOnly(href.to_string()));
    }

    if is_absolute_http(href) {
        // Must still be a URL we could fetch
        Url::parse(href).map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;
        return Ok(href.to_string());
    }

    let base = Url::parse(current_page_url)
        .map_err(|e| UrlError::Parse(format!("{}: {}", current_page_url, e)))?;
    let resolved = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    ensure_http_scheme(&resolved)?;

    Ok(resolved.into())
}

/// Validates a seed URL: well-formed, absolute, http(s), with a host
pub fn validate_seed(seed: &str) -> Result<Url, UrlError> {
    let seed = seed.trim();

    if !is_absolute_http(seed) {
        return Err(UrlError::InvalidScheme(format!(
            "seed must start with http:// or https://, got '{}'",
            seed
        )));
    }

    let url = Url::parse(seed).map_err(|e| UrlError::Parse(e.to_string()))?;
    ensure_http_scheme(&url)?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

fn ensure_http_scheme(url: &Url) -> Result<(), UrlError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            other
        ))),
    }
}
