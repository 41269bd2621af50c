use crate::UrlError;
use url::Url;

/// Parses a URL that the crawler is allowed to fetch
///
/// The value is trimmed, must use the `http` or `https` scheme and must carry
/// a host. No other normalization happens: the crawler identifies pages by
/// their exact URL string.
///
/// # Examples
///
/// ```
/// use linkwalker::url::parse_crawl_url;
///
/// assert!(parse_crawl_url("https://example.com").is_ok());
/// assert!(parse_crawl_url("mailto:someone@example.com").is_err());
/// ```
pub fn parse_crawl_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_http(&url) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns the trimmed value when it is already an absolute http(s) URL
///
/// Relative references return `None`; they are never traversal candidates.
pub fn absolute_http_url(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    parse_crawl_url(href).ok().map(|_| href.to_string())
}

/// Absolutizes `href` against `base`
///
/// Values that already are absolute http(s) URLs are returned unchanged.
/// Anything that resolves to another scheme (`data:`, `javascript:`,
/// `mailto:`) or fails to resolve yields `None`.
pub fn resolve_against(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if let Some(absolute) = absolute_http_url(href) {
        return Some(absolute);
    }

    match base.join(href) {
        Ok(resolved) if is_http(&resolved) => Some(resolved.to_string()),
        _ => None,
    }
}

fn is_http(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/dir/page.html").unwrap()
    }

    #[test]
    fn test_parse_crawl_url_keeps_exact_form() {
        let url = parse_crawl_url("  https://example.com/a?b=1  ").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.query(), Some("b=1"));
    }

    #[test]
    fn test_parse_crawl_url_rejects_scheme() {
        assert!(matches!(
            parse_crawl_url("ftp://example.com/file"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_parse_crawl_url_rejects_garbage() {
        assert!(matches!(
            parse_crawl_url("not a url"),
            Err(UrlError::Parse(_))
        ));
        assert!(parse_crawl_url("").is_err());
    }

    #[test]
    fn test_absolute_http_url() {
        assert_eq!(
            absolute_http_url(" https://other.com/x "),
            Some("https://other.com/x".to_string())
        );
        assert_eq!(absolute_http_url("/relative"), None);
        assert_eq!(absolute_http_url("page.html"), None);
        assert_eq!(absolute_http_url("javascript:void(0)"), None);
        assert_eq!(absolute_http_url(""), None);
    }

    #[test]
    fn test_resolve_root_relative() {
        assert_eq!(
            resolve_against("/a.png", &base()),
            Some("https://example.com/a.png".to_string())
        );
    }

    #[test]
    fn test_resolve_path_relative() {
        assert_eq!(
            resolve_against("img/b.png", &base()),
            Some("https://example.com/dir/img/b.png".to_string())
        );
    }

    #[test]
    fn test_resolve_protocol_relative() {
        assert_eq!(
            resolve_against("//cdn.example.net/c.png", &base()),
            Some("https://cdn.example.net/c.png".to_string())
        );
    }

    #[test]
    fn test_resolve_absolute_unchanged() {
        assert_eq!(
            resolve_against("http://other.com/d.png", &base()),
            Some("http://other.com/d.png".to_string())
        );
    }

    #[test]
    fn test_resolve_rejects_other_schemes() {
        assert_eq!(resolve_against("data:image/png;base64,AAAA", &base()), None);
        assert_eq!(resolve_against("javascript:alert(1)", &base()), None);
        assert_eq!(resolve_against("   ", &base()), None);
    }
}
