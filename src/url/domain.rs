use url::Url;

/// Builds the robots-cache key for a URL: lowercase host plus explicit port
///
/// Two URLs share a robots policy only when they share scheme authority, so
/// `example.com` and `example.com:8080` are kept apart.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkwalker::url::host_key;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Derives the robots.txt location for the host serving `url`
///
/// Keeps scheme, host and port; drops path, query and fragment.
pub fn robots_url(url: &Url) -> Option<Url> {
    url.host_str()?;
    url.join("/robots.txt").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_key_simple() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(host_key(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_host_key_keeps_subdomain() {
        let url = Url::parse("https://blog.example.com/post").unwrap();
        assert_eq!(host_key(&url), Some("blog.example.com".to_string()));
    }

    #[test]
    fn test_host_key_with_port() {
        let url = Url::parse("https://example.com:8443/").unwrap();
        assert_eq!(host_key(&url), Some("example.com:8443".to_string()));
    }

    #[test]
    fn test_host_key_default_port_omitted() {
        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(host_key(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_robots_url_drops_path_and_query() {
        let url = Url::parse("https://example.com/a/b?c=d#e").unwrap();
        assert_eq!(
            robots_url(&url).unwrap().as_str(),
            "https://example.com/robots.txt"
        );
    }

    #[test]
    fn test_robots_url_keeps_scheme_and_port() {
        let url = Url::parse("http://127.0.0.1:4321/page").unwrap();
        assert_eq!(
            robots_url(&url).unwrap().as_str(),
            "http://127.0.0.1:4321/robots.txt"
        );
    }

    #[test]
    fn test_robots_url_requires_host() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert!(robots_url(&url).is_none());
    }
}
