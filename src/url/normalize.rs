/// Adds a scheme to URLs scraped from comic pages
///
/// Comic markup is full of URLs that are not directly fetchable:
///
/// 1. `http://` and `https://` URLs are returned unchanged
/// 2. Protocol-relative URLs (`//host/path`) get an `http:` prefix
/// 3. Anything else is treated as schemeless (`host/path`) and gets `http://`
///
/// Leading and trailing whitespace is dropped first.
///
/// # Examples
///
/// ```
/// use comic_walker::url::normalize_url;
///
/// assert_eq!(normalize_url("//imgs.example.com/a.png"), "http://imgs.example.com/a.png");
/// assert_eq!(normalize_url("example.com/2"), "http://example.com/2");
/// assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
/// ```
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();

    if has_http_scheme(raw) {
        return raw.to_string();
    }

    if raw.starts_with("//") {
        return format!("http:{}", raw);
    }

    format!("http://{}", raw)
}

/// Returns true if the string starts with `http://` or `https://` (any case)
fn has_http_scheme(raw: &str) -> bool {
    let lower = raw
        .get(..8)
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| raw.to_ascii_lowercase());
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls_unchanged() {
        assert_eq!(normalize_url("http://example.com/1"), "http://example.com/1");
        assert_eq!(normalize_url("https://example.com/1"), "https://example.com/1");
        assert_eq!(normalize_url("HTTPS://Example.com/1"), "HTTPS://Example.com/1");
    }

    #[test]
    fn test_protocol_relative() {
        assert_eq!(
            normalize_url("//imgs.xkcd.com/comics/barrel_cropped_(1).jpg"),
            "http://imgs.xkcd.com/comics/barrel_cropped_(1).jpg"
        );
    }

    #[test]
    fn test_schemeless_gets_no_stray_colon() {
        let normalized = normalize_url("xkcd.com/1");
        assert_eq!(normalized, "http://xkcd.com/1");
        assert!(!normalized.contains("http://:"));
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(normalize_url("  example.com/3 \n"), "http://example.com/3");
    }

    #[test]
    fn test_short_strings() {
        assert_eq!(normalize_url("a.b"), "http://a.b");
        assert_eq!(normalize_url("http:/"), "http://http:/");
    }
}
