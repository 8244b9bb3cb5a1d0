//! HTML extraction helpers shared by the site adapters
//!
//! Most comic sites put the strip inside one container element and label
//! their navigation links either by text ("Next >") or by a `rel` attribute.
//! These helpers cover both layouts.

use scraper::{Html, Selector};
use url::Url;

/// Selector for the strip image inside the comic container
const COMIC_IMAGE_SELECTOR: &str = "#comic img";

/// Reads an attribute of the first image inside `#comic`
///
/// Returns None if there is no container, no image, or the attribute is
/// missing or blank.
pub fn comic_image_attr(document: &Html, attr: &str) -> Option<String> {
    let selector = Selector::parse(COMIC_IMAGE_SELECTOR).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|img| img.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Finds the `href` of the first anchor whose visible text equals `text`
///
/// Surrounding whitespace in the anchor text is ignored.
pub fn link_by_text<'a>(document: &'a Html, text: &str) -> Option<&'a str> {
    let selector = Selector::parse("a[href]").ok()?;

    document
        .select(&selector)
        .find(|element| element.text().collect::<String>().trim() == text)
        .and_then(|element| element.value().attr("href"))
}

/// Finds the `href` of the first anchor carrying `rel` among its link relations
pub fn link_by_rel<'a>(document: &'a Html, rel: &str) -> Option<&'a str> {
    let selector = Selector::parse(&format!(r#"a[rel~="{}"][href]"#, rel)).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
}

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should not be followed:
/// - empty or fragment-only hrefs (`#`, used by many sites on their newest page)
/// - javascript:, mailto:, tel: and data: links
/// - anything that does not resolve to HTTP(S)
pub fn resolve_href(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
