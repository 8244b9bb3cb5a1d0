/// Image extensions the downloader knows how to name
const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "tiff", "png"];

/// Extracts the image extension from the end of a URL
///
/// The match is case-insensitive but the extension is returned as written,
/// without the leading dot. Returns None when the URL does not end in one of
/// the known image extensions.
///
/// # Examples
///
/// ```
/// use comic_walker::url::image_extension;
///
/// assert_eq!(image_extension("//imgs.example.com/comic.PNG"), Some("PNG"));
/// assert_eq!(image_extension("https://example.com/comic.webp"), None);
/// ```
pub fn image_extension(url: &str) -> Option<&str> {
    let (stem, ext) = url.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }

    IMAGE_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
        .then_some(ext)
}
