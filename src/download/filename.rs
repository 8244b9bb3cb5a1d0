use crate::state::PageRecord;
use crate::url::image_extension;
use std::path::{Path, PathBuf};

/// Longest title kept in a file name, in bytes
///
/// Leaves room for the page number and extension under the common
/// 255-byte file name limit.
const MAX_TITLE_BYTES: usize = 200;

/// Builds the file name for a page image: `NNNNNN__title.ext`
///
/// Path separators and NUL bytes in the title are replaced with `_` so the
/// name always stays a single path component. Long titles are cut to
/// `MAX_TITLE_BYTES` on a character boundary.
pub fn image_file_name(number: u32, title: &str, extension: &str) -> String {
    format!("{:06}__{}.{}", number, sanitize_title(title), extension)
}

/// Full target path for a page's image inside `comic_dir`
///
/// Returns None if the page has no image URL or the URL does not end in a
/// known image extension.
pub fn image_path(comic_dir: &Path, record: &PageRecord) -> Option<PathBuf> {
    let extension = image_extension(record.image_url.as_deref()?)?;
    Some(comic_dir.join(image_file_name(record.number, &record.title, extension)))
}

fn sanitize_title(title: &str) -> String {
    let mut sanitized: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();

    if sanitized.len() > MAX_TITLE_BYTES {
        let mut end = MAX_TITLE_BYTES;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized.truncate(end);
    }
    sanitized
}
