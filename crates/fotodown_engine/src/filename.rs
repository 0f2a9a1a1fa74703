use std::path::Path;

/// Length of the content hash and extension the site appends to preview basenames.
pub const PREVIEW_SUFFIX_LEN: usize = 41;

/// Strip the fixed-length suffix from a preview basename.
///
/// Returns `None` when the basename is not longer than the suffix, since
/// nothing of the original name would remain.
pub fn recover_base_name(raw: &str) -> Option<&str> {
    if raw.len() <= PREVIEW_SUFFIX_LEN {
        return None;
    }
    let end = raw.len() - PREVIEW_SUFFIX_LEN;
    if !raw.is_char_boundary(end) {
        return None;
    }
    Some(&raw[..end])
}

/// `{counter:04}-{base}.jpg`
pub fn photo_filename(counter: usize, base: &str) -> String {
    format!("{counter:04}-{base}.jpg")
}

/// Base name used when the suffix cannot be stripped: the raw name minus its extension.
pub(crate) fn fallback_base_name(raw: &str) -> &str {
    Path::new(raw)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(raw)
}
