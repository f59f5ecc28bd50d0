//! Download file naming: `<prefix>_<last path segment>.<extension>`.

use pt_net::CandidateUrl;

/// Prefix expected by existing consumers of downloaded files.
pub const DEFAULT_FILE_PREFIX: &str = "OVO";

const FALLBACK_SEGMENT: &str = "download";

/// Extensions the platform maps differently from the first `mime_guess` entry.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    ("application/zip", "zip"),
    ("application/vnd.ms-excel", "xls"),
    ("audio/mpeg", "mp3"),
    ("image/jpeg", "jpg"),
    ("image/svg+xml", "svg"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/plain", "txt"),
    ("video/mp4", "mp4"),
];

/// Derives the on-disk name for a download. Unknown MIME types drop the extension.
pub fn derive_file_name(prefix: &str, url: &CandidateUrl, mime_type: &str) -> String {
    let segment = url
        .last_path_segment()
        .map(|segment| sanitize_segment(&segment))
        .unwrap_or_else(|| FALLBACK_SEGMENT.to_owned());

    match extension_for_mime(mime_type) {
        Some(extension) => format!("{prefix}_{segment}.{extension}"),
        None => format!("{prefix}_{segment}"),
    }
}

pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence.is_empty() {
        return None;
    }

    if let Some((_, extension)) = PREFERRED_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == essence)
    {
        return Some(*extension);
    }

    mime_guess::get_mime_extensions_str(&essence)?.first().copied()
}

fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();

    if cleaned.trim().is_empty() {
        FALLBACK_SEGMENT.to_owned()
    } else {
        cleaned
    }
}
