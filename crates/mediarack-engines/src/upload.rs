//! File-upload base helpers
//!
//! Shared behavior for engines that ingest uploaded files: deriving the
//! media kind and container from the filename extension and sanitizing
//! display names. Engines delegate their `parse` to [`parse_file_upload`]
//! and keep only backend-specific `store`/`delete` logic.

use mediarack_core::constants::MAX_DISPLAY_NAME_LEN;
use mediarack_core::models::MediaKind;

use crate::traits::ParseOutcome;
use crate::types::{FileMetadata, UploadSource};

pub const AUDIO_EXTENSIONS: &[&str] = &[
    "aac", "flac", "m4a", "mp3", "oga", "ogg", "opus", "wav", "wma",
];
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "3gp", "avi", "flv", "m4v", "mkv", "mov", "mp4", "mpg", "ogv", "webm", "wmv",
];
pub const CAPTIONS_EXTENSIONS: &[&str] = &["srt", "vtt"];

/// Map a lowercased filename extension to the media kind it carries.
pub fn kind_for_extension(ext: &str) -> Option<MediaKind> {
    if AUDIO_EXTENSIONS.contains(&ext) {
        Some(MediaKind::Audio)
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        Some(MediaKind::Video)
    } else if CAPTIONS_EXTENSIONS.contains(&ext) {
        Some(MediaKind::Captions)
    } else {
        None
    }
}

/// Sanitize a user-supplied filename into a display name safe to embed in
/// storage paths: basename only, no traversal sequences, conservative
/// character set, bounded length.
pub fn sanitize_display_name(filename: &str) -> String {
    let base = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "file".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX_DISPLAY_NAME_LEN)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        s
    }
}

/// Parse an uploaded file: kind and container from the extension, size from
/// the byte stream. Inputs without a file, or with an extension outside the
/// known tables, are rejected so later engines get their chance.
pub fn parse_file_upload(source: &UploadSource) -> ParseOutcome {
    let Some(file) = source.file() else {
        return ParseOutcome::Rejected;
    };
    let Some(ext) = file.extension() else {
        return ParseOutcome::Rejected;
    };
    let Some(kind) = kind_for_extension(&ext) else {
        return ParseOutcome::Rejected;
    };

    let mut meta = FileMetadata::new(kind);
    meta.container = Some(ext);
    meta.display_name = Some(sanitize_display_name(&file.filename));
    meta.size = Some(file.size());
    ParseOutcome::Accepted(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UploadedFile;

    fn source(filename: &str) -> UploadSource {
        UploadSource::new(
            Some(UploadedFile {
                filename: filename.to_string(),
                content_type: "application/octet-stream".to_string(),
                data: vec![0u8; 64],
            }),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_extension_table() {
        assert_eq!(kind_for_extension("mp3"), Some(MediaKind::Audio));
        assert_eq!(kind_for_extension("mp4"), Some(MediaKind::Video));
        assert_eq!(kind_for_extension("srt"), Some(MediaKind::Captions));
        assert_eq!(kind_for_extension("xyz"), None);
    }

    #[test]
    fn test_parse_accepts_known_extension() {
        match parse_file_upload(&source("Concert Night.mp3")) {
            ParseOutcome::Accepted(meta) => {
                assert_eq!(meta.kind, MediaKind::Audio);
                assert_eq!(meta.container.as_deref(), Some("mp3"));
                assert_eq!(meta.display_name.as_deref(), Some("Concert_Night.mp3"));
                assert_eq!(meta.size, Some(64));
            }
            ParseOutcome::Rejected => panic!("expected acceptance"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_extension() {
        assert!(matches!(
            parse_file_upload(&source("payload.xyz")),
            ParseOutcome::Rejected
        ));
    }

    #[test]
    fn test_parse_rejects_url_only_source() {
        let src = UploadSource::new(None, Some("https://example.com/a.mp4".to_string())).unwrap();
        assert!(matches!(parse_file_upload(&src), ParseOutcome::Rejected));
    }

    #[test]
    fn test_sanitize_strips_paths_and_traversal() {
        assert_eq!(sanitize_display_name("/tmp/up/track.mp3"), "track.mp3");
        assert_eq!(sanitize_display_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_display_name("a..b.mp3"), "file");
        assert_eq!(sanitize_display_name("???"), "file");
    }
}
