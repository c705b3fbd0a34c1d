//! Filename generation and manipulation.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{Error, Result};

/// Name used when nothing better can be derived from a locator.
pub const FALLBACK_NAME: &str = "download";

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path traversal patterns.
pub fn sanitize_filename(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Turn an untrusted name into something safe to create inside a directory.
///
/// Unlike [`sanitize_filename`] this never fails: separators and traversal
/// sequences are replaced and an unusable result falls back to [`FALLBACK_NAME`].
pub fn coerce_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let replaced = replaced.replace("..", "_");
    let trimmed = replaced.trim().trim_matches('.');

    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Suggest a staging file name for a locator: the last URL path segment,
/// percent-decoded, or [`FALLBACK_NAME`].
pub fn suggested_name(locator: &str) -> String {
    let segment = Url::parse(locator.trim()).ok().and_then(|url| {
        url.path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
    });

    match segment {
        Some(segment) if !segment.is_empty() => {
            let decoded = percent_decode_str(&segment).decode_utf8_lossy();
            coerce_filename(&decoded)
        }
        _ => FALLBACK_NAME.to_string(),
    }
}

/// Lower-cased extension of a file name, if any.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

/// Generate a unique filename by appending a number if the file exists.
pub fn make_unique_filename(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parent = path.parent().unwrap_or(Path::new("."));

    let mut counter = 1;
    loop {
        let new_name = if ext.is_empty() {
            format!("{} ({})", stem, counter)
        } else {
            format!("{} ({}).{}", stem, counter, ext)
        };

        let new_path = parent.join(&new_name);
        if !new_path.exists() {
            return new_path;
        }

        counter += 1;
        if counter > 1000 {
            return new_path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_valid() {
        assert_eq!(sanitize_filename("normal.txt").unwrap(), "normal.txt");
        assert_eq!(sanitize_filename("file:name.txt").unwrap(), "file_name.txt");
    }

    #[test]
    fn test_sanitize_filename_rejects() {
        assert!(sanitize_filename("../etc/passwd").is_err());
        assert!(sanitize_filename("path/to/file.txt").is_err());
        assert!(sanitize_filename("file\0name.txt").is_err());
        assert!(sanitize_filename("   ").is_err());
    }

    #[test]
    fn test_coerce_filename() {
        assert_eq!(coerce_filename("video.mp4"), "video.mp4");
        assert_eq!(coerce_filename("../../etc/passwd"), "____etc_passwd");
        assert_eq!(coerce_filename("..."), "_");
        assert_eq!(coerce_filename(""), FALLBACK_NAME);
        assert_eq!(coerce_filename(" . "), FALLBACK_NAME);
    }

    #[test]
    fn test_suggested_name() {
        assert_eq!(suggested_name("https://example.com/media/video.mp4"), "video.mp4");
        assert_eq!(suggested_name("https://example.com/video123"), "video123");
        assert_eq!(
            suggested_name("https://example.com/a/my%20clip.mp3?x=1"),
            "my clip.mp3"
        );
        assert_eq!(
            suggested_name("https://example.com/caf%C3%A9.mp3"),
            "café.mp3"
        );
        assert_eq!(suggested_name("https://example.com/100%25%zz"), "100%%zz");
        assert_eq!(suggested_name("https://example.com/a%2Fb.txt"), "a_b.txt");
        assert_eq!(suggested_name("https://example.com/"), FALLBACK_NAME);
        assert_eq!(suggested_name("not a url"), FALLBACK_NAME);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("video.MP4").as_deref(), Some("mp4"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("README"), None);
    }

    #[test]
    fn test_make_unique_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        assert_eq!(make_unique_filename(&path), path);

        std::fs::write(&path, b"x").unwrap();
        assert_eq!(make_unique_filename(&path), dir.path().join("clip (1).mp4"));
    }
}
