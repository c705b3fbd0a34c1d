//! Publish target derivation.

use crate::fs::StagedFile;

/// MIME type used for extensions the lookup table does not know.
pub const GENERIC_MIME: &str = "application/octet-stream";

/// Well-known public storage category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Video,
    Audio,
    Image,
    Other,
}

impl MediaCategory {
    /// Classify by MIME type.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video") || mime.contains("mpegurl") {
            MediaCategory::Video
        } else if mime.starts_with("audio") {
            MediaCategory::Audio
        } else if mime.starts_with("image") {
            MediaCategory::Image
        } else {
            MediaCategory::Other
        }
    }

    /// Get the public folder name for this category.
    pub fn folder_name(&self) -> &'static str {
        match self {
            MediaCategory::Video => "Movies",
            MediaCategory::Audio => "Music",
            MediaCategory::Image => "Pictures",
            MediaCategory::Other => "Download",
        }
    }
}

/// Look up the MIME type for a file name by extension.
pub fn mime_for_name(name: &str) -> &'static str {
    mime_guess::from_path(name).first_raw().unwrap_or(GENERIC_MIME)
}

/// Where and as what a staged file is published. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    display_name: String,
    mime_type: String,
    relative_path: String,
}

impl PublishTarget {
    /// Derive the target from the staged file's name and extension.
    pub fn for_staged(staged: &StagedFile, subdirectory: Option<&str>) -> Self {
        let display_name = staged.file_name();
        let mime_type = mime_for_name(&display_name).to_string();
        let category = MediaCategory::from_mime(&mime_type);

        let relative_path = match subdirectory.map(|s| s.trim_matches('/')) {
            Some(sub) if !sub.is_empty() => format!("{}/{}", category.folder_name(), sub),
            _ => category.folder_name().to_string(),
        };

        Self {
            display_name,
            mime_type,
            relative_path,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn staged(name: &str) -> StagedFile {
        StagedFile {
            path: PathBuf::from("/staging/req").join(name),
            size_bytes: 0,
        }
    }

    #[test]
    fn test_known_extensions() {
        let target = PublishTarget::for_staged(&staged("video.mp4"), None);
        assert_eq!(target.display_name(), "video.mp4");
        assert_eq!(target.mime_type(), "video/mp4");
        assert_eq!(target.relative_path(), "Movies");

        let target = PublishTarget::for_staged(&staged("song.mp3"), Some("stagepub"));
        assert_eq!(target.mime_type(), "audio/mpeg");
        assert_eq!(target.relative_path(), "Music/stagepub");

        let target = PublishTarget::for_staged(&staged("photo.JPG"), None);
        assert_eq!(target.mime_type(), "image/jpeg");
        assert_eq!(target.relative_path(), "Pictures");
    }

    #[test]
    fn test_unknown_extension_is_generic_binary() {
        let target = PublishTarget::for_staged(&staged("blob.zzzunknown"), None);
        assert_eq!(target.mime_type(), GENERIC_MIME);
        assert_eq!(target.relative_path(), "Download");

        let target = PublishTarget::for_staged(&staged("noext"), Some("/nested/"));
        assert_eq!(target.mime_type(), GENERIC_MIME);
        assert_eq!(target.relative_path(), "Download/nested");
    }
}
