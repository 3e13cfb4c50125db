//! Media picked by the author.

use reelstory_core::error::DomainError;
use reelstory_core::story::SegmentKind;
use serde::{Deserialize, Serialize};

/// One uploaded file, referenced by URL, with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSelection {
    /// Where the uploaded media lives.
    pub media_url: String,
    /// MIME type reported by the picker, e.g. `video/mp4`.
    pub content_type: String,
}

impl MediaSelection {
    /// Creates a selection.
    #[must_use]
    pub fn new(media_url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            media_url: media_url.into(),
            content_type: content_type.into(),
        }
    }

    /// Segment kind implied by the MIME type.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for anything that is not `image/*`
    /// or `video/*`.
    pub fn kind(&self) -> Result<SegmentKind, DomainError> {
        let top_level = self
            .content_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match top_level.as_str() {
            "image" => Ok(SegmentKind::Image),
            "video" => Ok(SegmentKind::Video),
            _ => Err(DomainError::Validation(format!(
                "unsupported media type {:?} for {}",
                self.content_type, self.media_url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_reads_top_level_mime_type() {
        assert_eq!(
            MediaSelection::new("a.jpg", "image/jpeg").kind().unwrap(),
            SegmentKind::Image
        );
        assert_eq!(
            MediaSelection::new("a.mp4", "Video/MP4; codecs=avc1").kind().unwrap(),
            SegmentKind::Video
        );
    }

    #[test]
    fn test_kind_rejects_other_types() {
        let result = MediaSelection::new("a.mp3", "audio/mpeg").kind();

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
