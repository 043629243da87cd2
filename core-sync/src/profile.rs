//! Platform image profiles
//!
//! An [`ImageProfile`] carries the per-platform rules applied to an image:
//! size limit, required text fields, caption layout and length.

use crate::image::Image;
use crate::platform::PlatformKind;

/// Bytes per megabyte used for size limits and messages.
pub const MB: u64 = 1_048_576;

/// A text field an image must carry before it can be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Title,
    Description,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Title => "title",
            RequiredField::Description => "description",
        }
    }
}

/// Per-platform validation and upload-field rules.
pub trait ImageProfile: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Largest file the platform accepts, in bytes.
    fn max_upload_bytes(&self) -> u64;

    fn required_fields(&self) -> &'static [RequiredField] {
        &[RequiredField::Title, RequiredField::Description]
    }

    /// Caption length limit in characters, if any.
    fn max_caption_chars(&self) -> Option<usize> {
        None
    }

    /// Caption text: description, blank line, then shooting and camera info.
    fn compose_caption(&self, image: &Image) -> String {
        let mut lines = vec![image.description.trim().to_string(), String::new()];

        let shooting = image.shooting_info();
        if !shooting.is_empty() {
            lines.push(shooting);
        }

        let camera = image.camera_info();
        if !camera.is_empty() {
            lines.push(camera);
        }

        lines.join("\n").trim_end().to_string()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Profile with the Flickr-like defaults and a configurable limit.
    pub struct TestProfile {
        pub max_bytes: u64,
        pub caption_limit: Option<usize>,
    }

    impl Default for TestProfile {
        fn default() -> Self {
            Self {
                max_bytes: 200 * MB,
                caption_limit: None,
            }
        }
    }

    impl ImageProfile for TestProfile {
        fn kind(&self) -> PlatformKind {
            PlatformKind::Flickr
        }

        fn max_upload_bytes(&self) -> u64 {
            self.max_bytes
        }

        fn max_caption_chars(&self) -> Option<usize> {
            self.caption_limit
        }
    }
}
