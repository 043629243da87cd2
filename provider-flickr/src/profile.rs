//! Flickr upload rules

use core_sync::{ImageProfile, PlatformKind, MB};

/// Largest file Flickr accepts for a photo.
pub const FLICKR_MAX_UPLOAD: u64 = 200 * MB;

/// Title and description are required; the caption has no length limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlickrProfile;

impl ImageProfile for FlickrProfile {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Flickr
    }

    fn max_upload_bytes(&self) -> u64 {
        FLICKR_MAX_UPLOAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_catalog::FileRecord;
    use core_sync::{Image, RequiredField, ValidationIssue};

    fn image(size: u64, title: &str) -> Image {
        Image::from_record(
            FileRecord {
                id: Some(3),
                file_name: Some("/photos/pier.jpg".into()),
                size,
                title: Some(title.into()),
                description: Some("Pier at low tide".into()),
                aperture: Some("8".into()),
                iso: Some("200".into()),
                camera: Some("Nikon Z 6".into()),
                ..Default::default()
            },
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_size_limit() {
        let mut ok = image(FLICKR_MAX_UPLOAD, "Pier");
        assert!(ok.validate(&FlickrProfile));

        let mut big = image(FLICKR_MAX_UPLOAD + 1, "Pier");
        assert!(!big.validate(&FlickrProfile));
        assert!(matches!(big.issues()[0], ValidationIssue::TooLarge { .. }));
    }

    #[test]
    fn test_requires_title_and_description() {
        assert_eq!(
            FlickrProfile.required_fields(),
            &[RequiredField::Title, RequiredField::Description]
        );
        let mut untitled = image(MB, " ");
        assert!(!untitled.validate(&FlickrProfile));
        assert_eq!(untitled.issues()[0].to_string(), "missing title");
    }

    #[test]
    fn test_caption_layout() {
        let caption = FlickrProfile.compose_caption(&image(MB, "Pier"));
        let lines: Vec<&str> = caption.lines().collect();
        assert_eq!(lines[0], "Pier at low tide");
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("f/8"));
        assert_eq!(lines[3], "Nikon Z 6");
    }
}
