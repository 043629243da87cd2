//! Pixelfed upload rules

use core_sync::{Image, ImageProfile, PlatformKind, RequiredField, MB};

/// Default instance upload limit.
pub const PIXELFED_MAX_UPLOAD: u64 = 15 * MB;

/// Default instance caption limit, in characters.
pub const PIXELFED_CAPTION_LIMIT: usize = 500;

/// Only a description is required. Keywords become hashtags at the end of
/// the caption, which counts against the caption limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelfedProfile;

impl ImageProfile for PixelfedProfile {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Pixelfed
    }

    fn max_upload_bytes(&self) -> u64 {
        PIXELFED_MAX_UPLOAD
    }

    fn required_fields(&self) -> &'static [RequiredField] {
        &[RequiredField::Description]
    }

    fn max_caption_chars(&self) -> Option<usize> {
        Some(PIXELFED_CAPTION_LIMIT)
    }

    fn compose_caption(&self, image: &Image) -> String {
        let mut lines = vec![image.description.trim().to_string()];

        let details: Vec<String> = [image.shooting_info(), image.camera_info()]
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect();
        if !details.is_empty() {
            lines.push(String::new());
            lines.extend(details);
        }

        let hashtags = hashtags(&image.keywords);
        if !hashtags.is_empty() {
            lines.push(String::new());
            lines.push(hashtags);
        }

        lines.join("\n").trim().to_string()
    }
}

/// `#word` per keyword, non-alphanumerics dropped.
fn hashtags(keywords: &[String]) -> String {
    let mut tags: Vec<String> = Vec::new();
    for keyword in keywords {
        let tag: String = keyword.chars().filter(|c| c.is_alphanumeric()).collect();
        if tag.is_empty() {
            continue;
        }
        let tag = format!("#{}", tag);
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_catalog::FileRecord;
    use core_sync::ValidationIssue;

    fn image(description: &str, keywords: &[&str], size: u64) -> Image {
        Image::from_record(
            FileRecord {
                id: Some(1),
                file_name: Some("/photos/dunes.jpg".into()),
                size,
                description: Some(description.into()),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                iso: Some("100".into()),
                ..Default::default()
            },
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_caption_ends_with_hashtags() {
        let caption = PixelfedProfile.compose_caption(&image(
            "Dunes at dawn",
            &["landscape", "black and white", "landscape"],
            MB,
        ));
        assert_eq!(
            caption,
            "Dunes at dawn\n\nISO 100\n\n#landscape #blackandwhite"
        );
    }

    #[test]
    fn test_title_not_required() {
        let mut untitled = image("Dunes", &[], MB);
        assert!(untitled.validate(&PixelfedProfile));
    }

    #[test]
    fn test_caption_limit() {
        let long = "x".repeat(PIXELFED_CAPTION_LIMIT + 1);
        let mut wordy = image(&long, &[], MB);
        wordy.prepare_for_upload("Socials", &PixelfedProfile);
        assert!(!wordy.validate(&PixelfedProfile));
        assert!(matches!(
            wordy.issues()[0],
            ValidationIssue::CaptionTooLong { max: PIXELFED_CAPTION_LIMIT, .. }
        ));
    }

    #[test]
    fn test_size_limit() {
        let mut big = image("Dunes", &[], 16 * MB);
        assert!(!big.validate(&PixelfedProfile));
    }
}
