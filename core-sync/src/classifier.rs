//! # Classifier
//!
//! Assigns every gathered image to exactly one bucket. Rules, in priority
//! order:
//!
//! 1. validation failed → [`Classification::Error`]
//! 2. no publish record → [`Classification::Add`]
//! 3. publish record and withdrawn from the platform category → [`Classification::Delete`]
//! 4. otherwise → [`Classification::Update`]
//!
//! Classification reads only the image snapshot and performs no I/O.

use crate::image::{Image, Membership};

/// Outcome for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Add,
    Update,
    Delete,
    /// Invalid image with human-readable reasons
    Error(Vec<String>),
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Add => "add",
            Classification::Update => "update",
            Classification::Delete => "delete",
            Classification::Error(_) => "error",
        }
    }
}

/// Classify one validated image.
pub fn classify(image: &Image) -> Classification {
    if !image.is_valid() {
        return Classification::Error(image.issues().iter().map(ToString::to_string).collect());
    }

    if !image.is_on_platform() {
        return Classification::Add;
    }

    match image.membership() {
        Membership::Withdrawn => Classification::Delete,
        Membership::Current => Classification::Update,
    }
}

/// Indices into the classified slice, grouped by outcome, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub add: Vec<usize>,
    pub update: Vec<usize>,
    pub delete: Vec<usize>,
    pub error: Vec<(usize, Vec<String>)>,
}

impl Buckets {
    pub fn len(&self) -> usize {
        self.add.len() + self.update.len() + self.delete.len() + self.error.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify a snapshot of images.
pub fn classify_all(images: &[Image]) -> Buckets {
    let mut buckets = Buckets::default();
    for (index, image) in images.iter().enumerate() {
        match classify(image) {
            Classification::Add => buckets.add.push(index),
            Classification::Update => buckets.update.push(index),
            Classification::Delete => buckets.delete.push(index),
            Classification::Error(reasons) => buckets.error.push((index, reasons)),
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::test_support::TestProfile;
    use crate::profile::MB;
    use core_catalog::{AttributeRecord, FileRecord};
    use serde_json::Value;

    fn image(id: u64, title: Option<&str>, size: u64) -> Image {
        Image::from_record(
            FileRecord {
                id: Some(id),
                file_name: Some(format!("/photos/{}.jpg", id)),
                size,
                title: title.map(str::to_string),
                description: Some("A description".into()),
                ..Default::default()
            },
            vec![],
        )
        .unwrap()
    }

    fn published(mut image: Image) -> Image {
        let record = AttributeRecord {
            file_id: image.id,
            instance_id: 1,
            data: [
                ("posted".to_string(), Value::String("2023-01-02".into())),
                ("photo_id".to_string(), Value::String(format!("r{}", image.id))),
            ]
            .into_iter()
            .collect(),
        };
        image.attach_publish_record(Some(&record));
        image
    }

    fn validated(mut images: Vec<Image>) -> Vec<Image> {
        let profile = TestProfile::default();
        for image in &mut images {
            image.validate(&profile);
        }
        images
    }

    #[test]
    fn test_unpublished_valid_image_is_added() {
        let mut withdrawn = image(2, Some("t"), MB);
        withdrawn.mark_withdrawn();
        let images = validated(vec![image(1, Some("t"), MB), withdrawn]);

        assert_eq!(classify(&images[0]), Classification::Add);
        // Category history does not matter without a publish record
        assert_eq!(classify(&images[1]), Classification::Add);
    }

    #[test]
    fn test_published_valid_image_is_updated_never_added() {
        let images = validated(vec![published(image(1, Some("t"), MB))]);
        assert_eq!(classify(&images[0]), Classification::Update);
    }

    #[test]
    fn test_withdrawn_published_image_is_deleted() {
        let mut withdrawn = published(image(1, Some("t"), MB));
        withdrawn.mark_withdrawn();
        let images = validated(vec![withdrawn]);
        assert_eq!(classify(&images[0]), Classification::Delete);
    }

    #[test]
    fn test_invalid_image_is_error_in_no_other_bucket() {
        let images = validated(vec![
            image(1, None, MB),
            published(image(2, Some("t"), 210 * MB)),
            image(3, Some("t"), MB),
        ]);

        let buckets = classify_all(&images);

        assert_eq!(buckets.error.len(), 2);
        assert_eq!(buckets.error[0], (0, vec!["missing title".to_string()]));
        assert_eq!(buckets.error[1].0, 1);
        assert_eq!(buckets.add, vec![2]);
        assert!(buckets.update.is_empty());
        assert!(buckets.delete.is_empty());
        assert_eq!(buckets.len(), images.len());
    }

    #[test]
    fn test_buckets_keep_enumeration_order() {
        let images = validated(vec![
            image(5, Some("t"), MB),
            published(image(6, Some("t"), MB)),
            image(7, Some("t"), MB),
            published(image(8, Some("t"), MB)),
        ]);

        let buckets = classify_all(&images);
        assert_eq!(buckets.add, vec![0, 2]);
        assert_eq!(buckets.update, vec![1, 3]);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let mut withdrawn = published(image(4, Some("t"), MB));
        withdrawn.mark_withdrawn();
        let images = validated(vec![
            image(1, None, MB),
            image(2, Some("t"), MB),
            published(image(3, Some("t"), MB)),
            withdrawn,
        ]);

        let first = classify_all(&images);
        let second = classify_all(&images);
        assert_eq!(first, second);
        assert_eq!(first.delete, vec![3]);
    }
}
