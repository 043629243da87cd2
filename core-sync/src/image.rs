//! # Image Model
//!
//! One catalog file as seen by a platform controller.
//!
//! An [`Image`] is built from a fresh catalog query each run and never
//! persisted. Its lifecycle inside a controller is:
//!
//! ```text
//! from_record → attach_publish_record → prepare_for_upload → validate → classify
//! ```
//!
//! `prepare_for_upload` and `validate` do no I/O; everything they need is
//! loaded by the controller beforehand.

use chrono::{DateTime, NaiveDateTime};
use core_catalog::{AttributeRecord, CategoryEntry, FileId, FileRecord};
use std::fmt;
use tracing::{debug, warn};

use crate::category::{parse_category, AssignmentKind, CategoryParse};
use crate::profile::{ImageProfile, RequiredField, MB};
use crate::record::PublishRecord;
use crate::{Result, SyncError};

/// Whether the image is still under the platform category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Enumerated under the platform category this run
    Current,
    /// Has a publish record but is no longer under the platform category
    Withdrawn,
}

/// Exposure and equipment metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShootingMetadata {
    pub camera: Option<String>,
    pub lens: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
    pub iso: Option<String>,
    pub focal_length: Option<String>,
}

/// Fields derived by `prepare_for_upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadFields {
    pub caption: String,
    /// Album / photoset codes
    pub albums: Vec<String>,
    /// Group / pool codes
    pub groups: Vec<String>,
    /// Other `(kind, code)` assignments
    pub others: Vec<(String, String)>,
    pub tags: Vec<String>,
}

/// A reason an image cannot be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField(RequiredField),
    TooLarge { size: u64, max: u64 },
    CaptionTooLong { length: usize, max: usize },
    MalformedPublishRecord(String),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField(field) => write!(f, "missing {}", field.as_str()),
            ValidationIssue::TooLarge { size, max } => write!(
                f,
                "{:.1} MB exceeds max {:.1} MB",
                *size as f64 / MB as f64,
                *max as f64 / MB as f64
            ),
            ValidationIssue::CaptionTooLong { length, max } => {
                write!(f, "caption is {} characters, max {}", length, max)
            }
            ValidationIssue::MalformedPublishRecord(reason) => {
                write!(f, "malformed publish record: {}", reason)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PublishState {
    Unpublished,
    Published(PublishRecord),
    Malformed(String),
}

/// One catalog image.
#[derive(Debug, Clone)]
pub struct Image {
    pub id: FileId,
    /// Full path on disk
    pub filename: String,
    /// File name without folder
    pub name: String,
    pub size: u64,
    pub date_time: Option<NaiveDateTime>,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub categories: Vec<CategoryEntry>,
    pub shooting: ShootingMetadata,
    /// Version file this master was reached through, when masters are resolved
    pub resolved_from: Option<FileId>,
    membership: Membership,
    publish: PublishState,
    upload: Option<UploadFields>,
    issues: Vec<ValidationIssue>,
}

impl Image {
    /// Build an image from a catalog record and its categories.
    ///
    /// # Errors
    ///
    /// `SyncError::IncompleteRecord` when the id or the filename is missing.
    pub fn from_record(record: FileRecord, categories: Vec<CategoryEntry>) -> Result<Self> {
        let id = record.id.ok_or(SyncError::IncompleteRecord {
            field: "id",
            file_id: None,
        })?;

        let filename = record
            .file_name
            .filter(|f| !f.trim().is_empty())
            .ok_or(SyncError::IncompleteRecord {
                field: "filename",
                file_id: Some(id),
            })?;

        let name = record
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| base_name(&filename).to_string());

        let date_time = record.date_time.as_deref().and_then(|raw| {
            let parsed = parse_date_time(raw);
            if parsed.is_none() {
                debug!(file_id = id, value = raw, "Unparseable capture date");
            }
            parsed
        });

        Ok(Self {
            id,
            filename,
            name,
            size: record.size,
            date_time,
            title: record.title.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            keywords: record.keywords,
            categories,
            shooting: ShootingMetadata {
                camera: record.camera,
                lens: record.lens,
                aperture: record.aperture,
                shutter_speed: record.shutter_speed,
                iso: record.iso,
                focal_length: record.focal_length,
            },
            resolved_from: None,
            membership: Membership::Current,
            publish: PublishState::Unpublished,
            upload: None,
            issues: Vec::new(),
        })
    }

    /// Attach the attribute instance found for this image, if any.
    pub fn attach_publish_record(&mut self, record: Option<&AttributeRecord>) {
        self.publish = match record {
            None => PublishState::Unpublished,
            Some(record) => match PublishRecord::from_attributes(record) {
                Ok(parsed) => PublishState::Published(parsed),
                Err(reason) => PublishState::Malformed(reason),
            },
        };
    }

    pub fn mark_withdrawn(&mut self) {
        self.membership = Membership::Withdrawn;
    }

    pub fn membership(&self) -> Membership {
        self.membership
    }

    /// True iff a publish record (well-formed or not) exists for this image.
    pub fn is_on_platform(&self) -> bool {
        !matches!(self.publish, PublishState::Unpublished)
    }

    pub fn publish_record(&self) -> Option<&PublishRecord> {
        match &self.publish {
            PublishState::Published(record) => Some(record),
            _ => None,
        }
    }

    /// Title, or the file name when the title is empty.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.name
        } else {
            self.title.trim()
        }
    }

    /// Derive upload fields for one platform. Runs once; later calls are no-ops.
    ///
    /// Malformed platform categories are logged and skipped.
    pub fn prepare_for_upload(&mut self, root: &str, profile: &dyn ImageProfile) {
        if self.upload.is_some() {
            return;
        }

        let platform = profile.kind().as_str();
        let mut fields = UploadFields::default();

        for entry in &self.categories {
            match parse_category(root, entry) {
                CategoryParse::Assignment {
                    platform: p,
                    kind,
                    code,
                } if p == platform => match kind {
                    AssignmentKind::Albums => push_unique(&mut fields.albums, code),
                    AssignmentKind::Groups => push_unique(&mut fields.groups, code),
                    AssignmentKind::Other(kind) => {
                        if !fields.others.iter().any(|(k, c)| *k == kind && *c == code) {
                            fields.others.push((kind, code));
                        }
                    }
                },
                CategoryParse::Malformed { path, reason } => {
                    warn!(file_id = self.id, path = %path, reason, "Skipping malformed category");
                }
                _ => {}
            }
        }

        fields.caption = profile.compose_caption(self);
        fields.tags = self
            .keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        self.upload = Some(fields);
    }

    pub fn upload_fields(&self) -> Option<&UploadFields> {
        self.upload.as_ref()
    }

    /// Recompute validation issues against a platform profile.
    ///
    /// All problems are collected. Withdrawn images only need a usable
    /// publish record, since they are about to be removed.
    pub fn validate(&mut self, profile: &dyn ImageProfile) -> bool {
        self.issues.clear();

        if let PublishState::Malformed(reason) = &self.publish {
            self.issues
                .push(ValidationIssue::MalformedPublishRecord(reason.clone()));
        }

        if self.membership == Membership::Withdrawn {
            return self.issues.is_empty();
        }

        for field in profile.required_fields() {
            let value = match field {
                RequiredField::Title => &self.title,
                RequiredField::Description => &self.description,
            };
            if value.trim().is_empty() {
                self.issues.push(ValidationIssue::MissingField(*field));
            }
        }

        let max = profile.max_upload_bytes();
        if self.size > max {
            self.issues.push(ValidationIssue::TooLarge {
                size: self.size,
                max,
            });
        }

        if let Some(limit) = profile.max_caption_chars() {
            let length = match &self.upload {
                Some(fields) => fields.caption.chars().count(),
                None => profile.compose_caption(self).chars().count(),
            };
            if length > limit {
                self.issues.push(ValidationIssue::CaptionTooLong { length, max: limit });
            }
        }

        self.issues.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Exposure summary, e.g. `f/8, 1/250 s, ISO 200, 50 mm`.
    pub fn shooting_info(&self) -> String {
        let s = &self.shooting;
        let parts = [
            s.aperture.as_deref().map(|a| prefixed("f/", a)),
            s.shutter_speed.as_deref().map(|t| suffixed(t, " s", 's')),
            s.iso.as_deref().map(|i| prefixed("ISO ", i)),
            s.focal_length.as_deref().map(|f| suffixed(f, " mm", 'm')),
        ];
        join_present(parts)
    }

    /// Equipment summary, e.g. `Nikon Z 6, NIKKOR Z 24-70mm f/4 S`.
    pub fn camera_info(&self) -> String {
        join_present([self.shooting.camera.clone(), self.shooting.lens.clone()])
    }
}

fn push_unique(list: &mut Vec<String>, code: String) {
    if !list.contains(&code) {
        list.push(code);
    }
}

fn prefixed(prefix: &str, value: &str) -> String {
    let value = value.trim();
    if value.to_lowercase().starts_with(&prefix.to_lowercase()) {
        value.to_string()
    } else {
        format!("{}{}", prefix, value)
    }
}

fn suffixed(value: &str, suffix: &str, marker: char) -> String {
    let value = value.trim();
    if value.ends_with(marker) {
        value.to_string()
    } else {
        format!("{}{}", value, suffix)
    }
}

fn join_present<const N: usize>(parts: [Option<String>; N]) -> String {
    parts
        .into_iter()
        .flatten()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}
