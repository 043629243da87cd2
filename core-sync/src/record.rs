//! Publish records
//!
//! The attribute instance a platform controller writes after a successful
//! remote operation. Stored in the attribute set named after the platform.

use chrono::NaiveDate;
use core_catalog::AttributeRecord;
use serde_json::{Map, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub const KEY_POSTED: &str = "posted";
pub const KEY_REMOTE_ID: &str = "photo_id";
pub const KEY_URL: &str = "url";
pub const KEY_UPDATED: &str = "updated";

/// Remote identity of a published image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    /// Date of first publication
    pub posted: NaiveDate,
    /// Platform-assigned identifier
    pub remote_id: String,
    /// Public URL of the post
    pub url: String,
    /// Date of the last successful update
    pub updated: Option<NaiveDate>,
}

impl PublishRecord {
    pub fn new(remote_id: impl Into<String>, url: impl Into<String>, posted: NaiveDate) -> Self {
        Self {
            posted,
            remote_id: remote_id.into(),
            url: url.into(),
            updated: None,
        }
    }

    /// Copy of this record stamped with an update date.
    pub fn touched(&self, on: NaiveDate) -> Self {
        Self {
            updated: Some(on),
            ..self.clone()
        }
    }

    /// Attribute map written to the catalog.
    pub fn to_attributes(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(
            KEY_POSTED.to_string(),
            Value::String(self.posted.format(DATE_FORMAT).to_string()),
        );
        data.insert(KEY_REMOTE_ID.to_string(), Value::String(self.remote_id.clone()));
        data.insert(KEY_URL.to_string(), Value::String(self.url.clone()));
        if let Some(updated) = self.updated {
            data.insert(
                KEY_UPDATED.to_string(),
                Value::String(updated.format(DATE_FORMAT).to_string()),
            );
        }
        data
    }

    /// Read a record back from an attribute instance.
    ///
    /// The remote id is mandatory. Dates are accepted as `YYYY-MM-DD` or with a
    /// trailing time component; a missing `posted` date is an error.
    pub fn from_attributes(record: &AttributeRecord) -> Result<Self, String> {
        let remote_id = match record.data.get(KEY_REMOTE_ID) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(format!("'{}' is missing", KEY_REMOTE_ID)),
        };

        let posted = record
            .get_str(KEY_POSTED)
            .ok_or_else(|| format!("'{}' is missing", KEY_POSTED))
            .and_then(|s| parse_date(s).ok_or_else(|| format!("'{}' is not a date: {}", KEY_POSTED, s)))?;

        let updated = match record.get_str(KEY_UPDATED) {
            Some(s) => Some(
                parse_date(s).ok_or_else(|| format!("'{}' is not a date: {}", KEY_UPDATED, s))?,
            ),
            None => None,
        };

        Ok(Self {
            posted,
            remote_id,
            url: record.get_str(KEY_URL).unwrap_or_default().to_string(),
            updated,
        })
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}
