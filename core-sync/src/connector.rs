//! Platform connector contract
//!
//! Each platform crate implements [`PlatformConnector`]; the generic
//! controller drives it through the add/update/delete stages.

use async_trait::async_trait;

use crate::image::Image;
use crate::platform::PlatformKind;
use crate::record::PublishRecord;
use crate::Result;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// Platform-assigned identifier
    pub remote_id: String,
    /// Public URL of the new post
    pub url: String,
    /// Follow-up steps that failed after the upload itself succeeded
    /// (date fix, album or group assignment, tagging)
    pub warnings: Vec<String>,
}

impl AddOutcome {
    pub fn new(remote_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
            url: url.into(),
            warnings: Vec::new(),
        }
    }
}

/// Result of an update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Remote metadata was rewritten
    Updated,
    /// The platform does not support or need an update
    Unchanged,
}

/// Remote operations for one platform.
///
/// Errors returned by `commit_*` are recorded against the image and the
/// controller moves on; an error from `connect` aborts the platform.
#[async_trait]
pub trait PlatformConnector: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Open the remote session.
    async fn connect(&mut self) -> Result<()>;

    /// Publish a new image.
    async fn commit_add(&self, image: &Image) -> Result<AddOutcome>;

    /// Refresh an already published image.
    async fn commit_update(&self, image: &Image, record: &PublishRecord) -> Result<UpdateOutcome>;

    /// Remove a published image.
    async fn commit_delete(&self, image: &Image, record: &PublishRecord) -> Result<()>;
}
