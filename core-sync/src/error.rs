use core_catalog::{CatalogError, FileId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{platform}: unable to connect: {message}")]
    Connection { platform: String, message: String },

    #[error("{platform}: authentication failed: {message}")]
    Authentication { platform: String, message: String },

    #[error("{platform}: {operation} failed: {message}")]
    RemoteCall {
        platform: String,
        operation: String,
        message: String,
    },

    #[error("Catalog record is missing required field '{field}'")]
    IncompleteRecord {
        field: &'static str,
        file_id: Option<FileId>,
    },

    #[error(
        "{platform}: publish record for file {file_id} could not be written \
         (remote id {remote_id:?}); catalog and platform are out of step: {source}"
    )]
    BookkeepingDesync {
        platform: String,
        file_id: FileId,
        remote_id: Option<String>,
        #[source]
        source: CatalogError,
    },

    #[error("'{name}' is an unrecognised platform. Valid options are: {valid}")]
    UnknownPlatform { name: String, valid: String },

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{platform}: invalid configuration: {message}")]
    InvalidConfiguration { platform: String, message: String },
}

impl SyncError {
    /// Errors that must stop the whole run rather than one platform.
    pub fn is_process_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::BookkeepingDesync { .. } | SyncError::UnknownPlatform { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
