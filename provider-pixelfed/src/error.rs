//! Error types for the Pixelfed provider

use bridge_traits::error::BridgeError;
use core_catalog::CatalogError;
use core_sync::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixelfedError {
    #[error("Application variable '{0}' is not set")]
    MissingSetting(String),

    #[error("Application variable '{name}' has an invalid value: {value}")]
    InvalidSetting { name: String, value: String },

    #[error("Not connected")]
    NotConnected,

    #[error("{operation} returned status {status_code}: {message}")]
    Http {
        operation: String,
        status_code: u16,
        message: String,
    },

    #[error("Failed to parse {operation} response: {message}")]
    Parse { operation: String, message: String },

    #[error("Image {0} has no upload fields")]
    NotPrepared(u64),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, PixelfedError>;

const PLATFORM: &str = "pixelfed";

impl From<PixelfedError> for SyncError {
    fn from(error: PixelfedError) -> Self {
        match error {
            PixelfedError::Http {
                status_code: 401 | 403,
                ..
            } => SyncError::Authentication {
                platform: PLATFORM.to_string(),
                message: error.to_string(),
            },
            PixelfedError::MissingSetting(_) | PixelfedError::InvalidSetting { .. } => {
                SyncError::InvalidConfiguration {
                    platform: PLATFORM.to_string(),
                    message: error.to_string(),
                }
            }
            PixelfedError::Catalog(e) => SyncError::Catalog(e),
            PixelfedError::Bridge(ref e) if e.is_unreachable() => SyncError::Connection {
                platform: PLATFORM.to_string(),
                message: error.to_string(),
            },
            PixelfedError::Http { ref operation, .. }
            | PixelfedError::Parse { ref operation, .. } => SyncError::RemoteCall {
                platform: PLATFORM.to_string(),
                operation: operation.clone(),
                message: error.to_string(),
            },
            other => SyncError::RemoteCall {
                platform: PLATFORM.to_string(),
                operation: "request".to_string(),
                message: other.to_string(),
            },
        }
    }
}
