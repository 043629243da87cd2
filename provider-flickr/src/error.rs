//! Error types for the Flickr provider

use bridge_traits::error::BridgeError;
use core_catalog::CatalogError;
use core_sync::SyncError;
use thiserror::Error;

/// Flickr API error codes meaning the key or token was refused.
const AUTH_ERROR_CODES: [u32; 3] = [98, 99, 100];

/// Flickr provider errors
#[derive(Error, Debug)]
pub enum FlickrError {
    /// A required catalog application variable is not set
    #[error("Application variable '{0}' is not set")]
    MissingCredential(String),

    /// Commit attempted before `connect`
    #[error("Not connected")]
    NotConnected,

    /// API answered with `stat="fail"`
    #[error("{method} failed (code {code}): {message}")]
    Api {
        method: String,
        code: u32,
        message: String,
    },

    /// Non-success HTTP status
    #[error("{method} returned status {status_code}: {message}")]
    Http {
        method: String,
        status_code: u16,
        message: String,
    },

    /// Unexpected response body
    #[error("Failed to parse {method} response: {message}")]
    Parse { method: String, message: String },

    /// Request signature could not be computed
    #[error("Failed to sign request: {0}")]
    Signing(String),

    /// Upload attempted for an image that was never prepared
    #[error("Image {0} has no upload fields")]
    NotPrepared(u64),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl FlickrError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, FlickrError::Api { code, .. } if AUTH_ERROR_CODES.contains(code))
            || matches!(self, FlickrError::Http { status_code: 401 | 403, .. })
    }

    fn operation(&self) -> &str {
        match self {
            FlickrError::Api { method, .. }
            | FlickrError::Http { method, .. }
            | FlickrError::Parse { method, .. } => method,
            FlickrError::NotPrepared(_) => "upload",
            _ => "request",
        }
    }
}

/// Result type for Flickr operations
pub type Result<T> = std::result::Result<T, FlickrError>;

const PLATFORM: &str = "flickr";

impl From<FlickrError> for SyncError {
    fn from(error: FlickrError) -> Self {
        if error.is_auth_failure() {
            return SyncError::Authentication {
                platform: PLATFORM.to_string(),
                message: error.to_string(),
            };
        }

        match error {
            FlickrError::MissingCredential(_) => SyncError::InvalidConfiguration {
                platform: PLATFORM.to_string(),
                message: error.to_string(),
            },
            FlickrError::Catalog(e) => SyncError::Catalog(e),
            FlickrError::Bridge(ref e) if e.is_unreachable() => SyncError::Connection {
                platform: PLATFORM.to_string(),
                message: error.to_string(),
            },
            other => SyncError::RemoteCall {
                platform: PLATFORM.to_string(),
                operation: other.operation().to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = FlickrError::Api {
            method: "flickr.photos.setMeta".to_string(),
            code: 1,
            message: "Photo not found".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "flickr.photos.setMeta failed (code 1): Photo not found"
        );
    }

    #[test]
    fn test_invalid_token_is_authentication() {
        let error = FlickrError::Api {
            method: "flickr.test.login".to_string(),
            code: 98,
            message: "Invalid auth token".to_string(),
        };
        assert!(matches!(
            SyncError::from(error),
            SyncError::Authentication { .. }
        ));
    }

    #[test]
    fn test_error_conversion() {
        let missing: SyncError = FlickrError::MissingCredential("flickr_apikey".into()).into();
        assert!(matches!(missing, SyncError::InvalidConfiguration { .. }));

        let timeout: SyncError = FlickrError::Bridge(BridgeError::Timeout).into();
        assert!(matches!(timeout, SyncError::Connection { .. }));

        let failed: SyncError = FlickrError::Http {
            method: "upload".into(),
            status_code: 500,
            message: "oops".into(),
        }
        .into();
        match failed {
            SyncError::RemoteCall { operation, .. } => assert_eq!(operation, "upload"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
