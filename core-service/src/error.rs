use core_catalog::CatalogError;
use core_sync::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
}

impl CoreError {
    /// Process exit code: 2 for configuration problems, 1 for anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::Config(_)
            | CoreError::Sync(SyncError::UnknownPlatform { .. })
            | CoreError::Sync(SyncError::InvalidConfiguration { .. }) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let unknown = CoreError::from(SyncError::UnknownPlatform {
            name: "instagram".into(),
            valid: "flickr, pixelfed".into(),
        });
        assert_eq!(unknown.exit_code(), 2);

        let config = CoreError::from(core_runtime::Error::Config("port must be non-zero".into()));
        assert_eq!(config.exit_code(), 2);

        let catalog = CoreError::from(CatalogError::Authentication("denied".into()));
        assert_eq!(catalog.exit_code(), 1);
    }
}
