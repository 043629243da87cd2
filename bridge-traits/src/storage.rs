//! File System Abstraction
//!
//! Platform connectors read the original image bytes through this trait so
//! uploads can be exercised in tests without touching the disk.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// File system access trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn load(fs: &dyn FileSystemAccess, path: &Path) -> Result<Bytes> {
///     if !fs.exists(path).await? {
///         return Err(BridgeError::NotAvailable(path.display().to_string()));
///     }
///     fs.read_file(path).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Read entire file contents
    async fn read_file(&self, path: &Path) -> Result<Bytes>;
}
