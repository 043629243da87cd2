//! Catalog access traits
//!
//! The sync engine only talks to the catalog through these two traits, so
//! controllers can be driven by in-memory fakes in tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::Result;
use crate::types::{AttributeOp, AttributeRecord, CategoryEntry, FileId, FileRecord};

/// Read and write per-file attribute sets (publish bookkeeping).
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Attribute instances of `set` for the given files. A file with no
    /// instance is simply absent from the result.
    async fn get_attributes(&self, set: &str, file_ids: &[FileId]) -> Result<Vec<AttributeRecord>>;

    /// Write instance 1 of `set` for one file, adding it when absent and
    /// updating it otherwise.
    ///
    /// # Errors
    ///
    /// `CatalogError::AttributeWriteFailed` when the catalog does not
    /// acknowledge the write.
    async fn set_attributes(
        &self,
        set: &str,
        file_id: FileId,
        data: &Map<String, Value>,
    ) -> Result<AttributeOp>;

    /// Remove instance 1 of `set` for one file. No-op when absent.
    async fn delete_attributes(&self, set: &str, file_id: FileId) -> Result<()>;

    /// Every instance of `set` across the whole catalog.
    async fn list_published(&self, set: &str) -> Result<Vec<AttributeRecord>>;
}

/// Read-only catalog queries.
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Files assigned to a category path (including sub-categories).
    /// An unknown category yields an empty list.
    async fn list_files_in_category(&self, path: &str) -> Result<Vec<FileId>>;

    /// Details for the given files, in catalog order.
    async fn get_file_details(&self, file_ids: &[FileId]) -> Result<Vec<FileRecord>>;

    /// Category assignments keyed by file id.
    async fn get_file_categories(
        &self,
        file_ids: &[FileId],
    ) -> Result<HashMap<FileId, Vec<CategoryEntry>>>;

    /// Master of a version file; the input id when the file has none.
    async fn resolve_master(&self, file_id: FileId) -> Result<FileId>;

    /// Application variable value, `None` when unset or empty.
    async fn app_var(&self, name: &str) -> Result<Option<String>>;
}
