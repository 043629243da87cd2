//! # Core Catalog
//!
//! Access to the IMatch catalog for the sync engine.
//!
//! - [`AttributeStore`]: per-file attribute sets used as publish bookkeeping
//! - [`CatalogQuery`]: category membership, file details and app variables
//! - [`ImatchClient`]: implementation of both over the local web service
//!
//! ## Example
//!
//! ```ignore
//! use core_catalog::{CatalogQuery, ImatchClient};
//!
//! let client = ImatchClient::connect(http_client, &config).await?;
//! let ids = client.list_files_in_category("Socials|flickr").await?;
//! let details = client.get_file_details(&ids).await?;
//! ```

pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::ImatchClient;
pub use error::{CatalogError, Result};
pub use traits::{AttributeStore, CatalogQuery};
pub use types::{AttributeOp, AttributeRecord, CategoryEntry, FileId, FileRecord};
