//! # Application Configuration
//!
//! Provides configuration management for the sync run.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct an `AppConfig`
//! and validates it fail-fast before any network work starts. A fresh
//! `AppConfig` is built per run; nothing is shared between runs.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::AppConfig;
//!
//! let config = AppConfig::builder()
//!     .catalog_user("dave")
//!     .platforms(["flickr"])
//!     .dry_run(true)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.catalog_url, "http://127.0.0.1:50519");
//! assert_eq!(config.root_category, "Socials");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::AppConfig;
//!
//! // The catalog user is required
//! let config = AppConfig::builder()
//!     .build()
//!     .expect("Should fail - missing catalog user");
//! ```

use crate::error::{Error, Result};
use std::time::Duration;

/// Default IMatch web services port.
pub const DEFAULT_CATALOG_PORT: u16 = 50519;

/// Default root of the platform category tree.
pub const DEFAULT_ROOT_CATEGORY: &str = "Socials";

/// Default request timeout for catalog calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of file ids sent per batched catalog request.
pub const DEFAULT_REQUEST_CHUNK_SIZE: usize = 100;

/// Largest batch accepted by `validate`.
pub const MAX_REQUEST_CHUNK_SIZE: usize = 1000;

/// Configuration for one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the catalog web service (no trailing slash)
    pub catalog_url: String,

    /// User name passed to catalog authentication
    pub catalog_user: String,

    /// Password passed to catalog authentication (usually empty)
    pub catalog_password: String,

    /// Application id passed to catalog authentication (usually empty)
    pub catalog_app_id: String,

    /// Top-level category under which platform categories live
    pub root_category: String,

    /// Timeout applied to each catalog request
    pub request_timeout: Duration,

    /// Maximum ids per batched catalog request
    pub request_chunk_size: usize,

    /// Platforms to sync, by name. Empty means every registered platform.
    pub platforms: Vec<String>,

    /// Classify and report only; no remote mutations and no attribute writes
    pub dry_run: bool,

    /// Look up every publish record of a platform to find withdrawn images
    pub detect_withdrawn: bool,

    /// Canonicalize version files to their master before syncing
    pub resolve_masters: bool,
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Catalog URL is an http(s) URL
    /// - Catalog user is not empty
    /// - Root category is a single, non-empty path segment
    /// - Timeout and chunk size are within sane bounds
    pub fn validate(&self) -> Result<()> {
        if !(self.catalog_url.starts_with("http://") || self.catalog_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "Catalog URL must start with http:// or https://, got '{}'",
                self.catalog_url
            )));
        }

        if self.catalog_user.trim().is_empty() {
            return Err(Error::Config("Catalog user cannot be empty".to_string()));
        }

        if self.root_category.trim().is_empty() {
            return Err(Error::Config("Root category cannot be empty".to_string()));
        }

        if self.root_category.contains('|') {
            return Err(Error::Config(format!(
                "Root category must be a single segment, got '{}'",
                self.root_category
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.request_timeout > Duration::from_secs(600) {
            return Err(Error::Config(
                "Request timeout exceeds maximum of 600 seconds".to_string(),
            ));
        }

        if self.request_chunk_size == 0 || self.request_chunk_size > MAX_REQUEST_CHUNK_SIZE {
            return Err(Error::Config(format!(
                "Request chunk size must be between 1 and {}, got {}",
                MAX_REQUEST_CHUNK_SIZE, self.request_chunk_size
            )));
        }

        if self.platforms.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::Config("Platform names cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Category path for a platform, e.g. `Socials|flickr`.
    pub fn platform_category(&self, platform: &str) -> String {
        format!("{}|{}", self.root_category, platform)
    }
}

/// Builder for constructing [`AppConfig`] instances.
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    catalog_url: Option<String>,
    catalog_port: Option<u16>,
    catalog_user: Option<String>,
    catalog_password: Option<String>,
    catalog_app_id: Option<String>,
    root_category: Option<String>,
    request_timeout: Option<Duration>,
    request_chunk_size: Option<usize>,
    platforms: Vec<String>,
    dry_run: bool,
    detect_withdrawn: Option<bool>,
    resolve_masters: bool,
}

impl AppConfigBuilder {
    /// Sets the full catalog base URL. Takes precedence over `catalog_port`.
    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = Some(url.into());
        self
    }

    /// Sets the loopback port of the catalog web service.
    pub fn catalog_port(mut self, port: u16) -> Self {
        self.catalog_port = Some(port);
        self
    }

    pub fn catalog_user(mut self, user: impl Into<String>) -> Self {
        self.catalog_user = Some(user.into());
        self
    }

    pub fn catalog_password(mut self, password: impl Into<String>) -> Self {
        self.catalog_password = Some(password.into());
        self
    }

    pub fn catalog_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.catalog_app_id = Some(app_id.into());
        self
    }

    pub fn root_category(mut self, root: impl Into<String>) -> Self {
        self.root_category = Some(root.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn request_chunk_size(mut self, size: usize) -> Self {
        self.request_chunk_size = Some(size);
        self
    }

    /// Restricts the run to the named platforms, in the given order.
    pub fn platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn detect_withdrawn(mut self, enabled: bool) -> Self {
        self.detect_withdrawn = Some(enabled);
        self
    }

    pub fn resolve_masters(mut self, enabled: bool) -> Self {
        self.resolve_masters = enabled;
        self
    }

    /// Builds the final `AppConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the catalog user is missing or any value
    /// fails [`AppConfig::validate`].
    pub fn build(self) -> Result<AppConfig> {
        let catalog_user = self.catalog_user.ok_or_else(|| {
            Error::Config("Catalog user is required. Use .catalog_user() to set it.".to_string())
        })?;

        let catalog_url = match (self.catalog_url, self.catalog_port) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, port) => format!(
                "http://127.0.0.1:{}",
                port.unwrap_or(DEFAULT_CATALOG_PORT)
            ),
        };

        let config = AppConfig {
            catalog_url,
            catalog_user,
            catalog_password: self.catalog_password.unwrap_or_default(),
            catalog_app_id: self.catalog_app_id.unwrap_or_default(),
            root_category: self
                .root_category
                .unwrap_or_else(|| DEFAULT_ROOT_CATEGORY.to_string()),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            request_chunk_size: self
                .request_chunk_size
                .unwrap_or(DEFAULT_REQUEST_CHUNK_SIZE),
            platforms: self.platforms,
            dry_run: self.dry_run,
            detect_withdrawn: self.detect_withdrawn.unwrap_or(true),
            resolve_masters: self.resolve_masters,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AppConfigBuilder {
        AppConfig::builder().catalog_user("dave")
    }

    #[test]
    fn test_builder_defaults() {
        let config = base().build().unwrap();

        assert_eq!(config.catalog_url, "http://127.0.0.1:50519");
        assert_eq!(config.catalog_password, "");
        assert_eq!(config.catalog_app_id, "");
        assert_eq!(config.root_category, "Socials");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.request_chunk_size, 100);
        assert!(config.platforms.is_empty());
        assert!(!config.dry_run);
        assert!(config.detect_withdrawn);
        assert!(!config.resolve_masters);
    }

    #[test]
    fn test_builder_requires_catalog_user() {
        let result = AppConfig::builder().build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Catalog user")));
    }

    #[test]
    fn test_builder_with_port() {
        let config = base().catalog_port(50600).build().unwrap();
        assert_eq!(config.catalog_url, "http://127.0.0.1:50600");
    }

    #[test]
    fn test_explicit_url_wins_and_is_trimmed() {
        let config = base()
            .catalog_port(1)
            .catalog_url("http://imatch.local:50519/")
            .build()
            .unwrap();
        assert_eq!(config.catalog_url, "http://imatch.local:50519");
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let result = base().catalog_url("ftp://127.0.0.1").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_nested_root_category() {
        let result = base().root_category("Socials|flickr").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let result = base().request_timeout(Duration::ZERO).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_chunk_size() {
        assert!(base().request_chunk_size(0).build().is_err());
        assert!(base().request_chunk_size(5000).build().is_err());
        assert!(base().request_chunk_size(1000).build().is_ok());
    }

    #[test]
    fn test_platform_category() {
        let config = base().platforms(["flickr", "pixelfed"]).build().unwrap();
        assert_eq!(config.platforms, vec!["flickr", "pixelfed"]);
        assert_eq!(config.platform_category("flickr"), "Socials|flickr");
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = base().dry_run(true).build().unwrap();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
