//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, filesystem,
//! clock) into the sync engine. It authenticates against the catalog, builds
//! one controller per requested platform and runs them in order. Desktop
//! builds enable the `desktop-shims` feature, which supplies the `reqwest`
//! and `tokio::fs` bridges from `bridge-desktop`.

pub mod error;
pub mod factory;

pub use error::{CoreError, Result};
pub use factory::PlatformFactory;

use std::sync::Arc;

use bridge_traits::{http::HttpClient, storage::FileSystemAccess, time::Clock};
use core_catalog::{AttributeStore, CatalogQuery, ImatchClient};
use core_runtime::config::AppConfig;
use core_sync::{
    parse_platforms, ControllerDeps, ControllerSettings, PlatformKind, RunSummary, SyncRunner,
};
use tracing::info;

/// Aggregated handle to all bridge dependencies the core requires.
#[derive(Clone)]
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub filesystem: Arc<dyn FileSystemAccess>,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        filesystem: Arc<dyn FileSystemAccess>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
            filesystem,
            clock,
        }
    }

    /// Desktop bridges with the given request timeout.
    #[cfg(feature = "desktop-shims")]
    pub fn desktop(config: &AppConfig) -> Result<Self> {
        let http = bridge_desktop::ReqwestHttpClient::with_timeout(config.request_timeout)
            .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
        Ok(Self::new(
            Arc::new(http),
            Arc::new(bridge_desktop::TokioFileSystem::new()),
            Arc::new(bridge_traits::SystemClock),
        ))
    }
}

/// Platforms to run, in order. An empty list means every platform.
pub fn requested_platforms(config: &AppConfig) -> Result<Vec<PlatformKind>> {
    if config.platforms.is_empty() {
        return Ok(PlatformKind::ALL.to_vec());
    }
    Ok(parse_platforms(config.platforms.as_slice())?)
}

/// Primary façade exposed to the command line.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
}

impl CoreService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: CoreDependencies) -> Self {
        Self {
            deps: Arc::new(deps),
        }
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    /// Run one sync over the configured platforms.
    ///
    /// Platform names are checked before the catalog is contacted.
    pub async fn run(&self, config: &AppConfig) -> Result<RunSummary> {
        let kinds = requested_platforms(config)?;
        info!(
            platforms = %kinds.iter().map(PlatformKind::as_str).collect::<Vec<_>>().join(","),
            dry_run = config.dry_run,
            "Starting sync"
        );

        let catalog = Arc::new(ImatchClient::connect(Arc::clone(&self.deps.http_client), config).await?);
        let controller_deps = ControllerDeps {
            catalog: Arc::clone(&catalog) as Arc<dyn CatalogQuery>,
            store: catalog as Arc<dyn AttributeStore>,
            clock: Arc::clone(&self.deps.clock),
        };

        let factory = PlatformFactory::new(
            (*self.deps).clone(),
            controller_deps,
            ControllerSettings::from_config(config),
        );

        let mut runner = SyncRunner::new();
        for kind in kinds {
            runner.push(factory.build(kind)?);
        }

        Ok(runner.run().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bridge_traits::storage::FileMetadata;
    use bridge_traits::SystemClock;
    use core_catalog::{AttributeOp, AttributeRecord, CategoryEntry, FileId, FileRecord};
    use core_sync::SyncError;
    use mockall::mock;
    use serde_json::{Map, Value};
    use std::collections::HashMap;
    use std::path::Path;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    struct NoFiles;

    #[async_trait]
    impl FileSystemAccess for NoFiles {
        async fn exists(&self, _path: &Path) -> bridge_traits::error::Result<bool> {
            Ok(false)
        }
        async fn metadata(&self, _path: &Path) -> bridge_traits::error::Result<FileMetadata> {
            Err(BridgeError::NotAvailable("metadata".into()))
        }
        async fn read_file(&self, _path: &Path) -> bridge_traits::error::Result<bytes::Bytes> {
            Err(BridgeError::NotAvailable("read_file".into()))
        }
    }

    struct EmptyCatalog;

    #[async_trait]
    impl CatalogQuery for EmptyCatalog {
        async fn list_files_in_category(&self, _path: &str) -> core_catalog::Result<Vec<FileId>> {
            Ok(Vec::new())
        }
        async fn get_file_details(&self, _ids: &[FileId]) -> core_catalog::Result<Vec<FileRecord>> {
            Ok(Vec::new())
        }
        async fn get_file_categories(
            &self,
            _ids: &[FileId],
        ) -> core_catalog::Result<HashMap<FileId, Vec<CategoryEntry>>> {
            Ok(HashMap::new())
        }
        async fn resolve_master(&self, id: FileId) -> core_catalog::Result<FileId> {
            Ok(id)
        }
        async fn app_var(&self, _name: &str) -> core_catalog::Result<Option<String>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl AttributeStore for EmptyCatalog {
        async fn get_attributes(
            &self,
            _set: &str,
            _ids: &[FileId],
        ) -> core_catalog::Result<Vec<AttributeRecord>> {
            Ok(Vec::new())
        }
        async fn set_attributes(
            &self,
            _set: &str,
            _file_id: FileId,
            _data: &Map<String, Value>,
        ) -> core_catalog::Result<AttributeOp> {
            Ok(AttributeOp::Add)
        }
        async fn delete_attributes(&self, _set: &str, _file_id: FileId) -> core_catalog::Result<()> {
            Ok(())
        }
        async fn list_published(&self, _set: &str) -> core_catalog::Result<Vec<AttributeRecord>> {
            Ok(Vec::new())
        }
    }

    fn deps() -> CoreDependencies {
        CoreDependencies::new(
            Arc::new(MockHttpClient::new()),
            Arc::new(NoFiles),
            Arc::new(SystemClock),
        )
    }

    fn config(platforms: &[&str]) -> AppConfig {
        AppConfig::builder()
            .catalog_user("dave")
            .platforms(platforms.iter().copied())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_platform_stops_before_catalog_login() {
        // The mock has no expectations: any HTTP call would panic
        let service = CoreService::new(deps());

        let err = service.run(&config(&["flickr", "myspace"])).await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::Sync(SyncError::UnknownPlatform { ref name, .. }) if name == "myspace"
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_requested_platforms_default_to_all() {
        assert_eq!(
            requested_platforms(&config(&[])).unwrap(),
            PlatformKind::ALL.to_vec()
        );
        assert_eq!(
            requested_platforms(&config(&["pixelfed"])).unwrap(),
            vec![PlatformKind::Pixelfed]
        );
    }

    #[tokio::test]
    async fn test_factory_builds_each_platform() {
        let catalog = Arc::new(EmptyCatalog);
        let factory = PlatformFactory::new(
            deps(),
            ControllerDeps {
                catalog: Arc::clone(&catalog) as Arc<dyn CatalogQuery>,
                store: catalog as Arc<dyn AttributeStore>,
                clock: Arc::new(SystemClock),
            },
            ControllerSettings::default(),
        );

        for kind in PlatformKind::ALL {
            let mut controller = factory.build(kind).unwrap();
            assert_eq!(controller.kind(), kind);

            // Nothing under the category: the run completes without any remote call
            let stats = controller.run().await.unwrap();
            assert_eq!(stats.total, 0);
        }
    }
}
