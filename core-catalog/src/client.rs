//! IMatch web service client
//!
//! Implements [`AttributeStore`] and [`CatalogQuery`] over the local IMatch
//! HTTP API. Every request carries the token obtained by [`ImatchClient::connect`].

use async_trait::async_trait;
use bridge_traits::error::BridgeError;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use core_runtime::config::{AppConfig, DEFAULT_REQUEST_CHUNK_SIZE, DEFAULT_REQUEST_TIMEOUT};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::error::{CatalogError, Result};
use crate::traits::{AttributeStore, CatalogQuery};
use crate::types::{
    AppVarResponse, AttributeOp, AttributeRecord, AttributeTask, AttributesResponse,
    AuthenticateResponse, CategoriesResponse, CategoryEntry, FileCategoriesResponse, FileId,
    FileRecord, FilesResponse, RelationsResponse, WriteResponse, ATTRIBUTE_INSTANCE, FILE_FIELDS,
    FILE_TAG_FIELDS,
};

const AUTHENTICATE: &str = "/v1/authenticate";
const ATTRIBUTES: &str = "/v1/attributes";
const CATEGORIES: &str = "/v1/categories";
const FILES: &str = "/v1/files";
const FILE_CATEGORIES: &str = "/v1/files/categories";
const FILE_RELATIONS: &str = "/v1/files/relations";
const APP_VAR: &str = "/v1/imatch/appvar";

/// Authenticated IMatch client.
pub struct ImatchClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    auth_token: String,
    request_timeout: Duration,
    chunk_size: usize,
}

impl ImatchClient {
    /// Authenticate against the catalog and return a ready client.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Connection` if the service is not running
    /// - `CatalogError::Authentication` if the credentials are refused
    #[instrument(skip(http_client, config), fields(url = %config.catalog_url))]
    pub async fn connect(http_client: Arc<dyn HttpClient>, config: &AppConfig) -> Result<Self> {
        info!("Connecting to catalog");

        let request = HttpRequest::new(
            HttpMethod::Post,
            format!("{}{}", config.catalog_url, AUTHENTICATE),
        )
        .query("id", &config.catalog_user)
        .query("password", &config.catalog_password)
        .query("appid", &config.catalog_app_id)
        .timeout(config.request_timeout);

        let response = http_client
            .execute(request)
            .await
            .map_err(|e| match e {
                BridgeError::ConnectionFailed(message) => CatalogError::Connection {
                    url: config.catalog_url.clone(),
                    message: format!(
                        "{}. Check the catalog is running and the port is correct",
                        message
                    ),
                },
                BridgeError::Timeout => CatalogError::Connection {
                    url: config.catalog_url.clone(),
                    message: "request timed out".to_string(),
                },
                other => CatalogError::Bridge(other),
            })?;

        if !response.is_success() {
            return Err(CatalogError::Authentication(format!(
                "status {}: {}",
                response.status,
                String::from_utf8_lossy(&response.body)
            )));
        }

        let auth: AuthenticateResponse = parse(AUTHENTICATE, &response)?;
        if auth.auth_token.is_empty() {
            return Err(CatalogError::Authentication(
                "empty token in response".to_string(),
            ));
        }

        info!("Authenticated to catalog");

        Ok(Self {
            http_client,
            base_url: config.catalog_url.clone(),
            auth_token: auth.auth_token,
            request_timeout: config.request_timeout,
            chunk_size: config.request_chunk_size,
        })
    }

    /// Build a client around an existing token.
    pub fn with_token(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            chunk_size: DEFAULT_REQUEST_CHUNK_SIZE,
        }
    }

    /// Maximum number of ids per batched request.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let mut request =
            HttpRequest::new(HttpMethod::Get, format!("{}{}", self.base_url, endpoint))
                .query("auth_token", &self.auth_token);
        for (key, value) in params {
            request = request.query(key, value);
        }

        let response = self
            .http_client
            .execute(request.timeout(self.request_timeout))
            .await?;
        check_status(endpoint, &response)?;
        parse(endpoint, &response)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        form.push(("auth_token", self.auth_token.as_str()));
        form.extend_from_slice(params);

        let request = HttpRequest::new(HttpMethod::Post, format!("{}{}", self.base_url, endpoint))
            .form(&form)
            .timeout(self.request_timeout);

        // Writes are not idempotent across a lost response
        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await?;
        check_status(endpoint, &response)?;
        parse(endpoint, &response)
    }

    async fn write_task(&self, set: &str, file_id: FileId, task: AttributeTask<'_>) -> Result<()> {
        let tasks = serde_json::to_string(&[task]).map_err(|e| CatalogError::Parse {
            endpoint: ATTRIBUTES.to_string(),
            message: e.to_string(),
        })?;
        let id = file_id.to_string();

        debug!(set, file_id, tasks = %tasks, "Sending attribute task");

        let response: WriteResponse = self
            .post(ATTRIBUTES, &[("set", set), ("id", id.as_str()), ("tasks", tasks.as_str())])
            .await?;

        match response.result.as_deref() {
            Some("ok") => Ok(()),
            other => {
                error!(set, file_id, result = ?other, "Attribute write was not acknowledged");
                Err(CatalogError::AttributeWriteFailed {
                    set: set.to_string(),
                    file_id,
                    message: format!("result was {:?}", other.unwrap_or("missing")),
                })
            }
        }
    }
}

fn join_ids(ids: &[FileId]) -> String {
    ids.iter()
        .map(FileId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn check_status(endpoint: &str, response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 401 || response.status == 403 {
        return Err(CatalogError::Authentication(format!(
            "{} rejected the token (status {})",
            endpoint, response.status
        )));
    }
    Err(CatalogError::Api {
        endpoint: endpoint.to_string(),
        status_code: response.status,
        message: String::from_utf8_lossy(&response.body).to_string(),
    })
}

fn parse<T: DeserializeOwned>(endpoint: &str, response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| CatalogError::Parse {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl AttributeStore for ImatchClient {
    #[instrument(skip(self, file_ids), fields(count = file_ids.len()))]
    async fn get_attributes(&self, set: &str, file_ids: &[FileId]) -> Result<Vec<AttributeRecord>> {
        let mut records = Vec::new();
        for chunk in file_ids.chunks(self.chunk_size) {
            let ids = join_ids(chunk);
            let response: AttributesResponse =
                self.get(ATTRIBUTES, &[("set", set), ("id", ids.as_str())]).await?;
            records.extend(response.into_records());
        }
        debug!(instances = records.len(), "Attribute instances retrieved");
        Ok(records)
    }

    #[instrument(skip(self, data))]
    async fn set_attributes(
        &self,
        set: &str,
        file_id: FileId,
        data: &Map<String, Value>,
    ) -> Result<AttributeOp> {
        // The write operation must match what exists, so read first
        let existing = self.get_attributes(set, &[file_id]).await?;
        let op = if existing.is_empty() {
            AttributeOp::Add
        } else {
            AttributeOp::Update
        };

        self.write_task(
            set,
            file_id,
            AttributeTask {
                op: op.as_str(),
                instanceid: [ATTRIBUTE_INSTANCE],
                data: Some(data),
            },
        )
        .await?;

        debug!(op = op.as_str(), "Attribute instance written");
        Ok(op)
    }

    #[instrument(skip(self))]
    async fn delete_attributes(&self, set: &str, file_id: FileId) -> Result<()> {
        if self.get_attributes(set, &[file_id]).await?.is_empty() {
            debug!("No attribute instance to delete");
            return Ok(());
        }

        self.write_task(
            set,
            file_id,
            AttributeTask {
                op: "delete",
                instanceid: [ATTRIBUTE_INSTANCE],
                data: None,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_published(&self, set: &str) -> Result<Vec<AttributeRecord>> {
        let response: AttributesResponse =
            self.get(ATTRIBUTES, &[("set", set), ("id", "all")]).await?;
        let records = response.into_records();
        debug!(instances = records.len(), "Published records listed");
        Ok(records)
    }
}

#[async_trait]
impl CatalogQuery for ImatchClient {
    #[instrument(skip(self))]
    async fn list_files_in_category(&self, path: &str) -> Result<Vec<FileId>> {
        let response: CategoriesResponse = self
            .get(CATEGORIES, &[("path", path), ("fields", "files")])
            .await?;

        let files = response
            .categories
            .into_iter()
            .next()
            .map(|category| category.files)
            .unwrap_or_default();

        if files.is_empty() {
            info!("No files found in category");
        } else {
            debug!(count = files.len(), "Files found in category");
        }
        Ok(files)
    }

    #[instrument(skip(self, file_ids), fields(count = file_ids.len()))]
    async fn get_file_details(&self, file_ids: &[FileId]) -> Result<Vec<FileRecord>> {
        let mut files = Vec::with_capacity(file_ids.len());
        for chunk in file_ids.chunks(self.chunk_size) {
            let ids = join_ids(chunk);
            let response: FilesResponse = self
                .get(
                    FILES,
                    &[
                        ("id", ids.as_str()),
                        ("fields", FILE_FIELDS),
                        ("tagfields", FILE_TAG_FIELDS),
                    ],
                )
                .await?;
            files.extend(response.files);
        }
        Ok(files)
    }

    #[instrument(skip(self, file_ids), fields(count = file_ids.len()))]
    async fn get_file_categories(
        &self,
        file_ids: &[FileId],
    ) -> Result<HashMap<FileId, Vec<CategoryEntry>>> {
        let mut categories = HashMap::with_capacity(file_ids.len());
        for chunk in file_ids.chunks(self.chunk_size) {
            let ids = join_ids(chunk);
            let response: FileCategoriesResponse = self
                .get(FILE_CATEGORIES, &[("id", ids.as_str()), ("fields", "path,description")])
                .await?;
            for file in response.files {
                categories.insert(file.id, file.categories);
            }
        }
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn resolve_master(&self, file_id: FileId) -> Result<FileId> {
        let id = file_id.to_string();
        let response: RelationsResponse = self
            .get(FILE_RELATIONS, &[("id", id.as_str()), ("type", "masters")])
            .await?;

        Ok(response.first_master().unwrap_or(file_id))
    }

    #[instrument(skip(self))]
    async fn app_var(&self, name: &str) -> Result<Option<String>> {
        let response: AppVarResponse = self.get(APP_VAR, &[("name", name)]).await?;
        Ok(response.value)
    }
}
