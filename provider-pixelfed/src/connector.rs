//! Pixelfed platform connector

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RetryPolicy};
use bridge_traits::storage::FileSystemAccess;
use core_catalog::CatalogQuery;
use core_sync::{
    AddOutcome, Image, PlatformConnector, PlatformKind, PublishRecord, SyncError, UpdateOutcome,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{PixelfedError, Result};
use crate::types::{Account, MediaAttachment, Status, Visibility, VAR_TOKEN, VAR_URL, VAR_VISIBILITY};

const VERIFY_CREDENTIALS: &str = "/api/v1/accounts/verify_credentials";
const MEDIA: &str = "/api/v1/media";
const STATUSES: &str = "/api/v1/statuses";

const API_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

struct PixelfedSession {
    base_url: String,
    token: String,
    visibility: Visibility,
    username: String,
}

impl PixelfedSession {
    fn request(&self, method: HttpMethod, endpoint: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.base_url, endpoint))
            .bearer_token(self.token.as_str())
            .header("Accept", "application/json")
            .timeout(API_TIMEOUT)
    }
}

/// Pixelfed connector
pub struct PixelfedConnector {
    http_client: Arc<dyn HttpClient>,
    catalog: Arc<dyn CatalogQuery>,
    fs: Arc<dyn FileSystemAccess>,
    session: Option<PixelfedSession>,
}

impl PixelfedConnector {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        catalog: Arc<dyn CatalogQuery>,
        fs: Arc<dyn FileSystemAccess>,
    ) -> Self {
        Self {
            http_client,
            catalog,
            fs,
            session: None,
        }
    }

    /// Account the session was opened for.
    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username.as_str())
    }

    fn session(&self) -> Result<&PixelfedSession> {
        self.session.as_ref().ok_or(PixelfedError::NotConnected)
    }

    async fn required_var(&self, name: &str) -> Result<String> {
        self.catalog
            .app_var(name)
            .await?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PixelfedError::MissingSetting(name.to_string()))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<T> {
        let response = self.http_client.execute_with_retry(request, policy).await?;
        check_status(operation, &response)?;
        response.json().map_err(|e| PixelfedError::Parse {
            operation: operation.to_string(),
            message: e.to_string(),
        })
    }

    async fn open_session(&self) -> Result<PixelfedSession> {
        let base_url = self
            .required_var(VAR_URL)
            .await?
            .trim_end_matches('/')
            .to_string();
        let token = self.required_var(VAR_TOKEN).await?;
        let visibility = match self.catalog.app_var(VAR_VISIBILITY).await? {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => Visibility::default(),
        };

        let mut session = PixelfedSession {
            base_url,
            token,
            visibility,
            username: String::new(),
        };

        let account: Account = self
            .send(
                "verify_credentials",
                session.request(HttpMethod::Get, VERIFY_CREDENTIALS),
                RetryPolicy::default(),
            )
            .await?;

        info!(
            instance = %session.base_url,
            account_id = %account.id,
            username = %account.username,
            visibility = session.visibility.as_str(),
            "Authenticated to Pixelfed"
        );

        session.username = account.username;
        Ok(session)
    }

    async fn post(&self, image: &Image) -> Result<AddOutcome> {
        let session = self.session()?;
        let fields = image
            .upload_fields()
            .ok_or(PixelfedError::NotPrepared(image.id))?;

        let data = self.fs.read_file(Path::new(&image.filename)).await?;
        let form = MultipartForm::new()
            .file("file", image.name.as_str(), "application/octet-stream", data)
            .text("description", image.display_title());

        let media: MediaAttachment = self
            .send(
                "media",
                session
                    .request(HttpMethod::Post, MEDIA)
                    .multipart(form)
                    .timeout(UPLOAD_TIMEOUT),
                RetryPolicy::no_retry(),
            )
            .await?;
        debug!(media_id = %media.id, "Media uploaded");

        let status: Status = self
            .send(
                "status",
                session.request(HttpMethod::Post, STATUSES).form(&[
                    ("status", fields.caption.as_str()),
                    ("media_ids[]", media.id.as_str()),
                    ("visibility", session.visibility.as_str()),
                ]),
                RetryPolicy::no_retry(),
            )
            .await?;

        let mut outcome = AddOutcome::new(status.id.clone(), status.public_url());
        if !fields.albums.is_empty() || !fields.groups.is_empty() || !fields.others.is_empty() {
            outcome
                .warnings
                .push("album and group assignments are not supported on Pixelfed".to_string());
        }
        Ok(outcome)
    }

    async fn remove(&self, record: &PublishRecord) -> Result<()> {
        let session = self.session()?;
        let endpoint = format!("{}/{}", STATUSES, record.remote_id);

        let response = self
            .http_client
            .execute_with_retry(
                session.request(HttpMethod::Delete, &endpoint),
                RetryPolicy::no_retry(),
            )
            .await?;

        if response.status == 404 {
            warn!(status_id = %record.remote_id, "Status already gone from Pixelfed");
            return Ok(());
        }
        check_status("delete", &response)
    }
}

fn check_status(operation: &str, response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(PixelfedError::Http {
        operation: operation.to_string(),
        status_code: response.status,
        message: String::from_utf8_lossy(&response.body).chars().take(200).collect(),
    })
}

#[async_trait]
impl PlatformConnector for PixelfedConnector {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Pixelfed
    }

    #[instrument(skip(self))]
    async fn connect(&mut self) -> core_sync::Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        let session = self.open_session().await?;
        self.session = Some(session);
        Ok(())
    }

    #[instrument(skip(self, image), fields(file_id = image.id))]
    async fn commit_add(&self, image: &Image) -> core_sync::Result<AddOutcome> {
        self.post(image).await.map_err(SyncError::from)
    }

    async fn commit_update(
        &self,
        image: &Image,
        record: &PublishRecord,
    ) -> core_sync::Result<UpdateOutcome> {
        debug!(file_id = image.id, status_id = %record.remote_id, "Pixelfed statuses are not updated");
        Ok(UpdateOutcome::Unchanged)
    }

    #[instrument(skip(self, image, record), fields(file_id = image.id, status_id = %record.remote_id))]
    async fn commit_delete(&self, image: &Image, record: &PublishRecord) -> core_sync::Result<()> {
        self.remove(record).await.map_err(SyncError::from)
    }
}
