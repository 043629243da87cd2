//! Flickr platform connector
//!
//! Implements [`PlatformConnector`] for Flickr. Credentials and privacy flags
//! are read from catalog application variables on connect.

use async_trait::async_trait;
use bridge_traits::http::HttpClient;
use bridge_traits::storage::FileSystemAccess;
use core_catalog::CatalogQuery;
use core_sync::{
    AddOutcome, Image, PlatformConnector, PlatformKind, PublishRecord, SyncError, UpdateOutcome,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::client::FlickrRestClient;
use crate::error::{FlickrError, Result};
use crate::types::{
    FlickrCredentials, FlickrPrivacy, LoginResponse, VAR_API_KEY, VAR_API_SECRET,
    VAR_AUTH_TOKEN, VAR_IS_FAMILY, VAR_IS_FRIEND, VAR_IS_PUBLIC, VAR_TOKEN_SECRET,
};

/// Flickr error code for an unknown photo id.
const PHOTO_NOT_FOUND: u32 = 1;

/// Date format expected by `flickr.photos.setDates`.
const DATE_TAKEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

struct FlickrSession {
    client: FlickrRestClient,
    privacy: FlickrPrivacy,
    user_id: String,
}

/// Flickr connector
///
/// # Example
///
/// ```ignore
/// let mut connector = FlickrConnector::new(http_client, catalog, fs);
/// connector.connect().await?;
/// let outcome = connector.commit_add(&image).await?;
/// ```
pub struct FlickrConnector {
    http_client: Arc<dyn HttpClient>,
    catalog: Arc<dyn CatalogQuery>,
    fs: Arc<dyn FileSystemAccess>,
    session: Option<FlickrSession>,
}

impl FlickrConnector {
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
    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_id.as_str())
    }

    fn session(&self) -> Result<&FlickrSession> {
        self.session.as_ref().ok_or(FlickrError::NotConnected)
    }

    async fn required_var(&self, name: &str) -> Result<String> {
        self.catalog
            .app_var(name)
            .await?
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| FlickrError::MissingCredential(name.to_string()))
    }

    async fn open_session(&self) -> Result<FlickrSession> {
        let credentials = FlickrCredentials {
            api_key: self.required_var(VAR_API_KEY).await?,
            api_secret: self.required_var(VAR_API_SECRET).await?,
            auth_token: self.required_var(VAR_AUTH_TOKEN).await?,
            token_secret: self.required_var(VAR_TOKEN_SECRET).await?,
        };

        let is_public = self.catalog.app_var(VAR_IS_PUBLIC).await?;
        let is_friend = self.catalog.app_var(VAR_IS_FRIEND).await?;
        let is_family = self.catalog.app_var(VAR_IS_FAMILY).await?;
        let privacy = FlickrPrivacy::from_vars(
            is_public.as_deref(),
            is_friend.as_deref(),
            is_family.as_deref(),
        );

        let client = FlickrRestClient::new(Arc::clone(&self.http_client), credentials);
        let login: LoginResponse = client.call_as("flickr.test.login", &[]).await?;

        info!(
            user_id = %login.user.id,
            username = login.user.username.as_ref().map(|u| u.content.as_str()).unwrap_or_default(),
            public = privacy.is_public,
            "Authenticated to Flickr"
        );

        Ok(FlickrSession {
            client,
            privacy,
            user_id: login.user.id,
        })
    }

    async fn upload(&self, image: &Image) -> Result<AddOutcome> {
        let session = self.session()?;
        let fields = image
            .upload_fields()
            .ok_or(FlickrError::NotPrepared(image.id))?;

        let data = self.fs.read_file(Path::new(&image.filename)).await?;

        let mut params = vec![
            ("title", image.display_title()),
            ("description", fields.caption.as_str()),
        ];
        params.extend(session.privacy.fields());

        let photo_id = session.client.upload(&image.name, data, &params).await?;
        info!(file_id = image.id, photo_id = %photo_id, "Uploaded");

        let mut outcome = AddOutcome::new(
            photo_id.clone(),
            format!("https://www.flickr.com/photos/{}/{}", session.user_id, photo_id),
        );

        // The upload itself succeeded; follow-up failures only warn
        let photo_id = photo_id.as_str();

        if let Some(taken) = image.date_time {
            let taken = taken.format(DATE_TAKEN_FORMAT).to_string();
            let params = [
                ("photo_id", photo_id),
                ("date_taken", taken.as_str()),
                ("date_taken_granularity", "0"),
            ];
            if let Err(e) = session.client.call("flickr.photos.setDates", &params, true).await {
                outcome.warnings.push(format!("setting date taken: {}", e));
            }
        }

        for album in &fields.albums {
            let params = [("photoset_id", album.as_str()), ("photo_id", photo_id)];
            if let Err(e) = session
                .client
                .call("flickr.photosets.addPhoto", &params, false)
                .await
            {
                outcome.warnings.push(format!("adding to album {}: {}", album, e));
            }
        }

        for group in &fields.groups {
            let params = [("group_id", group.as_str()), ("photo_id", photo_id)];
            if let Err(e) = session
                .client
                .call("flickr.groups.pools.add", &params, false)
                .await
            {
                outcome.warnings.push(format!("adding to group {}: {}", group, e));
            }
        }

        for (kind, code) in &fields.others {
            debug!(kind = %kind, code = %code, "Ignoring unsupported assignment");
        }

        if !fields.tags.is_empty() {
            let tags = tag_list(&fields.tags);
            let params = [("photo_id", photo_id), ("tags", tags.as_str())];
            if let Err(e) = session.client.call("flickr.photos.addTags", &params, true).await {
                outcome.warnings.push(format!("adding tags: {}", e));
            }
        }

        Ok(outcome)
    }

    async fn update(&self, image: &Image, record: &PublishRecord) -> Result<UpdateOutcome> {
        let session = self.session()?;
        let fields = image
            .upload_fields()
            .ok_or(FlickrError::NotPrepared(image.id))?;
        let photo_id = record.remote_id.as_str();

        let params = [
            ("photo_id", photo_id),
            ("title", image.display_title()),
            ("description", fields.caption.as_str()),
        ];
        session.client.call("flickr.photos.setMeta", &params, true).await?;

        let tags = tag_list(&fields.tags);
        let params = [("photo_id", photo_id), ("tags", tags.as_str())];
        session.client.call("flickr.photos.setTags", &params, true).await?;

        Ok(UpdateOutcome::Updated)
    }

    async fn delete(&self, record: &PublishRecord) -> Result<()> {
        let session = self.session()?;
        let params = [("photo_id", record.remote_id.as_str())];

        match session.client.call("flickr.photos.delete", &params, false).await {
            Ok(_) => Ok(()),
            Err(FlickrError::Api { code, .. }) if code == PHOTO_NOT_FOUND => {
                warn!(photo_id = %record.remote_id, "Photo already gone from Flickr");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Flickr tag syntax: space separated, multi-word tags quoted.
fn tag_list(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| {
            let tag = tag.replace('"', "");
            if tag.contains(char::is_whitespace) {
                format!("\"{}\"", tag)
            } else {
                tag
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl PlatformConnector for FlickrConnector {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Flickr
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
        self.upload(image).await.map_err(SyncError::from)
    }

    #[instrument(skip(self, image, record), fields(file_id = image.id, photo_id = %record.remote_id))]
    async fn commit_update(
        &self,
        image: &Image,
        record: &PublishRecord,
    ) -> core_sync::Result<UpdateOutcome> {
        self.update(image, record).await.map_err(SyncError::from)
    }

    #[instrument(skip(self, image, record), fields(file_id = image.id, photo_id = %record.remote_id))]
    async fn commit_delete(&self, image: &Image, record: &PublishRecord) -> core_sync::Result<()> {
        self.delete(record).await.map_err(SyncError::from)
    }
}
