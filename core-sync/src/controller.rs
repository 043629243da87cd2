//! # Platform Controller
//!
//! Drives one platform through a full sync with validated state transitions.
//!
//! ## State Machine
//!
//! ```text
//! Idle → Connected → Classified → Added → Updated → Deleted → Summarized
//! ```
//!
//! Images are gathered while `Idle`. Each stage is a precondition for the
//! next. Inside the add/update/delete stages a failing image is recorded and
//! the loop continues. A publish record that cannot be written after a
//! successful remote call stops the whole process with
//! [`SyncError::BookkeepingDesync`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut controller = PlatformController::new(connector, profile, deps, settings)?;
//! controller.gather_images().await?;
//! controller.connect().await?;
//! controller.classify_images()?;
//! controller.add_images().await?;
//! controller.update_images().await?;
//! controller.delete_images().await?;
//! let stats = controller.summarise()?;
//! ```

use async_trait::async_trait;
use bridge_traits::time::Clock;
use chrono::NaiveDate;
use core_catalog::{AttributeRecord, AttributeStore, CatalogQuery, FileId};
use core_runtime::config::AppConfig;
use core_runtime::logging::strip_path;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::classifier::{classify_all, Buckets};
use crate::connector::{PlatformConnector, UpdateOutcome};
use crate::image::{Image, Membership};
use crate::orchestrator::PlatformRun;
use crate::platform::PlatformKind;
use crate::profile::{ImageProfile, MB};
use crate::record::PublishRecord;
use crate::stats::SyncStats;
use crate::{Result, SyncError};

/// Lifecycle stage of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Connected,
    Classified,
    Added,
    Updated,
    Deleted,
    Summarized,
}

impl ControllerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Connected => "connected",
            ControllerState::Classified => "classified",
            ControllerState::Added => "added",
            ControllerState::Updated => "updated",
            ControllerState::Deleted => "deleted",
            ControllerState::Summarized => "summarized",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ControllerState::Summarized)
    }
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Run options that affect a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub root_category: String,
    pub dry_run: bool,
    pub detect_withdrawn: bool,
    pub resolve_masters: bool,
}

impl ControllerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            root_category: config.root_category.clone(),
            dry_run: config.dry_run,
            detect_withdrawn: config.detect_withdrawn,
            resolve_masters: config.resolve_masters,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            root_category: "Socials".to_string(),
            dry_run: false,
            detect_withdrawn: true,
            resolve_masters: false,
        }
    }
}

/// Catalog-side collaborators shared by every controller of a run.
#[derive(Clone)]
pub struct ControllerDeps {
    pub catalog: Arc<dyn CatalogQuery>,
    pub store: Arc<dyn AttributeStore>,
    pub clock: Arc<dyn Clock>,
}

/// A per-image failure kept for the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFailure {
    pub file_id: Option<FileId>,
    pub stage: &'static str,
    pub reason: String,
}

/// Generic controller over a platform connector.
pub struct PlatformController<P: PlatformConnector> {
    connector: P,
    profile: Arc<dyn ImageProfile>,
    deps: ControllerDeps,
    settings: ControllerSettings,
    state: ControllerState,
    gathered: bool,
    session_open: bool,
    images: Vec<Image>,
    buckets: Buckets,
    stats: SyncStats,
    failures: Vec<ImageFailure>,
}

impl<P: PlatformConnector> PlatformController<P> {
    /// Create a controller in the `Idle` state.
    ///
    /// # Errors
    ///
    /// `SyncError::InvalidConfiguration` when the profile belongs to another
    /// platform than the connector.
    pub fn new(
        connector: P,
        profile: Arc<dyn ImageProfile>,
        deps: ControllerDeps,
        settings: ControllerSettings,
    ) -> Result<Self> {
        if profile.kind() != connector.kind() {
            return Err(SyncError::InvalidConfiguration {
                platform: connector.kind().to_string(),
                message: format!("image profile is for {}", profile.kind()),
            });
        }

        Ok(Self {
            connector,
            profile,
            deps,
            settings,
            state: ControllerState::Idle,
            gathered: false,
            session_open: false,
            images: Vec::new(),
            buckets: Buckets::default(),
            stats: SyncStats::default(),
            failures: Vec::new(),
        })
    }

    pub fn kind(&self) -> PlatformKind {
        self.connector.kind()
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn failures(&self) -> &[ImageFailure] {
        &self.failures
    }

    pub fn connector(&self) -> &P {
        &self.connector
    }

    /// Category path enumerated for this platform, e.g. `Socials|flickr`.
    pub fn category_path(&self) -> String {
        format!("{}|{}", self.settings.root_category, self.kind().as_str())
    }

    /// Load every image under the platform category, attach publish records,
    /// then prepare and validate each one.
    ///
    /// With withdrawn detection on, images that still carry a publish record
    /// but left the category are loaded too and marked withdrawn.
    pub async fn gather_images(&mut self) -> Result<usize> {
        if self.state != ControllerState::Idle || self.gathered {
            return Err(SyncError::InvalidStateTransition {
                from: self.state.as_str().to_string(),
                to: "gather_images".to_string(),
                reason: "Images are gathered once, before connecting".to_string(),
            });
        }

        let path = self.category_path();
        let set = self.kind().attribute_set();
        info!(category = %path, "Gathering images from catalog");

        let enumerated = self.deps.catalog.list_files_in_category(&path).await?;

        let (ids, resolved_from) = if self.settings.resolve_masters {
            self.resolve_masters(&enumerated).await?
        } else {
            (enumerated.clone(), HashMap::new())
        };

        let mut images = self.load_images(&ids).await?;

        let records = self.deps.store.get_attributes(set, &ids).await?;
        let records = index_records(&records);
        for image in &mut images {
            image.resolved_from = resolved_from.get(&image.id).copied();
            image.attach_publish_record(records.get(&image.id).copied());
        }

        if self.settings.detect_withdrawn {
            let known: HashSet<FileId> = enumerated.iter().chain(ids.iter()).copied().collect();
            images.extend(self.load_withdrawn(set, &known).await?);
        }

        let max = self.profile.max_upload_bytes();
        for image in &mut images {
            if image.membership() == Membership::Current && image.size > max {
                warn!(
                    file = strip_path(&image.filename),
                    size_mb = format!("{:.1}", image.size as f64 / MB as f64),
                    max_mb = format!("{:.1}", max as f64 / MB as f64),
                    "Image may be too large to upload"
                );
            }
            image.prepare_for_upload(&self.settings.root_category, self.profile.as_ref());
            image.validate(self.profile.as_ref());
        }

        let count = images.len();
        self.stats.total += count as u64;
        self.images = images;
        self.gathered = true;

        info!(count, "Images gathered from catalog");
        Ok(count)
    }

    /// Replace version files by their masters, dropping repeats of a master.
    async fn resolve_masters(
        &mut self,
        ids: &[FileId],
    ) -> Result<(Vec<FileId>, HashMap<FileId, FileId>)> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(ids.len());
        let mut resolved_from = HashMap::new();

        for &id in ids {
            let master = self.deps.catalog.resolve_master(id).await?;
            if !seen.insert(master) {
                info!(file_id = id, master, "Skipping duplicate of an already gathered master");
                self.stats.total += 1;
                self.stats.skipped += 1;
                continue;
            }
            if master != id {
                debug!(file_id = id, master, "Using master file");
                resolved_from.insert(master, id);
            }
            resolved.push(master);
        }

        Ok((resolved, resolved_from))
    }

    /// Build images for the given ids; incomplete records are counted and skipped.
    async fn load_images(&mut self, ids: &[FileId]) -> Result<Vec<Image>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let details = self.deps.catalog.get_file_details(ids).await?;
        let mut categories = self.deps.catalog.get_file_categories(ids).await?;

        let mut images = Vec::with_capacity(details.len());
        for record in details {
            let file_id = record.id;
            let entries = file_id
                .and_then(|id| categories.remove(&id))
                .unwrap_or_default();

            match Image::from_record(record, entries) {
                Ok(image) => images.push(image),
                Err(err) => {
                    error!(file_id = ?file_id, error = %err, "Skipping incomplete catalog record");
                    self.stats.total += 1;
                    self.stats.errored += 1;
                    self.failures.push(ImageFailure {
                        file_id,
                        stage: "gather",
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(images)
    }

    /// Images with a publish record that are no longer under the category.
    async fn load_withdrawn(&mut self, set: &str, known: &HashSet<FileId>) -> Result<Vec<Image>> {
        let published = self.deps.store.list_published(set).await?;

        let mut withdrawn_records: HashMap<FileId, AttributeRecord> = HashMap::new();
        let mut withdrawn_ids = Vec::new();
        for record in published {
            if known.contains(&record.file_id) || withdrawn_records.contains_key(&record.file_id) {
                continue;
            }
            withdrawn_ids.push(record.file_id);
            withdrawn_records.insert(record.file_id, record);
        }

        if withdrawn_ids.is_empty() {
            return Ok(Vec::new());
        }

        info!(count = withdrawn_ids.len(), "Published images no longer in category");

        let mut images = self.load_images(&withdrawn_ids).await?;
        for image in &mut images {
            image.mark_withdrawn();
            image.attach_publish_record(withdrawn_records.get(&image.id));
        }

        let loaded: HashSet<FileId> = images.iter().map(|image| image.id).collect();
        for id in withdrawn_ids.iter().filter(|id| !loaded.contains(id)) {
            warn!(file_id = id, "Published file is gone from the catalog; leaving it on the platform");
            self.stats.total += 1;
            self.stats.skipped += 1;
        }

        Ok(images)
    }

    /// Open the platform session. A second call is a no-op.
    ///
    /// No session is opened in dry-run mode or when no image can be published.
    pub async fn connect(&mut self) -> Result<()> {
        if self.state == ControllerState::Connected {
            debug!("Already connected");
            return Ok(());
        }
        self.validate_transition(ControllerState::Connected)?;
        if !self.gathered {
            return Err(SyncError::InvalidStateTransition {
                from: self.state.as_str().to_string(),
                to: ControllerState::Connected.as_str().to_string(),
                reason: "Images must be gathered before connecting".to_string(),
            });
        }

        if self.settings.dry_run {
            info!("Dry run: not connecting to platform");
        } else if !self.images.iter().any(Image::is_valid) {
            info!("Nothing to publish: not connecting to platform");
        } else if !self.session_open {
            info!("Connecting to platform");
            self.connector.connect().await?;
            self.session_open = true;
            info!("Connected to platform");
        }

        self.state = ControllerState::Connected;
        Ok(())
    }

    /// Split the gathered images into add/update/delete/error buckets.
    pub fn classify_images(&mut self) -> Result<&Buckets> {
        self.transition(ControllerState::Classified)?;

        self.buckets = classify_all(&self.images);

        for (index, reasons) in &self.buckets.error {
            let image = &self.images[*index];
            error!(
                file = strip_path(&image.filename),
                file_id = image.id,
                reasons = %reasons.join("; "),
                "Image cannot be published"
            );
            self.failures.push(ImageFailure {
                file_id: Some(image.id),
                stage: "validate",
                reason: reasons.join("; "),
            });
        }
        self.stats.errored += self.buckets.error.len() as u64;

        info!(
            add = self.buckets.add.len(),
            update = self.buckets.update.len(),
            delete = self.buckets.delete.len(),
            error = self.buckets.error.len(),
            "Images classified"
        );

        Ok(&self.buckets)
    }

    /// Upload every image in the add bucket and record where it went.
    pub async fn add_images(&mut self) -> Result<()> {
        self.transition(ControllerState::Added)?;

        let indices = self.buckets.add.clone();
        let count = indices.len();

        for (position, index) in indices.into_iter().enumerate() {
            let image = &self.images[index];
            let file_id = image.id;

            if self.settings.dry_run {
                info!(file = strip_path(&image.filename), "Dry run: would upload");
                self.stats.skipped += 1;
                continue;
            }

            info!(
                file = strip_path(&image.filename),
                size_mb = format!("{:.1}", image.size as f64 / MB as f64),
                progress = format!("{}/{}", position + 1, count),
                "Uploading"
            );

            match self.connector.commit_add(image).await {
                Ok(outcome) => {
                    for warning in &outcome.warnings {
                        warn!(file_id, warning = %warning, "Upload follow-up step failed");
                    }
                    let record = PublishRecord::new(outcome.remote_id, outcome.url, self.today());
                    self.write_record(file_id, &record).await?;
                    self.stats.added += 1;
                }
                Err(err) => self.record_failure(file_id, "add", &err),
            }
        }

        Ok(())
    }

    /// Refresh every image in the update bucket.
    pub async fn update_images(&mut self) -> Result<()> {
        self.transition(ControllerState::Updated)?;

        for index in self.buckets.update.clone() {
            let image = &self.images[index];
            let file_id = image.id;

            let Some(record) = image.publish_record().cloned() else {
                self.record_failure_message(file_id, "update", "publish record missing".to_string());
                continue;
            };

            if self.settings.dry_run {
                info!(file = strip_path(&image.filename), remote_id = %record.remote_id, "Dry run: would update");
                self.stats.skipped += 1;
                continue;
            }

            match self.connector.commit_update(image, &record).await {
                Ok(UpdateOutcome::Updated) => {
                    info!(file_id, remote_id = %record.remote_id, "Updated");
                    self.write_record(file_id, &record.touched(self.today()))
                        .await?;
                    self.stats.updated += 1;
                }
                Ok(UpdateOutcome::Unchanged) => {
                    debug!(file_id, remote_id = %record.remote_id, "No update needed");
                    self.stats.skipped += 1;
                }
                Err(err) => self.record_failure(file_id, "update", &err),
            }
        }

        Ok(())
    }

    /// Remove every withdrawn image from the platform, then drop its record.
    pub async fn delete_images(&mut self) -> Result<()> {
        self.transition(ControllerState::Deleted)?;

        for index in self.buckets.delete.clone() {
            let image = &self.images[index];
            let file_id = image.id;

            let Some(record) = image.publish_record().cloned() else {
                self.record_failure_message(file_id, "delete", "publish record missing".to_string());
                continue;
            };

            if self.settings.dry_run {
                info!(file = strip_path(&image.filename), remote_id = %record.remote_id, "Dry run: would delete");
                self.stats.skipped += 1;
                continue;
            }

            match self.connector.commit_delete(image, &record).await {
                Ok(()) => {
                    info!(file_id, remote_id = %record.remote_id, "Deleted from platform");
                    self.remove_record(file_id, &record).await?;
                    self.stats.deleted += 1;
                }
                Err(err) => self.record_failure(file_id, "delete", &err),
            }
        }

        Ok(())
    }

    /// Log the final counts and return them.
    pub fn summarise(&mut self) -> Result<SyncStats> {
        self.transition(ControllerState::Summarized)?;
        self.log_summary();
        Ok(self.stats)
    }

    fn log_summary(&self) {
        info!(stats = %self.stats, "Platform summary");
        for (label, count) in self.stats.entries() {
            info!("-- {} {} images", count, label);
        }
    }

    fn today(&self) -> NaiveDate {
        self.deps.clock.now().date_naive()
    }

    async fn write_record(&self, file_id: FileId, record: &PublishRecord) -> Result<()> {
        let set = self.kind().attribute_set();
        match self
            .deps
            .store
            .set_attributes(set, file_id, &record.to_attributes())
            .await
        {
            Ok(op) => {
                debug!(file_id, op = op.as_str(), remote_id = %record.remote_id, "Publish record written");
                Ok(())
            }
            Err(source) => {
                error!(file_id, remote_id = %record.remote_id, error = %source, "Publish record write failed");
                Err(SyncError::BookkeepingDesync {
                    platform: self.kind().to_string(),
                    file_id,
                    remote_id: Some(record.remote_id.clone()),
                    source,
                })
            }
        }
    }

    async fn remove_record(&self, file_id: FileId, record: &PublishRecord) -> Result<()> {
        let set = self.kind().attribute_set();
        self.deps
            .store
            .delete_attributes(set, file_id)
            .await
            .map_err(|source| {
                error!(file_id, remote_id = %record.remote_id, error = %source, "Publish record removal failed");
                SyncError::BookkeepingDesync {
                    platform: self.kind().to_string(),
                    file_id,
                    remote_id: Some(record.remote_id.clone()),
                    source,
                }
            })
    }

    fn record_failure(&mut self, file_id: FileId, stage: &'static str, err: &SyncError) {
        error!(file_id, stage, error = %err, "Remote call failed");
        self.record_failure_message(file_id, stage, err.to_string());
    }

    fn record_failure_message(&mut self, file_id: FileId, stage: &'static str, reason: String) {
        self.stats.errored += 1;
        self.failures.push(ImageFailure {
            file_id: Some(file_id),
            stage,
            reason,
        });
    }

    fn transition(&mut self, to: ControllerState) -> Result<()> {
        self.validate_transition(to)?;
        debug!(from = self.state.as_str(), to = to.as_str(), "Controller transition");
        self.state = to;
        Ok(())
    }

    /// Validate a state transition
    fn validate_transition(&self, to: ControllerState) -> Result<()> {
        use ControllerState::*;

        let valid = matches!(
            (self.state, to),
            (Idle, Connected)
                | (Connected, Classified)
                | (Classified, Added)
                | (Added, Updated)
                | (Updated, Deleted)
                | (Deleted, Summarized)
        );

        if !valid {
            return Err(SyncError::InvalidStateTransition {
                from: self.state.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!(
                    "Cannot transition from {} to {}",
                    self.state.as_str(),
                    to.as_str()
                ),
            });
        }

        Ok(())
    }
}

fn index_records(records: &[AttributeRecord]) -> HashMap<FileId, &AttributeRecord> {
    let mut indexed = HashMap::with_capacity(records.len());
    for record in records {
        // Only one instance per file is managed; prefer it if several exist
        let entry = indexed.entry(record.file_id).or_insert(record);
        if record.instance_id == core_catalog::types::ATTRIBUTE_INSTANCE {
            *entry = record;
        }
    }
    indexed
}

#[async_trait]
impl<P: PlatformConnector + 'static> PlatformRun for PlatformController<P> {
    fn kind(&self) -> PlatformKind {
        self.connector.kind()
    }

    fn stats(&self) -> SyncStats {
        self.stats
    }

    async fn run(&mut self) -> Result<SyncStats> {
        self.gather_images().await?;
        self.connect().await?;
        self.classify_images()?;

        let mutations = async {
            self.add_images().await?;
            self.update_images().await?;
            self.delete_images().await
        }
        .await;

        if let Err(err) = mutations {
            self.log_summary();
            return Err(err);
        }

        self.summarise()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::test_support::TestProfile;
    use bridge_traits::time::FixedClock;
    use chrono::{TimeZone, Utc};
    use core_catalog::{AttributeOp, CatalogError, CategoryEntry, FileRecord};
    use serde_json::{Map, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct NullCatalog;

    #[async_trait]
    impl CatalogQuery for NullCatalog {
        async fn list_files_in_category(&self, _path: &str) -> core_catalog::Result<Vec<FileId>> {
            Ok(vec![1])
        }
        async fn get_file_details(&self, ids: &[FileId]) -> core_catalog::Result<Vec<FileRecord>> {
            Ok(ids
                .iter()
                .map(|id| FileRecord {
                    id: Some(*id),
                    file_name: Some(format!("/p/{}.jpg", id)),
                    size: MB,
                    title: Some("t".into()),
                    description: Some("d".into()),
                    ..Default::default()
                })
                .collect())
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

    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<(FileId, Map<String, Value>)>>,
    }

    #[async_trait]
    impl AttributeStore for RecordingStore {
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
            file_id: FileId,
            data: &Map<String, Value>,
        ) -> core_catalog::Result<AttributeOp> {
            self.writes.lock().unwrap().push((file_id, data.clone()));
            Ok(AttributeOp::Add)
        }
        async fn delete_attributes(&self, _set: &str, _id: FileId) -> core_catalog::Result<()> {
            Ok(())
        }
        async fn list_published(&self, _set: &str) -> core_catalog::Result<Vec<AttributeRecord>> {
            Err(CatalogError::Authentication("not used".into()))
        }
    }

    #[derive(Default)]
    struct CountingConnector {
        connects: usize,
    }

    #[async_trait]
    impl PlatformConnector for CountingConnector {
        fn kind(&self) -> PlatformKind {
            PlatformKind::Flickr
        }
        async fn connect(&mut self) -> Result<()> {
            self.connects += 1;
            Ok(())
        }
        async fn commit_add(&self, image: &Image) -> Result<crate::AddOutcome> {
            Ok(crate::AddOutcome::new(format!("r{}", image.id), "u"))
        }
        async fn commit_update(&self, _image: &Image, _record: &PublishRecord) -> Result<UpdateOutcome> {
            Ok(UpdateOutcome::Unchanged)
        }
        async fn commit_delete(&self, _image: &Image, _record: &PublishRecord) -> Result<()> {
            Ok(())
        }
    }

    fn controller(store: Arc<RecordingStore>) -> PlatformController<CountingConnector> {
        let deps = ControllerDeps {
            catalog: Arc::new(NullCatalog),
            store,
            clock: Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap())),
        };
        let settings = ControllerSettings {
            detect_withdrawn: false,
            ..Default::default()
        };
        PlatformController::new(
            CountingConnector::default(),
            Arc::new(TestProfile::default()),
            deps,
            settings,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_stages_must_run_in_order() {
        let mut controller = controller(Arc::new(RecordingStore::default()));

        assert!(matches!(
            controller.classify_images(),
            Err(SyncError::InvalidStateTransition { .. })
        ));
        assert!(controller.add_images().await.is_err());
        assert!(controller.summarise().is_err());
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_connect_requires_gathered_images() {
        let mut controller = controller(Arc::new(RecordingStore::default()));

        assert!(matches!(
            controller.connect().await,
            Err(SyncError::InvalidStateTransition { .. })
        ));
        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(controller.connector().connects, 0);

        // Still possible to run the stages in order afterwards
        assert_eq!(controller.gather_images().await.unwrap(), 1);
        controller.connect().await.unwrap();
        assert_eq!(controller.classify_images().unwrap().add.len(), 1);
    }

    #[tokio::test]
    async fn test_connect_is_memoized() {
        let mut controller = controller(Arc::new(RecordingStore::default()));
        controller.gather_images().await.unwrap();

        controller.connect().await.unwrap();
        controller.connect().await.unwrap();

        assert_eq!(controller.connector().connects, 1);
        assert_eq!(controller.state(), ControllerState::Connected);
    }

    #[tokio::test]
    async fn test_gather_only_once() {
        let mut controller = controller(Arc::new(RecordingStore::default()));
        controller.gather_images().await.unwrap();
        assert!(controller.gather_images().await.is_err());
    }

    #[tokio::test]
    async fn test_publish_date_comes_from_clock() {
        let store = Arc::new(RecordingStore::default());
        let mut controller = controller(Arc::clone(&store));

        let stats = controller.run().await.unwrap();

        assert_eq!(stats.added, 1);
        assert_eq!(controller.state(), ControllerState::Summarized);
        assert!(controller.state().is_terminal());
        let writes = store.writes.lock().unwrap();
        assert_eq!(writes[0].0, 1);
        assert_eq!(writes[0].1["posted"], "2024-03-09");
        assert_eq!(writes[0].1["photo_id"], "r1");
    }

    #[test]
    fn test_profile_must_match_connector() {
        struct PixelfedProfile;
        impl ImageProfile for PixelfedProfile {
            fn kind(&self) -> PlatformKind {
                PlatformKind::Pixelfed
            }
            fn max_upload_bytes(&self) -> u64 {
                MB
            }
        }

        let deps = ControllerDeps {
            catalog: Arc::new(NullCatalog),
            store: Arc::new(RecordingStore::default()),
            clock: Arc::new(bridge_traits::time::SystemClock),
        };
        let result = PlatformController::new(
            CountingConnector::default(),
            Arc::new(PixelfedProfile),
            deps,
            ControllerSettings::default(),
        );
        assert!(matches!(result, Err(SyncError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_settings_from_config() {
        let config = AppConfig::builder()
            .catalog_user("dave")
            .root_category("Social")
            .dry_run(true)
            .resolve_masters(true)
            .build()
            .unwrap();

        let settings = ControllerSettings::from_config(&config);
        assert_eq!(settings.root_category, "Social");
        assert!(settings.dry_run);
        assert!(settings.detect_withdrawn);
        assert!(settings.resolve_masters);
    }
}
