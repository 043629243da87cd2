//! # Sync Engine
//!
//! Publishes catalog images to social platforms and keeps a per-platform
//! publish record in the catalog.
//!
//! ## Overview
//!
//! For every requested platform the engine:
//! - Enumerates the images filed under `<root>|<platform>`
//! - Attaches the publish record kept in the platform's attribute set
//! - Validates each image against the platform's [`ImageProfile`]
//! - Classifies images into add, update, delete and error buckets
//! - Calls the platform through a [`PlatformConnector`] and writes back the record
//!
//! ## Components
//!
//! - **Image** (`image`): Catalog image snapshot with derived upload fields
//! - **Classifier** (`classifier`): Pure bucket assignment
//! - **Platform Controller** (`controller`): Per-platform state machine
//! - **Run Orchestrator** (`orchestrator`): Sequential multi-platform runs and totals

pub mod category;
pub mod classifier;
pub mod connector;
pub mod controller;
pub mod error;
pub mod image;
pub mod orchestrator;
pub mod platform;
pub mod profile;
pub mod record;
pub mod stats;

pub use category::{parse_category, AssignmentKind, CategoryParse};
pub use classifier::{classify, classify_all, Buckets, Classification};
pub use connector::{AddOutcome, PlatformConnector, UpdateOutcome};
pub use controller::{
    ControllerDeps, ControllerSettings, ControllerState, ImageFailure, PlatformController,
};
pub use error::{Result, SyncError};
pub use image::{Image, Membership, ShootingMetadata, UploadFields, ValidationIssue};
pub use orchestrator::{parse_platforms, PlatformReport, PlatformRun, RunSummary, SyncRunner};
pub use platform::PlatformKind;
pub use profile::{ImageProfile, RequiredField, MB};
pub use record::PublishRecord;
pub use stats::SyncStats;
