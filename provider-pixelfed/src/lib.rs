//! # Pixelfed Provider
//!
//! Implements `PlatformConnector` for Pixelfed over its Mastodon-compatible API.
//!
//! ## Overview
//!
//! This module provides:
//! - Bearer-token sessions against a configured instance
//! - Media upload followed by a status carrying the caption
//! - Status removal for withdrawn images
//!
//! Statuses cannot be edited through this API, so updates are reported as
//! unchanged.

pub mod connector;
pub mod error;
pub mod profile;
pub mod types;

pub use connector::PixelfedConnector;
pub use error::{PixelfedError, Result};
pub use profile::{PixelfedProfile, PIXELFED_CAPTION_LIMIT, PIXELFED_MAX_UPLOAD};
pub use types::Visibility;
