//! # Flickr Provider
//!
//! Implements `PlatformConnector` for Flickr.
//!
//! ## Overview
//!
//! This module provides:
//! - OAuth 1.0a (HMAC-SHA1) signed REST calls and multipart photo upload
//! - Credentials and privacy flags from catalog application variables
//! - Album, group, date-taken and tag follow-ups after each upload
//! - Metadata refresh and photo removal for published images

pub mod client;
pub mod connector;
pub mod error;
pub mod oauth;
pub mod profile;
pub mod types;

pub use client::FlickrRestClient;
pub use connector::FlickrConnector;
pub use error::{FlickrError, Result};
pub use profile::{FlickrProfile, FLICKR_MAX_UPLOAD};
pub use types::{FlickrCredentials, FlickrPrivacy};
