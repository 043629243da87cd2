//! Supported publishing platforms

use crate::{Result, SyncError};
use serde::Serialize;
use std::str::FromStr;

/// A publishing platform known to the sync engine.
///
/// The lowercase name doubles as the catalog category segment
/// (`Socials|flickr`) and as the attribute set holding publish records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Flickr,
    Pixelfed,
}

impl PlatformKind {
    /// Every registered platform, in default run order.
    pub const ALL: [PlatformKind; 2] = [PlatformKind::Flickr, PlatformKind::Pixelfed];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Flickr => "flickr",
            PlatformKind::Pixelfed => "pixelfed",
        }
    }

    /// Name of the catalog attribute set holding this platform's publish records.
    pub fn attribute_set(&self) -> &'static str {
        self.as_str()
    }

    /// Comma-separated list of valid names, for error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(PlatformKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for PlatformKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "flickr" => Ok(PlatformKind::Flickr),
            "pixelfed" => Ok(PlatformKind::Pixelfed),
            _ => Err(SyncError::UnknownPlatform {
                name: s.to_string(),
                valid: Self::valid_names(),
            }),
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
