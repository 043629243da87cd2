//! Pixelfed API types

use serde::Deserialize;
use std::str::FromStr;

use crate::error::PixelfedError;

/// Catalog application variables read on connect.
pub const VAR_URL: &str = "pixelfed_url";
pub const VAR_TOKEN: &str = "pixelfed_token";
pub const VAR_VISIBILITY: &str = "pixelfed_visibility";

/// Status visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
        }
    }
}

impl FromStr for Visibility {
    type Err = PixelfedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "unlisted" => Ok(Visibility::Unlisted),
            "private" => Ok(Visibility::Private),
            _ => Err(PixelfedError::InvalidSetting {
                name: VAR_VISIBILITY.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// `GET /api/v1/accounts/verify_credentials`
#[derive(Debug, Deserialize)]
pub(crate) struct Account {
    pub id: String,
    #[serde(default)]
    pub username: String,
}

/// `POST /api/v1/media`
#[derive(Debug, Deserialize)]
pub(crate) struct MediaAttachment {
    pub id: String,
}

/// `POST /api/v1/statuses`
#[derive(Debug, Deserialize)]
pub(crate) struct Status {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl Status {
    pub fn public_url(&self) -> String {
        self.url
            .clone()
            .or_else(|| self.uri.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_str() {
        assert_eq!("Unlisted".parse::<Visibility>().unwrap(), Visibility::Unlisted);
        assert_eq!(Visibility::default().as_str(), "public");
        assert!(matches!(
            "friends".parse::<Visibility>(),
            Err(PixelfedError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_status_url_falls_back_to_uri() {
        let status: Status =
            serde_json::from_str(r#"{"id":"77","uri":"https://pixey.org/p/dave/77"}"#).unwrap();
        assert_eq!(status.public_url(), "https://pixey.org/p/dave/77");
    }

    #[test]
    fn test_media_ids_are_strings() {
        let media: MediaAttachment =
            serde_json::from_str(r#"{"id":"6543","type":"image"}"#).unwrap();
        assert_eq!(media.id, "6543");
    }
}
