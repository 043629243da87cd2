//! Flickr API types

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Deserialize;

/// Catalog application variables read on connect.
pub const VAR_API_KEY: &str = "flickr_apikey";
pub const VAR_API_SECRET: &str = "flickr_apisecret";
pub const VAR_AUTH_TOKEN: &str = "flickr_auth_token";
pub const VAR_TOKEN_SECRET: &str = "flickr_token_secret";
pub const VAR_IS_PUBLIC: &str = "flickr_is_public";
pub const VAR_IS_FRIEND: &str = "flickr_is_friend";
pub const VAR_IS_FAMILY: &str = "flickr_is_family";

/// OAuth 1.0a signing material for REST and upload calls.
#[derive(Clone, PartialEq, Eq)]
pub struct FlickrCredentials {
    /// Consumer key
    pub api_key: String,
    /// Consumer secret
    pub api_secret: String,
    /// Access token
    pub auth_token: String,
    /// Access token secret
    pub token_secret: String,
}

impl std::fmt::Debug for FlickrCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlickrCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("auth_token", &"<redacted>")
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

/// Visibility flags sent with every upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlickrPrivacy {
    pub is_public: bool,
    pub is_friend: bool,
    pub is_family: bool,
}

impl FlickrPrivacy {
    /// Build from raw application variable values. Unset means private.
    pub fn from_vars(
        is_public: Option<&str>,
        is_friend: Option<&str>,
        is_family: Option<&str>,
    ) -> Self {
        Self {
            is_public: flag(is_public),
            is_friend: flag(is_friend),
            is_family: flag(is_family),
        }
    }

    /// Upload form fields, as `0`/`1`.
    pub fn fields(&self) -> [(&'static str, &'static str); 3] {
        let bit = |value: bool| if value { "1" } else { "0" };
        [
            ("is_public", bit(self.is_public)),
            ("is_friend", bit(self.is_friend)),
            ("is_family", bit(self.is_family)),
        ]
    }
}

fn flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

/// Envelope shared by every JSON REST response.
#[derive(Debug, Deserialize)]
pub(crate) struct RestStatus {
    pub stat: String,
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `flickr.test.login`
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub user: LoginUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<Content>,
}

/// Flickr wraps scalar values as `{"_content": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Content {
    #[serde(rename = "_content")]
    pub content: String,
}

/// Outcome of the XML upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UploadResponse {
    Ok { photo_id: String },
    Fail { code: u32, message: String },
}

impl UploadResponse {
    /// Parse `<rsp stat="ok"><photoid>..</photoid></rsp>` or the `<err>` form.
    ///
    /// Returns `None` for malformed XML or a body with neither element.
    pub fn parse(xml: &str) -> Option<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut photo_id: Option<String> = None;
        let mut failure = None;
        loop {
            match reader.read_event().ok()? {
                Event::Start(e) if e.local_name().as_ref() == b"photoid" => {
                    photo_id = Some(String::new())
                }
                Event::Text(text) => {
                    if let Some(id) = photo_id.as_mut() {
                        id.push_str(text.unescape().ok()?.trim());
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"photoid" => {
                    match photo_id.take() {
                        Some(id) if !id.is_empty() => {
                            return Some(UploadResponse::Ok { photo_id: id })
                        }
                        _ => {}
                    }
                }
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"err" => {
                    failure = Some(UploadResponse::Fail {
                        code: attribute(&e, "code")
                            .and_then(|c| c.parse().ok())
                            .unwrap_or_default(),
                        message: attribute(&e, "msg").unwrap_or_default(),
                    });
                }
                Event::Eof => return failure,
                _ => {}
            }
        }
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Option<String> {
    let attribute = element.try_get_attribute(name).ok()??;
    attribute.unescape_value().ok().map(|v| v.into_owned())
}
