//! Signed Flickr REST client
//!
//! Every call is an OAuth 1.0a `POST`; the `oauth_*` parameters travel in the
//! form body, or as text parts of the multipart upload.

use bridge_traits::http::{
    HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RetryPolicy,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{FlickrError, Result};
use crate::oauth::{self, Nonce};
use crate::types::{FlickrCredentials, RestStatus, UploadResponse};

/// Flickr REST endpoint
pub const REST_URL: &str = "https://api.flickr.com/services/rest/";

/// Flickr upload endpoint
pub const UPLOAD_URL: &str = "https://up.flickr.com/services/upload/";

const REST_TIMEOUT: Duration = Duration::from_secs(30);

/// Uploads of large files need far longer than metadata calls.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

pub struct FlickrRestClient {
    http_client: Arc<dyn HttpClient>,
    credentials: FlickrCredentials,
}

impl FlickrRestClient {
    pub fn new(http_client: Arc<dyn HttpClient>, credentials: FlickrCredentials) -> Self {
        Self {
            http_client,
            credentials,
        }
    }

    /// Add the OAuth parameters and signature for a `POST` to `url`.
    pub fn sign(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<(String, String)>> {
        oauth::sign(&self.credentials, "POST", url, params, &Nonce::generate())
    }

    /// Call a REST method and return the decoded JSON body.
    ///
    /// Only idempotent methods should set `retry`.
    #[instrument(skip(self, params))]
    pub async fn call(&self, method: &str, params: &[(&str, &str)], retry: bool) -> Result<Value> {
        let mut all = vec![("method", method), ("format", "json"), ("nojsoncallback", "1")];
        all.extend_from_slice(params);

        let request = HttpRequest::new(HttpMethod::Post, REST_URL)
            .form(&self.sign(REST_URL, &all)?)
            .timeout(REST_TIMEOUT);

        let policy = if retry {
            RetryPolicy::default()
        } else {
            RetryPolicy::no_retry()
        };
        let response = self.http_client.execute_with_retry(request, policy).await?;
        check_status(method, &response)?;

        let body: Value = response.json().map_err(|e| FlickrError::Parse {
            method: method.to_string(),
            message: e.to_string(),
        })?;
        let status: RestStatus =
            serde_json::from_value(body.clone()).map_err(|e| FlickrError::Parse {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        if status.stat != "ok" {
            return Err(FlickrError::Api {
                method: method.to_string(),
                code: status.code.unwrap_or_default(),
                message: status.message.unwrap_or_else(|| status.stat.clone()),
            });
        }

        debug!(method, "Flickr call succeeded");
        Ok(body)
    }

    /// Call a REST method and decode the body into `T`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.call(method, params, true).await?;
        serde_json::from_value(body).map_err(|e| FlickrError::Parse {
            method: method.to_string(),
            message: e.to_string(),
        })
    }

    /// Upload a photo and return its new id. Never retried.
    #[instrument(skip(self, data, params), fields(size = data.len()))]
    pub async fn upload(&self, file_name: &str, data: Bytes, params: &[(&str, &str)]) -> Result<String> {
        let mut form = MultipartForm::new();
        for (key, value) in self.sign(UPLOAD_URL, params)? {
            form = form.text(key, value);
        }
        form = form.file("photo", file_name, content_type_for(file_name), data);

        let request = HttpRequest::new(HttpMethod::Post, UPLOAD_URL)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT);

        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await?;
        check_status("upload", &response)?;

        let body = String::from_utf8_lossy(&response.body);
        match UploadResponse::parse(&body) {
            Some(UploadResponse::Ok { photo_id }) => Ok(photo_id),
            Some(UploadResponse::Fail { code, message }) => Err(FlickrError::Api {
                method: "upload".to_string(),
                code,
                message,
            }),
            None => Err(FlickrError::Parse {
                method: "upload".to_string(),
                message: "no photoid in response".to_string(),
            }),
        }
    }
}

fn check_status(method: &str, response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(FlickrError::Http {
        method: method.to_string(),
        status_code: response.status,
        message: String::from_utf8_lossy(&response.body).chars().take(200).collect(),
    })
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait::async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> bridge_traits::error::Result<HttpResponse> {
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    fn credentials() -> FlickrCredentials {
        FlickrCredentials {
            api_key: "key".into(),
            api_secret: "secret".into(),
            auth_token: "token".into(),
            token_secret: "token-secret".into(),
        }
    }

    fn form_pairs(body: &str) -> Vec<(String, String)> {
        body.split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| {
                (
                    urlencoding::decode(k).unwrap().into_owned(),
                    urlencoding::decode(v).unwrap().into_owned(),
                )
            })
            .collect()
    }

    fn body_of(request: &HttpRequest) -> String {
        request
            .body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_sign_uses_oauth_params() {
        let client = FlickrRestClient::new(Arc::new(MockHttpClient::new()), credentials());

        let signed = client
            .sign(REST_URL, &[("photo_id", "42"), ("method", "flickr.photos.delete")])
            .unwrap();

        let value = |name: &str| {
            signed
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(value("oauth_consumer_key").as_deref(), Some("key"));
        assert_eq!(value("oauth_token").as_deref(), Some("token"));
        assert_eq!(value("oauth_signature_method").as_deref(), Some("HMAC-SHA1"));
        assert!(value("oauth_nonce").is_some());
        assert!(value("oauth_timestamp").is_some());
        assert!(value("api_sig").is_none());
        assert!(value("auth_token").is_none());
    }

    #[tokio::test]
    async fn test_call_signature_verifies_against_form() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                let mut pairs = form_pairs(&body_of(req));
                let Some(index) = pairs.iter().position(|(k, _)| k == "oauth_signature") else {
                    return false;
                };
                let (_, sent) = pairs.remove(index);

                let base = oauth::base_string("POST", REST_URL, &pairs);
                base.starts_with("POST&https%3A%2F%2Fapi.flickr.com%2Fservices%2Frest%2F&")
                    && base.contains("method%3Dflickr.photos.delete")
                    && oauth::signature("secret", "token-secret", &base).unwrap() == sent
            })
            .returning(|_| response(200, r#"{"stat":"ok"}"#));

        let client = FlickrRestClient::new(Arc::new(mock_http), credentials());
        client
            .call("flickr.photos.delete", &[("photo_id", "42")], false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_call_posts_signed_form() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                let body = body_of(req);
                req.method == HttpMethod::Post
                    && req.url == REST_URL
                    && body.contains("method=flickr.photos.setMeta")
                    && body.contains("format=json")
                    && body.contains("nojsoncallback=1")
                    && body.contains("oauth_signature=")
                    && body.contains("oauth_token=token")
                    && body.contains("title=Harbour%20at%20dusk")
            })
            .returning(|_| response(200, r#"{"stat":"ok"}"#));

        let client = FlickrRestClient::new(Arc::new(mock_http), credentials());
        let body = client
            .call(
                "flickr.photos.setMeta",
                &[("photo_id", "42"), ("title", "Harbour at dusk")],
                true,
            )
            .await
            .unwrap();
        assert_eq!(body["stat"], "ok");
    }

    #[tokio::test]
    async fn test_call_failure_status() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().returning(|_| {
            response(
                200,
                r#"{"stat":"fail","code":1,"message":"Photo \"42\" not found (invalid ID)"}"#,
            )
        });

        let client = FlickrRestClient::new(Arc::new(mock_http), credentials());
        let err = client
            .call("flickr.photos.delete", &[("photo_id", "42")], false)
            .await
            .unwrap_err();

        match err {
            FlickrError::Api { method, code, .. } => {
                assert_eq!(method, "flickr.photos.delete");
                assert_eq!(code, 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| response(502, "Bad Gateway"));

        let client = FlickrRestClient::new(Arc::new(mock_http), credentials());
        let err = client.call("flickr.test.login", &[], true).await.unwrap_err();
        assert!(matches!(err, FlickrError::Http { status_code: 502, .. }));
    }

    #[tokio::test]
    async fn test_upload_returns_photo_id() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                let body = body_of(req);
                req.url == UPLOAD_URL
                    && req
                        .headers
                        .get("Content-Type")
                        .map_or(false, |ct| ct.starts_with("multipart/form-data"))
                    && body.contains("name=\"title\"")
                    && body.contains("filename=\"IMG_0001.jpg\"")
                    && body.contains("Content-Type: image/jpeg")
                    && body.contains("name=\"oauth_signature\"")
                    && body.contains("name=\"oauth_consumer_key\"")
            })
            .returning(|_| {
                response(
                    200,
                    r#"<?xml version="1.0" encoding="utf-8" ?><rsp stat="ok"><photoid>531</photoid></rsp>"#,
                )
            });

        let client = FlickrRestClient::new(Arc::new(mock_http), credentials());
        let photo_id = client
            .upload("IMG_0001.jpg", Bytes::from_static(b"jpeg"), &[("title", "Crossing")])
            .await
            .unwrap();
        assert_eq!(photo_id, "531");
    }

    #[tokio::test]
    async fn test_upload_failure() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().returning(|_| {
            response(200, r#"<rsp stat="fail"><err code="6" msg="Filesize was too large" /></rsp>"#)
        });

        let client = FlickrRestClient::new(Arc::new(mock_http), credentials());
        let err = client
            .upload("big.tif", Bytes::from_static(b"tiff"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, FlickrError::Api { code: 6, .. }));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("b.tiff"), "image/tiff");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
