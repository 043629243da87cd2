//! OAuth 1.0a request signing
//!
//! Flickr accepts `HMAC-SHA1` signatures computed over the signature base
//! string `METHOD&url&params`, keyed with `consumer_secret&token_secret`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use uuid::Uuid;

use crate::error::{FlickrError, Result};
use crate::types::FlickrCredentials;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// Single-use values that make each signed request unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce {
    pub value: String,
    pub timestamp: i64,
}

impl Nonce {
    pub fn generate() -> Self {
        Self {
            value: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// RFC 3986 encoding; only unreserved characters pass through.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Signature base string. Parameters are sorted by encoded key, then value.
pub fn base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&normalized)
    )
}

/// Base64 HMAC-SHA1 of `base` keyed with both secrets.
pub fn signature(consumer_secret: &str, token_secret: &str, base: &str) -> Result<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| FlickrError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Return `params` with the protocol parameters and `oauth_signature` added.
pub fn sign(
    credentials: &FlickrCredentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    nonce: &Nonce,
) -> Result<Vec<(String, String)>> {
    let mut signed: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    signed.extend(
        [
            ("oauth_consumer_key", credentials.api_key.clone()),
            ("oauth_nonce", nonce.value.clone()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", nonce.timestamp.to_string()),
            ("oauth_token", credentials.auth_token.clone()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ]
        .map(|(k, v)| (k.to_string(), v)),
    );

    let base = base_string(method, url, &signed);
    let signature = signature(&credentials.api_secret, &credentials.token_secret, &base)?;
    signed.push(("oauth_signature".to_string(), signature));
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

    // Published OAuth 1.0a worked example.
    fn credentials() -> FlickrCredentials {
        FlickrCredentials {
            api_key: "xvz1evFS4wEEPTGEFPHBog".into(),
            api_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".into(),
            auth_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".into(),
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".into(),
        }
    }

    fn nonce() -> Nonce {
        Nonce {
            value: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".into(),
            timestamp: 1318622958,
        }
    }

    const PARAMS: [(&str, &str); 2] = [
        ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
        ("include_entities", "true"),
    ];

    #[test]
    fn test_percent_encode_unreserved_only() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(percent_encode("!*'()"), "%21%2A%27%28%29");
    }

    #[test]
    fn test_base_string_matches_worked_example() {
        let signed = sign(&credentials(), "POST", URL, &PARAMS, &nonce()).unwrap();
        let unsigned: Vec<(String, String)> = signed
            .into_iter()
            .filter(|(k, _)| k != "oauth_signature")
            .collect();

        assert_eq!(
            base_string("post", URL, &unsigned),
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
             include_entities%3Dtrue%26\
             oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
             oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
             oauth_signature_method%3DHMAC-SHA1%26\
             oauth_timestamp%3D1318622958%26\
             oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
             oauth_version%3D1.0%26\
             status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn test_signature_matches_worked_example() {
        let signed = sign(&credentials(), "POST", URL, &PARAMS, &nonce()).unwrap();

        let (key, value) = signed.last().unwrap();
        assert_eq!(key, "oauth_signature");
        assert_eq!(value, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_sign_adds_protocol_params() {
        let signed = sign(&credentials(), "POST", URL, &[("photo_id", "42")], &nonce()).unwrap();
        let keys: Vec<&str> = signed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "photo_id",
                "oauth_consumer_key",
                "oauth_nonce",
                "oauth_signature_method",
                "oauth_timestamp",
                "oauth_token",
                "oauth_version",
                "oauth_signature",
            ]
        );
        assert!(!keys.contains(&"api_sig"));
    }

    #[test]
    fn test_signature_depends_on_token_secret() {
        let base = "POST&url&a%3D1";
        let first = signature("consumer", "token-a", base).unwrap();
        let second = signature("consumer", "token-b", base).unwrap();
        assert_ne!(first, second);
        assert_eq!(first, signature("consumer", "token-a", base).unwrap());
    }

    #[test]
    fn test_generated_nonces_differ() {
        let first = Nonce::generate();
        let second = Nonce::generate();
        assert_ne!(first.value, second.value);
        assert_eq!(first.value.len(), 32);
        assert!(first.timestamp > 1_600_000_000);
    }
}
