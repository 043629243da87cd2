//! # Host Bridge Traits
//!
//! Abstraction traits between the sync core and the host environment.
//!
//! ## Overview
//!
//! The catalog client and the platform connectors never talk to `reqwest` or
//! `tokio::fs` directly. They depend on the traits defined here, which lets
//! tests drive them with mocks and keeps the transport swappable.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry policies
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Reading image files for upload
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should convert transport-specific errors to `BridgeError`
//! and keep the distinction between "unreachable" and "answered with an error".
//!
//! ## Implementing HttpClient
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use http::{
    encode_form, HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RetryPolicy,
};
pub use storage::{FileMetadata, FileSystemAccess};
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
