//! Ergonomic HTTP client helpers over reqwest
//!
//! Provides a configurable client, per-request option overlays, verb helpers
//! and response readers.
//!
//! ## Features
//!
//! - **Trait-based design**: Mockable via `HttpClientTrait`
//! - **Configurable**: Timeouts, proxy, user-agent, idle connection limits
//! - **Per-call options**: Headers, referer, content type and timeout merged onto client defaults
//! - **Body helpers**: Form, JSON and multipart requests
//! - **Response readers**: Charset-aware text, JSON decoding, streaming to disk
//! - **Cookie jar**: Shared across calls, optionally scoped by a public suffix list
//!
//! ```no_run
//! use httputil::{read_json, HttpClient, HttpConfig, RequestOptions};
//!
//! # async fn run() -> httputil::Result<()> {
//! let client = HttpClient::new(HttpConfig::new().with_user_agent("demo/1.0"))?;
//! let response = client
//!     .post_json("https://httpbin.org/post", &serde_json::json!({"foo": "bar"}), &RequestOptions::new())
//!     .await?;
//! let echo: serde_json::Value = read_json(response).await?;
//! # Ok(())
//! # }
//! ```

pub mod charset;
pub mod client;
pub mod config;
pub mod cookie;
pub mod error;
pub mod options;
pub mod response;
pub mod shortcuts;
pub mod upload;

pub use client::{shared_client, HttpClient, HttpClientTrait, UPLOAD_TIMEOUT};
pub use config::HttpConfig;
pub use cookie::CookieJar;
pub use error::{HttpError, Result};
pub use options::RequestOptions;
pub use response::{read_all, read_any_json, read_json, read_string, save_file};
pub use upload::UploadFile;

/// Re-export commonly used types
pub use reqwest::{header, Body, Method, Request, Response, StatusCode};
pub use tokio_util::sync::CancellationToken;
