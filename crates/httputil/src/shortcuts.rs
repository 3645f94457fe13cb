//! One-shot helpers that build a default client for a single call

use reqwest::Response;
use serde::Serialize;

use crate::{
    client::{HttpClient, HttpClientTrait},
    error::Result,
    options::RequestOptions,
    upload::UploadFile,
};

/// GET `url` with a default client
pub async fn get(url: &str, options: &RequestOptions) -> Result<Response> {
    HttpClient::with_defaults()?.get(url, options).await
}

/// POST `body` as JSON with a default client
pub async fn post_json<T: Serialize + ?Sized>(
    url: &str,
    body: &T,
    options: &RequestOptions,
) -> Result<Response> {
    HttpClient::with_defaults()?.post_json(url, body, options).await
}

/// POST url-encoded `data` with a default client
pub async fn post_form<T: Serialize + ?Sized>(
    url: &str,
    data: &T,
    options: &RequestOptions,
) -> Result<Response> {
    HttpClient::with_defaults()?.post_form(url, data, options).await
}

/// POST a multipart form with a default client
pub async fn post_form_files<I, K, V>(
    url: &str,
    fields: I,
    files: Vec<UploadFile>,
    options: &RequestOptions,
) -> Result<Response>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    HttpClient::with_defaults()?
        .post_form_files(url, fields, files, options)
        .await
}
