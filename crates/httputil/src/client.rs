//! HTTP client implementation

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, REFERER, USER_AGENT},
    Body, Method, Request, Response,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    config::HttpConfig,
    cookie::CookieJar,
    error::{HttpError, Result},
    options::RequestOptions,
    upload::{build_form, UploadFile},
};

/// Fixed timeout of [`HttpClient::upload_form_files`], regardless of per-call options
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Mockable HTTP client trait
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    /// Send a prepared request with per-call options
    async fn execute(&self, request: Request, options: &RequestOptions) -> Result<Response>;

    /// Execute a GET request
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<Response>;

    /// Execute a HEAD request
    async fn head(&self, url: &str, options: &RequestOptions) -> Result<Response>;

    /// Execute a POST request
    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<Response>;

    /// Execute a PUT request
    async fn put(
        &self,
        url: &str,
        content_type: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<Response>;

    /// Execute a PATCH request
    async fn patch(
        &self,
        url: &str,
        content_type: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<Response>;

    /// Execute a DELETE request
    async fn delete(&self, url: &str, options: &RequestOptions) -> Result<Response>;
}

/// Production HTTP client
pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
    cookies: Arc<CookieJar>,
    cancel: Option<CancellationToken>,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let cookies = Arc::new(match &config.public_suffix_list {
            Some(path) => CookieJar::from_suffix_list_file(path)?,
            None => CookieJar::new()?,
        });

        let mut builder = reqwest::Client::builder().cookie_provider(Arc::clone(&cookies));

        // Transport tuning only applies to proxied connections
        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| HttpError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);

            if let Some(timeout) = config.connect_timeout() {
                builder = builder.connect_timeout(timeout);
            }
            if !config.keep_alive_timeout.is_zero() {
                builder = builder.tcp_keepalive(config.keep_alive_timeout);
            }
            if let Some(max_idle) = config.max_idle_per_host {
                builder = builder.pool_max_idle_per_host(max_idle);
            }
            if let Some(idle_timeout) = config.idle_timeout {
                builder = builder.pool_idle_timeout(idle_timeout);
            }
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        debug!(
            proxy = config.proxy.as_deref().unwrap_or("none"),
            "HTTP client created"
        );

        Ok(Self {
            inner,
            config,
            cookies,
            cancel: None,
        })
    }

    /// Create HTTP client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpConfig::default())
    }

    /// Fail pending requests with [`HttpError::Cancelled`] once `token` fires
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Get underlying reqwest client (for advanced usage)
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Cookie jar shared by every request on this client
    pub fn cookie_jar(&self) -> &Arc<CookieJar> {
        &self.cookies
    }

    /// Drop this client's handle on the connection pool.
    ///
    /// Idle connections are closed once no other handle to the underlying
    /// client remains; in-flight requests are not interrupted.
    pub fn close(self) {
        debug!("HTTP client closed");
    }

    /// Build a request for `method` on `url`
    pub fn build_request(&self, method: Method, url: &str, body: Option<Body>) -> Result<Request> {
        let url = parse_url(url)?;

        let mut request = self.inner.request(method, url);
        if let Some(body) = body {
            request = request.body(body);
        }
        Ok(request.build()?)
    }

    async fn send_with(
        &self,
        method: Method,
        url: &str,
        body: Option<Body>,
        options: &RequestOptions,
    ) -> Result<Response> {
        let request = self.build_request(method, url, body)?;
        self.execute(request, options).await
    }

    async fn send_body(
        &self,
        method: Method,
        url: &str,
        content_type: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<Response> {
        let options = RequestOptions::new()
            .with_content_type(content_type)
            .overlay(options);
        self.send_with(method, url, Some(body), &options).await
    }

    /// POST `data` url-encoded as `application/x-www-form-urlencoded`
    pub async fn post_form<T: Serialize + ?Sized>(
        &self,
        url: &str,
        data: &T,
        options: &RequestOptions,
    ) -> Result<Response> {
        let body = serde_urlencoded::to_string(data)?;
        self.post(url, FORM_CONTENT_TYPE, Body::from(body), options)
            .await
    }

    /// POST `body` as JSON
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        options: &RequestOptions,
    ) -> Result<Response> {
        let payload = serde_json::to_vec(body)?;
        self.post(url, JSON_CONTENT_TYPE, Body::from(payload), options)
            .await
    }

    /// PUT `body` as JSON
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        options: &RequestOptions,
    ) -> Result<Response> {
        let payload = serde_json::to_vec(body)?;
        self.put(url, JSON_CONTENT_TYPE, Body::from(payload), options)
            .await
    }

    /// PATCH `body` as JSON
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        options: &RequestOptions,
    ) -> Result<Response> {
        let payload = serde_json::to_vec(body)?;
        self.patch(url, JSON_CONTENT_TYPE, Body::from(payload), options)
            .await
    }

    /// POST a `multipart/form-data` body: `fields` first, then `files`
    pub async fn post_form_files<I, K, V>(
        &self,
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
        self.send_multipart(url, fields, files, options, None)
            .await
    }

    /// Like [`post_form_files`](Self::post_form_files), always bounded by
    /// [`UPLOAD_TIMEOUT`]; a timeout in `options` is ignored
    pub async fn upload_form_files<I, K, V>(
        &self,
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
        self.send_multipart(url, fields, files, options, Some(UPLOAD_TIMEOUT))
            .await
    }

    async fn send_multipart<I, K, V>(
        &self,
        url: &str,
        fields: I,
        files: Vec<UploadFile>,
        options: &RequestOptions,
        forced_timeout: Option<Duration>,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let url = parse_url(url)?;
        let form = build_form(fields, files).await?;

        let mut request = self.inner.post(url).multipart(form).build()?;

        // The boundary header joins the option chain so a caller content type still wins
        let content_type = request
            .headers_mut()
            .remove(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
            .unwrap_or_default();
        let mut options = RequestOptions::new()
            .with_content_type(content_type)
            .overlay(options);
        if let Some(timeout) = forced_timeout {
            options = options.with_timeout(timeout);
        }

        self.execute(request, &options).await
    }

    async fn dispatch(&self, request: Request) -> Result<Response> {
        let pending = self.inner.execute(request);
        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(HttpError::Cancelled),
                response = pending => Ok(response?),
            },
            None => Ok(pending.await?),
        }
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn execute(&self, mut request: Request, options: &RequestOptions) -> Result<Response> {
        merge_headers(request.headers_mut(), &self.config.user_agent, options)?;

        let timeout = resolve_timeout(options, request.timeout().copied(), &self.config);
        *request.timeout_mut() = timeout;

        debug!(
            "HTTP {} {} (timeout: {:?})",
            request.method(),
            request.url(),
            timeout
        );
        self.dispatch(request).await
    }

    async fn get(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.send_with(Method::GET, url, None, options).await
    }

    async fn head(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.send_with(Method::HEAD, url, None, options).await
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<Response> {
        self.send_body(Method::POST, url, content_type, body, options)
            .await
    }

    async fn put(
        &self,
        url: &str,
        content_type: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<Response> {
        self.send_body(Method::PUT, url, content_type, body, options)
            .await
    }

    async fn patch(
        &self,
        url: &str,
        content_type: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<Response> {
        self.send_body(Method::PATCH, url, content_type, body, options)
            .await
    }

    async fn delete(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.send_with(Method::DELETE, url, None, options).await
    }
}

/// Parse `url`, accepting only http(s) URLs with a host
fn parse_url(url: &str) -> Result<url::Url> {
    let parsed = url
        .parse::<url::Url>()
        .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
        return Err(HttpError::InvalidUrl(format!(
            "{url}: expected an http or https URL with a host"
        )));
    }
    Ok(parsed)
}

/// Fill client defaults and per-call options into `headers`.
///
/// Headers already on the request always win. In order:
/// 1. `User-Agent` from the client config
/// 2. `Referer` from the options
/// 3. `Content-Type` from the options
/// 4. every extra header key from the options, with all of its values
pub(crate) fn merge_headers(
    headers: &mut HeaderMap,
    user_agent: &str,
    options: &RequestOptions,
) -> Result<()> {
    let defaults = [
        (USER_AGENT, Some(user_agent).filter(|ua| !ua.is_empty())),
        (REFERER, options.referer()),
        (CONTENT_TYPE, options.content_type()),
    ];
    for (name, value) in defaults {
        if let Some(value) = value {
            if !headers.contains_key(&name) {
                let value = header_value(&name, value)?;
                headers.insert(name, value);
            }
        }
    }

    let mut absent: Option<&HeaderName> = None;
    for (name, value) in options.headers() {
        if absent != Some(name) && headers.contains_key(name) {
            continue;
        }
        absent = Some(name);
        headers.append(name.clone(), value.clone());
    }
    Ok(())
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Per-call override, then the request's own timeout, then the client default.
/// `None` means the request runs without a deadline.
pub(crate) fn resolve_timeout(
    options: &RequestOptions,
    request_timeout: Option<Duration>,
    config: &HttpConfig,
) -> Option<Duration> {
    options
        .timeout()
        .or(request_timeout)
        .or_else(|| config.request_timeout())
}

/// Create a shared HTTP client (Arc-wrapped for cloning)
pub fn shared_client(config: HttpConfig) -> Result<Arc<dyn HttpClientTrait>> {
    Ok(Arc::new(HttpClient::new(config)?))
}
