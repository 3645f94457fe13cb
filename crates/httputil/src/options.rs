//! Per-request options
//!
//! A [`RequestOptions`] value is built fresh for each call and merged onto
//! the request by [`HttpClient::execute`](crate::HttpClient::execute).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::non_zero;

/// Options overlaid onto a single request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: HeaderMap,
    referer: Option<String>,
    content_type: Option<String>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the extra header set
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Append one extra header
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the referer. Surrounding whitespace is ignored; empty unsets it.
    pub fn with_referer(mut self, referer: impl AsRef<str>) -> Self {
        self.referer = trimmed(referer.as_ref());
        self
    }

    /// Set the content type. Surrounding whitespace is ignored; empty unsets it.
    pub fn with_content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.content_type = trimmed(content_type.as_ref());
        self
    }

    /// Override the client timeout for this request. Zero keeps the client default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = non_zero(timeout);
        self
    }

    /// Extra headers added when the request lacks the key
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Referer, `None` when unset
    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }

    /// Content type, `None` when unset
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Per-call timeout override, `None` keeps the client default
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Apply `other` on top of `self`: every field set on `other` wins.
    ///
    /// Helpers put their own defaults in `self` and overlay the caller's
    /// options, so a caller-supplied content type or timeout takes effect.
    pub fn overlay(mut self, other: &RequestOptions) -> Self {
        if !other.headers.is_empty() {
            self.headers = other.headers.clone();
        }
        if other.referer.is_some() {
            self.referer = other.referer.clone();
        }
        if other.content_type.is_some() {
            self.content_type = other.content_type.clone();
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        self
    }
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use reqwest::header::ACCEPT;

    #[test]
    fn test_builder_trims_and_ignores_empty() {
        let options = RequestOptions::new()
            .with_referer("  https://example.com/ ")
            .with_content_type("   ");
        assert_eq!(options.referer(), Some("https://example.com/"));
        assert_eq!(options.content_type(), None);
    }

    #[test]
    fn test_zero_timeout_is_unset() {
        let options = RequestOptions::new().with_timeout(Duration::ZERO);
        assert_eq!(options.timeout(), None);
    }

    #[test]
    fn test_overlay_keeps_unset_fields() {
        let base = RequestOptions::new()
            .with_content_type("application/json")
            .with_timeout(Duration::from_secs(9));
        let merged = base.overlay(&RequestOptions::new().with_referer("https://r.example/"));

        assert_eq!(merged.content_type(), Some("application/json"));
        assert_eq!(merged.timeout(), Some(Duration::from_secs(9)));
        assert_eq!(merged.referer(), Some("https://r.example/"));
    }

    #[test]
    fn test_overlay_replaces_headers() {
        let base = RequestOptions::new()
            .with_header(ACCEPT, HeaderValue::from_static("text/plain"));
        let caller = RequestOptions::new()
            .with_header(ACCEPT, HeaderValue::from_static("application/json"));
        let merged = base.overlay(&caller);

        let accepts: Vec<_> = merged.headers().get_all(ACCEPT).iter().collect();
        assert_eq!(accepts, vec![&HeaderValue::from_static("application/json")]);
    }

    proptest! {
        #[test]
        fn prop_caller_content_type_wins(
            helper in "[a-z]{1,10}/[a-z]{1,10}",
            caller in "[a-z]{1,10}/[a-z]{1,10}",
        ) {
            let merged = RequestOptions::new()
                .with_content_type(&helper)
                .overlay(&RequestOptions::new().with_content_type(&caller));
            prop_assert_eq!(merged.content_type(), Some(caller.as_str()));
        }

        #[test]
        fn prop_caller_timeout_wins_unless_zero(helper in 1u64..10_000, caller in 0u64..10_000) {
            let merged = RequestOptions::new()
                .with_timeout(Duration::from_millis(helper))
                .overlay(&RequestOptions::new().with_timeout(Duration::from_millis(caller)));
            let expected = if caller == 0 { helper } else { caller };
            prop_assert_eq!(merged.timeout(), Some(Duration::from_millis(expected)));
        }
    }
}
