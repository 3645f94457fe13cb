//! Shared cookie jar
//!
//! Backed by `cookie_store` behind a lock so one jar can serve every
//! concurrent request on a client. Cookies that try to claim a public suffix
//! as their `Domain` are dropped, using the bundled Mozilla public suffix list
//! unless another list is supplied.

use std::{path::Path, sync::RwLock};

use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::header::HeaderValue;
use tracing::debug;
use url::Url;

use crate::error::{HttpError, Result};

static BUNDLED_SUFFIXES: Lazy<std::result::Result<publicsuffix::List, String>> = Lazy::new(|| {
    include_str!("../data/public_suffix_list.dat")
        .parse::<publicsuffix::List>()
        .map_err(|e| e.to_string())
});

/// Cookie jar shared by all requests of an [`HttpClient`](crate::HttpClient)
#[derive(Debug)]
pub struct CookieJar {
    store: RwLock<cookie_store::CookieStore>,
}

impl CookieJar {
    /// Create a jar scoped by the bundled public suffix list
    pub fn new() -> Result<Self> {
        let list = BUNDLED_SUFFIXES
            .as_ref()
            .map_err(|e| HttpError::CookieJar(e.clone()))?;
        Ok(Self::with_suffix_list(list.clone()))
    }

    /// Create a jar scoped by the given public suffix list
    pub fn with_suffix_list(list: publicsuffix::List) -> Self {
        Self {
            store: RwLock::new(cookie_store::CookieStore::new_with_public_suffix(Some(list))),
        }
    }

    /// Create a jar from public suffix list text (the `public_suffix_list.dat` format)
    pub fn from_suffix_list_str(list: &str) -> Result<Self> {
        let list = list
            .parse::<publicsuffix::List>()
            .map_err(|e| HttpError::CookieJar(e.to_string()))?;
        Ok(Self::with_suffix_list(list))
    }

    /// Load the public suffix list from a file
    pub fn from_suffix_list_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| HttpError::CookieJar(format!("{}: {e}", path.display())))?;
        debug!("Loaded public suffix list from {}", path.display());
        Self::from_suffix_list_str(&text)
    }

    /// Store a cookie as if `url` had sent it in a `Set-Cookie` header
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        let cookies = cookie::Cookie::parse(cookie)
            .ok()
            .map(cookie::Cookie::into_owned)
            .into_iter();
        if let Ok(mut store) = self.store.write() {
            store.store_response_cookies(cookies, url);
        }
    }

    /// The `Cookie` header value that would be sent to `url`
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let store = self.store.read().ok()?;
        let header = store
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        (!header.is_empty()).then_some(header)
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies: Vec<_> = cookie_headers
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| cookie::Cookie::parse(value).ok())
            .map(cookie::Cookie::into_owned)
            .collect();

        if let Ok(mut store) = self.store.write() {
            store.store_response_cookies(cookies.into_iter(), url);
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self.cookie_header(url)?;
        HeaderValue::from_maybe_shared(Bytes::from(header)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;

    const SUFFIXES: &str = "// ===BEGIN ICANN DOMAINS===\ncom\n// ===END ICANN DOMAINS===\n";

    fn url(s: &str) -> Url {
        s.parse().unwrap()
    }

    #[test]
    fn test_cookie_round_trip_for_same_host() {
        let jar = CookieJar::new().unwrap();
        jar.add_cookie_str("session=abc", &url("http://example.com/login"));

        assert_eq!(
            jar.cookie_header(&url("http://example.com/")),
            Some("session=abc".to_string())
        );
        assert_eq!(jar.cookie_header(&url("http://other.org/")), None);
    }

    #[test]
    fn test_set_cookies_from_headers() {
        let jar = CookieJar::new().unwrap();
        let headers = [
            HeaderValue::from_static("a=1"),
            HeaderValue::from_static("b=2"),
        ];
        jar.set_cookies(&mut headers.iter(), &url("http://example.com/"));

        let header = jar.cookies(&url("http://example.com/")).unwrap();
        let header = header.to_str().unwrap();
        assert!(header.contains("a=1"));
        assert!(header.contains("b=2"));
    }

    #[test]
    fn test_suffix_list_rejects_public_suffix_domain() {
        let jar = CookieJar::from_suffix_list_str(SUFFIXES).unwrap();
        let origin = url("http://www.example.com/");
        jar.add_cookie_str("wide=1; Domain=com", &origin);
        jar.add_cookie_str("scoped=1; Domain=example.com", &origin);

        assert_eq!(
            jar.cookie_header(&url("http://shop.example.com/")),
            Some("scoped=1".to_string())
        );
        assert_eq!(jar.cookie_header(&url("http://evil.com/")), None);
    }

    #[test]
    fn test_bundled_list_rejects_public_suffix_domain() {
        let jar = CookieJar::new().unwrap();
        let origin = url("http://www.example.com/");
        jar.add_cookie_str("wide=1; Domain=com", &origin);
        jar.add_cookie_str("shared=1; Domain=co.uk", &url("http://shop.example.co.uk/"));

        assert_eq!(jar.cookie_header(&url("http://evil.com/")), None);
        assert_eq!(jar.cookie_header(&url("http://other.co.uk/")), None);
        assert_eq!(jar.cookie_header(&url("http://www.example.com/")), None);
    }

    #[test]
    fn test_bundled_list_keeps_registrable_domain_cookies() {
        let jar = CookieJar::new().unwrap();
        jar.add_cookie_str("scoped=1; Domain=example.com", &url("http://www.example.com/"));

        assert_eq!(
            jar.cookie_header(&url("http://api.example.com/")),
            Some("scoped=1".to_string())
        );
    }

    #[test]
    fn test_missing_suffix_list_file_is_an_error() {
        let result = CookieJar::from_suffix_list_file(Path::new("/nonexistent/psl.dat"));
        assert!(matches!(result, Err(HttpError::CookieJar(_))));
    }
}
