//! HTTP client configuration

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// HTTP client configuration
///
/// Builder calls are applied in order, so a later `with_*` call overrides an
/// earlier one for the same field. A zero duration means "not set".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Overall request timeout (zero = no deadline)
    #[serde(default)]
    pub timeout: Duration,

    /// HTTP/HTTPS proxy URL
    #[serde(default)]
    pub proxy: Option<String>,

    /// User agent sent when a request carries none
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Connection (dial) timeout, proxied transport only
    #[serde(default = "default_dial_timeout")]
    pub dial_timeout: Duration,

    /// TCP keep-alive interval, proxied transport only (zero = transport default)
    #[serde(default)]
    pub keep_alive_timeout: Duration,

    /// TLS handshake timeout, proxied transport only
    #[serde(default = "default_tls_handshake_timeout")]
    pub tls_handshake_timeout: Duration,

    /// Maximum idle connections kept per host, proxied transport only
    #[serde(default)]
    pub max_idle_per_host: Option<usize>,

    /// How long an idle pooled connection is kept, proxied transport only
    #[serde(default)]
    pub idle_timeout: Option<Duration>,

    /// Public suffix list used to scope cookies
    #[serde(default)]
    pub public_suffix_list: Option<PathBuf>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            proxy: None,
            user_agent: default_user_agent(),
            dial_timeout: default_dial_timeout(),
            keep_alive_timeout: Duration::ZERO,
            tls_handshake_timeout: default_tls_handshake_timeout(),
            max_idle_per_host: None,
            idle_timeout: None,
            public_suffix_list: None,
        }
    }
}

impl HttpConfig {
    /// Create a new HTTP config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config for fast operations (5s timeout)
    pub fn fast() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            dial_timeout: Duration::from_secs(2),
            ..Default::default()
        }
    }

    /// Create config for long operations such as large downloads (10min timeout)
    pub fn long() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            dial_timeout: Duration::from_secs(10),
            ..Default::default()
        }
    }

    /// Set the overall request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set proxy URL. Surrounding whitespace is ignored; an empty string clears it.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        let proxy = proxy.into();
        let proxy = proxy.trim();
        self.proxy = (!proxy.is_empty()).then(|| proxy.to_string());
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into().trim().to_string();
        self
    }

    /// Set the connection timeout
    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    /// Set the TCP keep-alive interval
    pub fn with_keep_alive_timeout(mut self, timeout: Duration) -> Self {
        self.keep_alive_timeout = timeout;
        self
    }

    /// Set the TLS handshake timeout
    pub fn with_tls_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.tls_handshake_timeout = timeout;
        self
    }

    /// Set idle connection limits
    pub fn with_idle_connections(mut self, max_per_host: usize, idle_timeout: Duration) -> Self {
        self.max_idle_per_host = Some(max_per_host);
        self.idle_timeout = Some(idle_timeout);
        self
    }

    /// Load the cookie jar's public suffix list from a file
    pub fn with_public_suffix_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.public_suffix_list = Some(path.into());
        self
    }

    /// Overall timeout, `None` when unset
    pub fn request_timeout(&self) -> Option<Duration> {
        non_zero(self.timeout)
    }

    /// Budget for establishing a proxied connection.
    ///
    /// The connector runs TCP connect and TLS handshake as one step, so the
    /// two budgets are added.
    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        non_zero(self.dial_timeout + self.tls_handshake_timeout)
    }
}

pub(crate) fn non_zero(duration: Duration) -> Option<Duration> {
    (!duration.is_zero()).then_some(duration)
}

// Default value functions for serde
fn default_user_agent() -> String {
    format!("httputil/{}", env!("CARGO_PKG_VERSION"))
}

fn default_dial_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_tls_handshake_timeout() -> Duration {
    Duration::from_secs(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Duration::ZERO);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.dial_timeout, Duration::from_secs(60));
        assert_eq!(config.tls_handshake_timeout, Duration::from_secs(60));
        assert!(config.proxy.is_none());
        assert!(config.user_agent.starts_with("httputil/"));
    }

    #[test]
    fn test_fast_config() {
        let config = HttpConfig::fast();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.dial_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_long_config() {
        let config = HttpConfig::long();
        assert_eq!(config.timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_builder_pattern() {
        let config = HttpConfig::new()
            .with_timeout(Duration::from_secs(15))
            .with_user_agent("  agent/1.0 ")
            .with_proxy(" http://proxy.example.com:8080 ")
            .with_idle_connections(4, Duration::from_secs(30));

        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.user_agent, "agent/1.0");
        assert_eq!(config.proxy, Some("http://proxy.example.com:8080".to_string()));
        assert_eq!(config.max_idle_per_host, Some(4));
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_later_builder_calls_win() {
        let config = HttpConfig::new()
            .with_timeout(Duration::from_secs(1))
            .with_proxy("http://first:1")
            .with_timeout(Duration::from_secs(2))
            .with_proxy("http://second:2");

        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.proxy.as_deref(), Some("http://second:2"));
    }

    #[test]
    fn test_empty_proxy_clears() {
        let config = HttpConfig::new().with_proxy("http://proxy:1").with_proxy("   ");
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_connect_timeout_sums_dial_and_tls() {
        let config = HttpConfig::new()
            .with_dial_timeout(Duration::from_secs(3))
            .with_tls_handshake_timeout(Duration::from_secs(4));
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(7)));

        let config = config
            .with_dial_timeout(Duration::ZERO)
            .with_tls_handshake_timeout(Duration::ZERO);
        assert_eq!(config.connect_timeout(), None);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: HttpConfig =
            serde_json::from_str(r#"{"proxy":"http://proxy:3128"}"#).unwrap();
        assert_eq!(config.proxy.as_deref(), Some("http://proxy:3128"));
        assert_eq!(config.dial_timeout, Duration::from_secs(60));
        assert!(config.user_agent.starts_with("httputil/"));
        assert_eq!(config.timeout, Duration::ZERO);
    }
}
