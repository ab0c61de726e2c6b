// HTTP transport configuration

use std::time::Duration;

/// Default REST endpoint
pub const DEFAULT_REST_HOST: &str = "rest.ably.io";

/// Configuration for [`ReqwestTransport`](super::ReqwestTransport)
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Base URL that relative request paths are resolved against
    pub base_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
            base_url: format!("https://{}", DEFAULT_REST_HOST),
        }
    }
}

impl HttpConfig {
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::default()
    }

    /// Whether requests go over an encrypted transport
    pub fn is_tls(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

#[derive(Default)]
pub struct HttpConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    /// `Some(None)` disables the idle timeout
    pool_idle_timeout: Option<Option<Duration>>,
    pool_max_idle_per_host: Option<usize>,
    base_url: Option<String>,
}

impl HttpConfigBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = Some(max);
        self
    }

    /// Set base URL, e.g. `https://sandbox-rest.ably.io`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use `host` with the given scheme
    pub fn host(self, host: &str, tls: bool) -> Self {
        let scheme = if tls { "https" } else { "http" };
        self.base_url(format!("{}://{}", scheme, host))
    }

    pub fn build(self) -> HttpConfig {
        let default = HttpConfig::default();
        HttpConfig {
            timeout: self.timeout.unwrap_or(default.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(default.connect_timeout),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(default.pool_idle_timeout),
            pool_max_idle_per_host: self
                .pool_max_idle_per_host
                .unwrap_or(default.pool_max_idle_per_host),
            base_url: self
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(default.base_url),
        }
    }
}
