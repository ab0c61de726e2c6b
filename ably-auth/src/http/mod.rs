// HTTP capability consumed by the authentication core
// The core never sends requests itself; it hands them to an `AuthTransport`

use crate::error::{parse_ably_error, AblyError, AblyResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use tracing::{debug, instrument};

pub use self::config::{HttpConfig, HttpConfigBuilder, DEFAULT_REST_HOST};

mod config;

/// HTTP methods used by the auth core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound request
///
/// `url` is either absolute or a path relative to the transport's base URL.
/// Requests built by the auth core never carry Ably credentials; transports
/// must send them exactly as given.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set a JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> AblyResult<Self> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(json);
        self.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        Ok(self)
    }

    /// Set a form-encoded body
    pub fn form(mut self, fields: &[(String, String)]) -> AblyResult<Self> {
        let encoded = serde_urlencoded::to_string(fields)
            .map_err(|e| AblyError::decode(format!("Failed to encode form body: {}", e)))?;
        self.body = Some(encoded.into_bytes());
        self.headers.push((
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        ));
        Ok(self)
    }

    /// Header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A successful (2xx) response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Build a JSON response; mainly useful for transports in tests
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: value.to_string().into_bytes(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(false)
    }

    pub fn text(&self) -> AblyResult<String> {
        String::from_utf8(self.body.clone()).map_err(|e| AblyError::Decode {
            message: format!("Response body is not UTF-8: {}", e),
            source: Some(Box::new(e)),
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> AblyResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| AblyError::Decode {
            message: format!("Failed to parse JSON: {}", e),
            source: Some(Box::new(e)),
        })
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// HTTP and server-time capabilities the auth core depends on
///
/// Implementations own timeouts, retries and fallback hosts. A non-2xx
/// response must be returned as an error, never as `Ok`.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Send `request` without adding any credentials
    async fn request(&self, request: HttpRequest) -> AblyResult<HttpResponse>;

    /// The service's clock in milliseconds since the Unix epoch
    async fn server_time(&self) -> AblyResult<i64>;
}

/// `AuthTransport` backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: HttpConfig) -> AblyResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| AblyError::Network {
                message: format!("Failed to build HTTP client: {}", e),
                source: Some(Box::new(e)),
                retryable: false,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn full_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }
}

#[async_trait]
impl AuthTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn request(&self, request: HttpRequest) -> AblyResult<HttpResponse> {
        let url = self.full_url(&request.url);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AblyError::timeout(format!("Request timeout: {}", e))
            } else {
                AblyError::Network {
                    message: format!("Network error: {}", e),
                    source: Some(Box::new(e)),
                    retryable: true,
                }
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| AblyError::network(format!("Failed to read response: {}", e)))?
            .to_vec();

        if !(200..300).contains(&status) {
            let text = String::from_utf8_lossy(&body);
            debug!(status, "request failed");
            return Err(parse_ably_error(status, &text));
        }

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    async fn server_time(&self) -> AblyResult<i64> {
        let response = self.request(HttpRequest::get("/time")).await?;
        let times: Vec<i64> = response.json()?;
        times
            .first()
            .copied()
            .ok_or_else(|| AblyError::decode("Empty time response"))
    }
}
