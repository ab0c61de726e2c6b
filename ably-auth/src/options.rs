// Library-wide client options

use crate::auth::{AuthCallback, AuthOptions, TokenDetails, TokenParams};
use crate::error::{AblyError, AblyErrorCode, AblyResult};
use crate::http::HttpMethod;
use crate::logging::redact_key;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::sync::Arc;

/// Options an `Auth` instance is constructed with
#[derive(Clone)]
pub struct ClientOptions {
    pub key: Option<String>,
    /// A bare token; wrapped into token details without expiry
    pub token: Option<String>,
    pub token_details: Option<TokenDetails>,
    pub client_id: Option<String>,
    /// Force token auth even when a key would allow basic auth
    pub use_token_auth: bool,
    /// Whether requests travel over an encrypted transport
    pub tls: bool,
    pub auth_callback: Option<Arc<dyn AuthCallback>>,
    pub auth_url: Option<String>,
    pub auth_method: HttpMethod,
    pub auth_headers: BTreeMap<String, String>,
    pub auth_params: BTreeMap<String, String>,
    pub query_time: bool,
    pub default_token_params: TokenParams,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            key: None,
            token: None,
            token_details: None,
            client_id: None,
            use_token_auth: false,
            tls: true,
            auth_callback: None,
            auth_url: None,
            auth_method: HttpMethod::Get,
            auth_headers: BTreeMap::new(),
            auth_params: BTreeMap::new(),
            query_time: false,
            default_token_params: TokenParams::default(),
        }
    }
}

impl ClientOptions {
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }

    /// Options using an API key
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Default::default()
        }
    }

    /// Load options from `ABLY_*` environment variables
    ///
    /// Reads `ABLY_KEY`, `ABLY_TOKEN`, `ABLY_CLIENT_ID`, `ABLY_AUTH_URL`,
    /// `ABLY_USE_TOKEN_AUTH`, `ABLY_TLS` and `ABLY_QUERY_TIME`.
    pub fn from_env() -> AblyResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AblyResult<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let flag = |name: &str, default: bool| -> AblyResult<bool> {
            match var(name).as_deref() {
                None => Ok(default),
                Some("1") | Some("true") | Some("TRUE") | Some("yes") => Ok(true),
                Some("0") | Some("false") | Some("FALSE") | Some("no") => Ok(false),
                Some(other) => Err(AblyError::configuration(
                    AblyErrorCode::InvalidParameterValue,
                    format!("{} must be a boolean, got \"{}\"", name, other),
                )),
            }
        };

        Ok(Self {
            key: var("ABLY_KEY"),
            token: var("ABLY_TOKEN"),
            client_id: var("ABLY_CLIENT_ID"),
            auth_url: var("ABLY_AUTH_URL"),
            use_token_auth: flag("ABLY_USE_TOKEN_AUTH", false)?,
            tls: flag("ABLY_TLS", true)?,
            query_time: flag("ABLY_QUERY_TIME", false)?,
            ..Default::default()
        })
    }

    /// The library-wide default auth options
    pub fn auth_options(&self) -> AuthOptions {
        AuthOptions {
            key: self.key.clone(),
            client_id: self.client_id.clone().map(Some),
            auth_callback: self.auth_callback.clone(),
            auth_url: self.auth_url.clone(),
            auth_method: Some(self.auth_method),
            auth_headers: Some(self.auth_headers.clone()).filter(|h| !h.is_empty()),
            auth_params: Some(self.auth_params.clone()).filter(|p| !p.is_empty()),
            token_details: self.initial_token(),
            query_time: Some(self.query_time),
            force: false,
        }
    }

    /// Token supplied up front, if any; `token_details` wins over `token`
    pub fn initial_token(&self) -> Option<TokenDetails> {
        self.token_details
            .clone()
            .or_else(|| self.token.clone().map(TokenDetails::from_token))
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("key", &self.key.as_deref().map(redact_key))
            .field("token", &self.token.as_ref().map(|_| "<token>"))
            .field("token_details", &self.token_details.as_ref().map(|_| "<token>"))
            .field("client_id", &self.client_id)
            .field("use_token_auth", &self.use_token_auth)
            .field("tls", &self.tls)
            .field("auth_callback", &self.auth_callback.as_ref().map(|_| "<callback>"))
            .field("auth_url", &self.auth_url)
            .field("auth_method", &self.auth_method)
            .field("query_time", &self.query_time)
            .field("default_token_params", &self.default_token_params)
            .finish()
    }
}

/// Builder for [`ClientOptions`]
#[derive(Default)]
pub struct ClientOptionsBuilder {
    options: ClientOptions,
}

impl ClientOptionsBuilder {
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.options.key = Some(key.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.options.token = Some(token.into());
        self
    }

    pub fn token_details(mut self, details: TokenDetails) -> Self {
        self.options.token_details = Some(details);
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.options.client_id = Some(client_id.into());
        self
    }

    pub fn use_token_auth(mut self, enabled: bool) -> Self {
        self.options.use_token_auth = enabled;
        self
    }

    pub fn tls(mut self, enabled: bool) -> Self {
        self.options.tls = enabled;
        self
    }

    pub fn auth_callback(mut self, callback: impl AuthCallback + 'static) -> Self {
        self.options.auth_callback = Some(Arc::new(callback));
        self
    }

    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.options.auth_url = Some(url.into());
        self
    }

    pub fn auth_method(mut self, method: HttpMethod) -> Self {
        self.options.auth_method = method;
        self
    }

    pub fn auth_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.auth_headers.insert(key.into(), value.into());
        self
    }

    pub fn auth_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.auth_params.insert(key.into(), value.into());
        self
    }

    pub fn query_time(mut self, enabled: bool) -> Self {
        self.options.query_time = enabled;
        self
    }

    pub fn default_token_params(mut self, params: TokenParams) -> Self {
        self.options.default_token_params = params;
        self
    }

    pub fn build(self) -> ClientOptions {
        self.options
    }
}
