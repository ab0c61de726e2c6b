//! Auth options and token params, and how layers of them merge.
//!
//! Every call works on a fresh merge of three layers: the library-wide
//! defaults, the overrides accumulated by earlier `authorize` calls, and the
//! arguments of the call itself. A field supplied by a higher layer replaces
//! the lower one wholesale.
//!
//! `client_id` is a tri-state: `None` means "not supplied", `Some(None)` is
//! an explicit null that still beats a lower layer's value.

use super::callback::AuthCallback;
use super::token::TokenDetails;
use crate::http::HttpMethod;
use crate::logging::redact_key;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Parameters of the token being requested
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenParams {
    /// Requested lifetime in milliseconds; 0 asks for the server default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,

    /// JSON-encoded capability; absent means the key's full capability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl TokenParams {
    pub fn with_ttl(mut self, ttl_ms: i64) -> Self {
        self.ttl = Some(ttl_ms);
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(Some(client_id.into()));
        self
    }

    /// Explicitly request a token with no client id
    pub fn with_null_client_id(mut self) -> Self {
        self.client_id = Some(None);
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// `self` overlaid with every field `over` supplies
    pub fn merge(&self, over: &TokenParams) -> TokenParams {
        TokenParams {
            ttl: over.ttl.or(self.ttl),
            capability: over.capability.clone().or_else(|| self.capability.clone()),
            client_id: over.client_id.clone().or_else(|| self.client_id.clone()),
            timestamp: over.timestamp.or(self.timestamp),
            nonce: over.nonce.clone().or_else(|| self.nonce.clone()),
        }
    }

    /// The durable part of these params; `timestamp` only applies to one call
    pub fn persisted(&self) -> TokenParams {
        TokenParams {
            timestamp: None,
            ..self.clone()
        }
    }

    /// Non-empty fields as string pairs, for query strings and form bodies
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(ttl) = self.ttl {
            pairs.push(("ttl".to_string(), ttl.to_string()));
        }
        if let Some(capability) = &self.capability {
            pairs.push(("capability".to_string(), capability.clone()));
        }
        if let Some(Some(client_id)) = &self.client_id {
            pairs.push(("clientId".to_string(), client_id.clone()));
        }
        if let Some(timestamp) = self.timestamp {
            pairs.push(("timestamp".to_string(), timestamp.to_string()));
        }
        if let Some(nonce) = &self.nonce {
            pairs.push(("nonce".to_string(), nonce.clone()));
        }
        pairs
    }
}

/// How tokens are obtained
#[derive(Clone, Default)]
pub struct AuthOptions {
    /// API key, `<keyName>:<keySecret>`
    pub key: Option<String>,
    pub client_id: Option<Option<String>>,
    pub auth_callback: Option<Arc<dyn AuthCallback>>,
    pub auth_url: Option<String>,
    pub auth_method: Option<HttpMethod>,
    pub auth_headers: Option<BTreeMap<String, String>>,
    pub auth_params: Option<BTreeMap<String, String>>,
    pub token_details: Option<TokenDetails>,
    /// Sign token requests with the server's clock instead of the local one
    pub query_time: Option<bool>,
    /// Bypass the cached token; applies to a single call
    pub force: bool,
}

impl AuthOptions {
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(Some(client_id.into()));
        self
    }

    pub fn with_null_client_id(mut self) -> Self {
        self.client_id = Some(None);
        self
    }

    pub fn with_auth_callback(mut self, callback: impl AuthCallback + 'static) -> Self {
        self.auth_callback = Some(Arc::new(callback));
        self
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    pub fn with_auth_method(mut self, method: HttpMethod) -> Self {
        self.auth_method = Some(method);
        self
    }

    pub fn with_auth_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth_headers
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_auth_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth_params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_token_details(mut self, details: TokenDetails) -> Self {
        self.token_details = Some(details);
        self
    }

    pub fn with_query_time(mut self, query_time: bool) -> Self {
        self.query_time = Some(query_time);
        self
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// `self` overlaid with every field `over` supplies
    pub fn merge(&self, over: &AuthOptions) -> AuthOptions {
        AuthOptions {
            key: over.key.clone().or_else(|| self.key.clone()),
            client_id: over.client_id.clone().or_else(|| self.client_id.clone()),
            auth_callback: over
                .auth_callback
                .clone()
                .or_else(|| self.auth_callback.clone()),
            auth_url: over.auth_url.clone().or_else(|| self.auth_url.clone()),
            auth_method: over.auth_method.or(self.auth_method),
            auth_headers: over
                .auth_headers
                .clone()
                .or_else(|| self.auth_headers.clone()),
            auth_params: over.auth_params.clone().or_else(|| self.auth_params.clone()),
            token_details: over
                .token_details
                .clone()
                .or_else(|| self.token_details.clone()),
            query_time: over.query_time.or(self.query_time),
            force: over.force || self.force,
        }
    }

    /// The durable part of these options; `force` only applies to one call
    pub fn persisted(&self) -> AuthOptions {
        AuthOptions {
            force: false,
            ..self.clone()
        }
    }

    /// Whether any mechanism able to mint a new token is configured
    pub fn can_renew(&self) -> bool {
        self.auth_callback.is_some() || self.auth_url.is_some() || self.key.is_some()
    }
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOptions")
            .field("key", &self.key.as_deref().map(redact_key))
            .field("client_id", &self.client_id)
            .field("auth_callback", &self.auth_callback.as_ref().map(|_| "<callback>"))
            .field("auth_url", &self.auth_url)
            .field("auth_method", &self.auth_method)
            .field("auth_headers", &self.auth_headers)
            .field("auth_params", &self.auth_params)
            .field("token_details", &self.token_details.as_ref().map(|_| "<token>"))
            .field("query_time", &self.query_time)
            .field("force", &self.force)
            .finish()
    }
}

/// Resolve a client id from layers ordered highest priority first
///
/// The first layer that supplies a value wins, including an explicit null.
pub fn resolve_client_id<'a, I>(layers: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Option<Option<String>>>,
{
    layers
        .into_iter()
        .find_map(|layer| layer.as_ref())
        .cloned()
        .flatten()
}
