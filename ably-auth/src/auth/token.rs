// Token types exchanged with the Ably token endpoint

use super::options::TokenParams;
use crate::error::{AblyError, AblyErrorCode, AblyResult};
use crate::logging::redact_key;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A token is treated as expired this many milliseconds before its
/// literal expiry
pub const TOKEN_EXPIRY_MARGIN_MS: i64 = 15_000;

/// An API key split into its public name and secret
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    name: String,
    secret: String,
}

impl ApiKey {
    /// Parse a key of the form `<keyName>:<keySecret>`
    pub fn parse(key: &str) -> AblyResult<Self> {
        match key.split_once(':') {
            Some((name, secret)) if !name.is_empty() && !secret.is_empty() => Ok(Self {
                name: name.to_string(),
                secret: secret.to_string(),
            }),
            _ => Err(AblyError::authentication(
                AblyErrorCode::InvalidCredentials,
                format!("Invalid key \"{}\": expected <keyName>:<keySecret>", redact_key(key)),
            )),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// `name:secret`, base64 encoded for a Basic authorization header
    pub fn basic_credentials(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", self.name, self.secret))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("name", &self.name)
            .field("secret", &"***")
            .finish()
    }
}

/// A request for a token, signed with an API key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "capability_string"
    )]
    pub capability: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

impl TokenRequest {
    /// Unsigned draft carrying the given token params
    ///
    /// A ttl of zero means "server default" and is dropped.
    pub fn from_params(params: &TokenParams) -> Self {
        Self {
            key_name: None,
            ttl: params.ttl.filter(|ttl| *ttl != 0),
            capability: params.capability.clone(),
            client_id: params.client_id.clone().flatten(),
            timestamp: params.timestamp,
            nonce: params.nonce.clone(),
            mac: None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.mac.as_deref().map_or(false, |mac| !mac.is_empty())
    }
}

/// A token issued by Ably
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    #[serde(default)]
    pub token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<i64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "capability_string"
    )]
    pub capability: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl TokenDetails {
    /// Wrap a bare token string; expiry is unknown
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Whether the token must be renewed at `now_ms`
    ///
    /// Tokens without an expiry never expire locally.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires
            .map_or(false, |expires| expires.saturating_sub(TOKEN_EXPIRY_MARGIN_MS) <= now_ms)
    }

    /// Token value for a Bearer authorization header
    pub fn bearer_credentials(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.token)
    }
}

/// Capabilities travel as JSON-encoded strings but are sometimes supplied
/// as a JSON object; normalise both to the string form.
fn capability_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Ok(Some(other.to_string())),
    }
}

/// What an auth callback may hand back
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackResult {
    /// A bare token string
    Token(String),
    /// A signed request still to be exchanged for a token
    SignedRequest(TokenRequest),
    /// A ready-to-use token
    Details(TokenDetails),
}

impl CallbackResult {
    /// Classify an untyped JSON value, as returned by a remote auth server
    ///
    /// Objects with `issued` are token details, objects with `mac` are
    /// token requests and strings are tokens. Anything else yields `None`.
    pub fn classify(value: Value) -> Option<AblyResult<Self>> {
        match value {
            Value::String(token) => Some(Ok(Self::Token(token))),
            Value::Object(map) => {
                if map.contains_key("issued") {
                    Some(
                        serde_json::from_value(Value::Object(map))
                            .map(Self::Details)
                            .map_err(AblyError::from),
                    )
                } else if map.contains_key("mac") {
                    Some(
                        serde_json::from_value(Value::Object(map))
                            .map(Self::SignedRequest)
                            .map_err(AblyError::from),
                    )
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Like [`classify`](Self::classify), rejecting unrecognised shapes
    pub fn from_json(value: Value) -> AblyResult<Self> {
        Self::classify(value).unwrap_or_else(|| {
            Err(AblyError::authentication(
                AblyErrorCode::ErrorFromClientTokenCallback,
                "Invalid authCallback response: expected a token string, TokenRequest or TokenDetails",
            ))
        })
    }
}

impl From<String> for CallbackResult {
    fn from(token: String) -> Self {
        Self::Token(token)
    }
}

impl From<&str> for CallbackResult {
    fn from(token: &str) -> Self {
        Self::Token(token.to_string())
    }
}

impl From<TokenRequest> for CallbackResult {
    fn from(request: TokenRequest) -> Self {
        Self::SignedRequest(request)
    }
}

impl From<TokenDetails> for CallbackResult {
    fn from(details: TokenDetails) -> Self {
        Self::Details(details)
    }
}
