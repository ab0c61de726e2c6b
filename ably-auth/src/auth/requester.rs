// Obtains tokens through whichever mechanism the auth options configure
// Mechanisms are tried in a fixed order: callback, auth URL, local key

use super::options::{AuthOptions, TokenParams};
use super::signer::TokenSigner;
use super::token::{CallbackResult, TokenDetails, TokenRequest};
use crate::clock::Clock;
use crate::error::{AblyError, AblyErrorCode, AblyResult};
use crate::http::{AuthTransport, HttpMethod, HttpRequest, HttpResponse};
use crate::logging::generate_request_id;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Turns merged token params and auth options into a token
pub struct TokenRequester<'a> {
    transport: &'a dyn AuthTransport,
    clock: &'a dyn Clock,
}

impl<'a> TokenRequester<'a> {
    pub fn new(transport: &'a dyn AuthTransport, clock: &'a dyn Clock) -> Self {
        Self { transport, clock }
    }

    /// Obtain a new token with the first configured mechanism
    pub async fn request_token(
        &self,
        params: &TokenParams,
        options: &AuthOptions,
    ) -> AblyResult<TokenDetails> {
        let request_id = generate_request_id();

        let request = if let Some(callback) = &options.auth_callback {
            debug!(%request_id, "requesting token with authCallback");
            let result = callback.token(params).await.map_err(|e| {
                warn!(%request_id, error = %e, "authCallback failed");
                AblyError::authentication(
                    AblyErrorCode::ErrorFromClientTokenCallback,
                    format!("authCallback failed: {}", e),
                )
            })?;

            match result {
                CallbackResult::Token(token) if token.is_empty() => {
                    return Err(AblyError::authentication(
                        AblyErrorCode::ErrorFromClientTokenCallback,
                        "Invalid authCallback response: empty token",
                    ));
                }
                CallbackResult::Token(token) => return Ok(TokenDetails::from_token(token)),
                CallbackResult::Details(details) => return require_token(details, "authCallback"),
                CallbackResult::SignedRequest(request) => request,
            }
        } else if let Some(url) = &options.auth_url {
            debug!(%request_id, auth_url = %url, "requesting token from authUrl");
            match self.request_from_auth_url(url, params, options).await? {
                CallbackResult::Token(token) => return Ok(TokenDetails::from_token(token)),
                CallbackResult::Details(details) => return require_token(details, "authUrl"),
                CallbackResult::SignedRequest(request) => request,
            }
        } else if options.key.is_some() {
            debug!(%request_id, "signing token request with local key");
            self.create_token_request(params, options).await?
        } else {
            return Err(AblyError::authentication(
                AblyErrorCode::NoMeansToRenewToken,
                "No means to obtain a token: need one of authCallback, authUrl or key",
            ));
        };

        let details = self.exchange(request).await?;
        info!(%request_id, expires = ?details.expires, client_id = ?details.client_id, "obtained token");
        Ok(details)
    }

    /// Build and sign a token request with the configured key
    pub async fn create_token_request(
        &self,
        params: &TokenParams,
        options: &AuthOptions,
    ) -> AblyResult<TokenRequest> {
        let key = options.key.as_deref().ok_or_else(|| {
            AblyError::authentication(AblyErrorCode::InvalidCredentials, "No key specified")
        })?;
        let signer = TokenSigner::new(key)?;

        let mut draft = TokenRequest::from_params(params);
        if options.query_time.unwrap_or(false) {
            draft.timestamp = Some(self.transport.server_time().await?);
        }
        if params.client_id.is_none() {
            draft.client_id = options.client_id.clone().flatten();
        }

        signer.sign(draft, self.clock)
    }

    /// Exchange a signed token request for a token
    pub async fn exchange(&self, request: TokenRequest) -> AblyResult<TokenDetails> {
        let key_name = match request.key_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(AblyError::authentication(
                    AblyErrorCode::ErrorFromClientTokenCallback,
                    "TokenRequest has no keyName",
                ))
            }
        };

        let path = format!("/keys/{}/requestToken", urlencoding::encode(key_name));
        debug!(key_name, "exchanging token request");
        let response = self
            .transport
            .request(HttpRequest::post(path).json(&request)?)
            .await?;

        let details: TokenDetails = response.json()?;
        require_token(details, "token endpoint")
    }

    async fn request_from_auth_url(
        &self,
        url: &str,
        params: &TokenParams,
        options: &AuthOptions,
    ) -> AblyResult<CallbackResult> {
        let mut fields: BTreeMap<String, String> = options.auth_params.clone().unwrap_or_default();
        fields.extend(params.to_pairs());
        let fields: Vec<(String, String)> = fields.into_iter().collect();

        let method = options.auth_method.unwrap_or_default();
        let mut request = HttpRequest::new(method, url);
        if let Some(headers) = &options.auth_headers {
            request = request.headers(headers.clone());
        }
        let request = match method {
            HttpMethod::Get => request.params(fields),
            HttpMethod::Post => request.form(&fields)?,
        };

        let response = self.transport.request(request).await?;
        parse_auth_url_response(&response)
    }
}

/// Reject token details that carry no token
fn require_token(details: TokenDetails, source: &str) -> AblyResult<TokenDetails> {
    if details.token.is_empty() {
        warn!(source, "token details contained no token");
        return Err(AblyError::authentication(
            AblyErrorCode::ErrorFromClientTokenCallback,
            format!("Invalid {} response: TokenDetails contained no token", source),
        ));
    }
    Ok(details)
}

/// Interpret an authUrl response body
///
/// JSON objects must be token details (`issued`) or a token request
/// (`mac`). JSON strings and plain-text bodies are the token itself.
pub fn parse_auth_url_response(response: &HttpResponse) -> AblyResult<CallbackResult> {
    let invalid = |reason: &str| {
        AblyError::authentication(
            AblyErrorCode::ErrorFromClientTokenCallback,
            format!("Invalid authUrl response: {}", reason),
        )
    };

    let text = response.text()?;
    let body = text.trim();
    if body.is_empty() {
        return Err(invalid("empty body"));
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value @ (Value::Object(_) | Value::String(_))) => match CallbackResult::classify(value) {
            Some(Ok(CallbackResult::Token(token))) if token.is_empty() => Err(invalid("empty token")),
            Some(result) => result,
            None => {
                warn!("authUrl returned an object that is neither TokenDetails nor TokenRequest");
                Err(invalid("expected TokenDetails or TokenRequest"))
            }
        },
        Ok(_) if response.is_json() => Err(invalid("unexpected JSON value")),
        _ => Ok(CallbackResult::Token(body.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_response_is_token() {
        let response = HttpResponse::new(200, "  tok123\n");
        assert_eq!(
            parse_auth_url_response(&response).unwrap(),
            CallbackResult::Token("tok123".to_string())
        );
    }

    #[test]
    fn test_json_string_response_is_token() {
        let response = HttpResponse::json_body(200, &json!("tok456"));
        assert_eq!(
            parse_auth_url_response(&response).unwrap(),
            CallbackResult::Token("tok456".to_string())
        );
    }

    #[test]
    fn test_token_details_response() {
        let response = HttpResponse::json_body(
            200,
            &json!({"token": "abc", "issued": 1, "expires": 2, "clientId": "x"}),
        );
        match parse_auth_url_response(&response).unwrap() {
            CallbackResult::Details(details) => {
                assert_eq!(details.token, "abc");
                assert_eq!(details.client_id.as_deref(), Some("x"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_token_request_response() {
        let response = HttpResponse::json_body(
            200,
            &json!({"keyName": "app.key", "timestamp": 1, "nonce": "n", "mac": "m"}),
        );
        assert!(matches!(
            parse_auth_url_response(&response).unwrap(),
            CallbackResult::SignedRequest(_)
        ));
    }

    #[test]
    fn test_invalid_responses() {
        let object = HttpResponse::json_body(200, &json!({"foo": 1}));
        assert_eq!(parse_auth_url_response(&object).unwrap_err().code(), Some(40170));

        let number = HttpResponse::json_body(200, &json!(12));
        assert_eq!(parse_auth_url_response(&number).unwrap_err().code(), Some(40170));

        let empty = HttpResponse::new(200, "");
        assert_eq!(parse_auth_url_response(&empty).unwrap_err().code(), Some(40170));
    }
}
