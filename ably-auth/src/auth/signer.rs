//! Local signing of token requests with an API key

use super::token::{ApiKey, TokenRequest};
use crate::clock::Clock;
use crate::error::{AblyError, AblyErrorCode, AblyResult};
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs token requests with a locally held API key
#[derive(Debug, Clone)]
pub struct TokenSigner {
    key: ApiKey,
}

impl TokenSigner {
    /// Create a signer from a `<keyName>:<keySecret>` key
    pub fn new(key: &str) -> AblyResult<Self> {
        Ok(Self {
            key: ApiKey::parse(key)?,
        })
    }

    pub fn from_key(key: ApiKey) -> Self {
        Self { key }
    }

    pub fn key_name(&self) -> &str {
        self.key.name()
    }

    /// Complete and sign a draft request
    ///
    /// Missing `timestamp` is read from `clock`, a missing nonce is
    /// generated, and `mac` is computed unless the draft already has one.
    /// With timestamp and nonce fixed the result is fully deterministic.
    pub fn sign(&self, mut request: TokenRequest, clock: &dyn Clock) -> AblyResult<TokenRequest> {
        if let Some(key_name) = request.key_name.as_deref() {
            if !key_name.is_empty() && key_name != self.key.name() {
                return Err(AblyError::authentication(
                    AblyErrorCode::IncompatibleCredentials,
                    format!(
                        "Incompatible keys specified: request keyName \"{}\" does not match key \"{}\"",
                        key_name,
                        self.key.name()
                    ),
                ));
            }
        }
        request.key_name = Some(self.key.name().to_string());

        if request.timestamp.is_none() {
            request.timestamp = Some(clock.now_ms());
        }

        if request.nonce.as_deref().map_or(true, str::is_empty) {
            request.nonce = Some(Self::generate_nonce());
        }

        if !request.is_signed() {
            request.mac = Some(self.compute_mac(&request)?);
        }

        Ok(request)
    }

    /// Verify MAC signature of a token request
    pub fn verify_mac(&self, request: &TokenRequest) -> AblyResult<bool> {
        let mac = request.mac.as_deref().ok_or_else(|| {
            AblyError::authentication(
                AblyErrorCode::InvalidCredentials,
                "Missing MAC in token request",
            )
        })?;

        let computed = self.compute_mac(request)?;
        Ok(mac == computed)
    }

    /// Build the text to sign for MAC computation
    ///
    /// Six newline-terminated fields; absent ones are empty.
    pub fn signing_text(request: &TokenRequest) -> String {
        let fields = [
            request.key_name.clone().unwrap_or_default(),
            request.ttl.map(|ttl| ttl.to_string()).unwrap_or_default(),
            request.capability.clone().unwrap_or_default(),
            request.client_id.clone().unwrap_or_default(),
            request
                .timestamp
                .map(|timestamp| timestamp.to_string())
                .unwrap_or_default(),
            request.nonce.clone().unwrap_or_default(),
        ];

        let mut text = fields.join("\n");
        text.push('\n');
        text
    }

    fn compute_mac(&self, request: &TokenRequest) -> AblyResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.key.secret().as_bytes()).map_err(|e| {
            AblyError::authentication(
                AblyErrorCode::InvalidCredentials,
                format!("Failed to create HMAC: {}", e),
            )
        })?;

        mac.update(Self::signing_text(request).as_bytes());
        let result = mac.finalize();

        Ok(base64::engine::general_purpose::STANDARD.encode(result.into_bytes()))
    }

    /// 16 random bytes, URL-safe base64
    pub fn generate_nonce() -> String {
        let nonce: [u8; 16] = rand::thread_rng().gen();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(nonce)
    }
}
