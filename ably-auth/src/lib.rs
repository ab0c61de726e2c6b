//! Ably Rust SDK authentication core
//!
//! Produces the credentials attached to every Ably REST request: either the
//! API key itself (basic auth) or a short-lived token obtained through an
//! auth callback, an auth URL or local signing with the key. HTTP requests
//! are delegated to an [`http::AuthTransport`].

pub mod auth;
pub mod clock;
pub mod error;
pub mod http;
pub mod logging;
pub mod options;

pub use auth::{
    Auth, AuthCallback, AuthMode, AuthOptions, CallbackResult, TokenDetails, TokenParams,
    TokenRequest, TokenSigner,
};
pub use clock::{Clock, SystemClock, TestClock};
pub use error::{AblyError, AblyErrorCode, AblyResult};
pub use http::{AuthTransport, HttpConfig, HttpMethod, HttpRequest, HttpResponse, ReqwestTransport};
pub use options::ClientOptions;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}
