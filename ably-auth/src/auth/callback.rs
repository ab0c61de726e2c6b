// Application-supplied token callback

use super::options::TokenParams;
use super::token::CallbackResult;
use crate::error::AblyResult;
use async_trait::async_trait;
use std::future::Future;

/// Obtains tokens on behalf of the library, typically by asking the
/// application's own server for a signed `TokenRequest`.
///
/// Any `Fn(TokenParams) -> impl Future<Output = AblyResult<CallbackResult>>`
/// closure implements this trait.
#[async_trait]
pub trait AuthCallback: Send + Sync {
    async fn token(&self, params: &TokenParams) -> AblyResult<CallbackResult>;
}

#[async_trait]
impl<F, Fut> AuthCallback for F
where
    F: Fn(TokenParams) -> Fut + Send + Sync,
    Fut: Future<Output = AblyResult<CallbackResult>> + Send,
{
    async fn token(&self, params: &TokenParams) -> AblyResult<CallbackResult> {
        (self)(params.clone()).await
    }
}
