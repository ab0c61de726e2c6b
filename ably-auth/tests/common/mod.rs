// Test support: a scripted transport that never touches the network
#![allow(dead_code)]

use ably_auth::{AblyError, AblyResult, AuthTransport, HttpRequest, HttpResponse, TestClock};
use ably_auth::{Clock, TokenRequest};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const NOW: i64 = 1_700_000_000_000;
pub const TOKEN_TTL_MS: i64 = 3_600_000;

/// Records every request and answers token exchanges with fresh tokens
///
/// Responses pushed with `push_response` are returned first, in order.
/// Without a scripted response, `POST /keys/{name}/requestToken` issues
/// `token-N` valid for `TOKEN_TTL_MS` and echoing the requested clientId.
pub struct MockTransport {
    clock: TestClock,
    requests: Mutex<Vec<HttpRequest>>,
    scripted: Mutex<VecDeque<AblyResult<HttpResponse>>>,
    issued: AtomicUsize,
    server_time: i64,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new(clock: TestClock) -> Self {
        Self {
            clock,
            requests: Mutex::new(Vec::new()),
            scripted: Mutex::new(VecDeque::new()),
            issued: AtomicUsize::new(0),
            server_time: NOW + 60_000,
            delay: None,
        }
    }

    /// Make every request wait, so concurrent callers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_response(&self, response: AblyResult<HttpResponse>) {
        self.scripted.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of token exchanges sent to the token endpoint
    pub fn exchanges(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.ends_with("/requestToken"))
            .count()
    }

    pub fn server_time_value(&self) -> i64 {
        self.server_time
    }

    fn issue_token(&self, request: &HttpRequest) -> AblyResult<HttpResponse> {
        let body = request
            .body
            .as_deref()
            .ok_or_else(|| AblyError::api(400, 40001, "missing body"))?;
        let token_request: TokenRequest = serde_json::from_slice(body)?;
        if !token_request.is_signed() {
            return Err(AblyError::api(401, 40101, "unsigned token request"));
        }

        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.clock.now_ms();
        let mut details = json!({
            "token": format!("token-{}", n),
            "keyName": token_request.key_name,
            "issued": now,
            "expires": now + TOKEN_TTL_MS,
            "capability": token_request.capability.unwrap_or_else(|| r#"{"*":["*"]}"#.to_string()),
        });
        if let Some(client_id) = token_request.client_id {
            details["clientId"] = json!(client_id);
        }
        Ok(HttpResponse::json_body(201, &details))
    }
}

#[async_trait]
impl AuthTransport for MockTransport {
    async fn request(&self, request: HttpRequest) -> AblyResult<HttpResponse> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.requests.lock().unwrap().push(request.clone());

        let scripted = self.scripted.lock().unwrap().pop_front();
        match scripted {
            Some(response) => response,
            None if request.url.ends_with("/requestToken") => self.issue_token(&request),
            None => Err(AblyError::api(404, 40400, format!("no route for {}", request.url))),
        }
    }

    async fn server_time(&self) -> AblyResult<i64> {
        Ok(self.server_time)
    }
}
