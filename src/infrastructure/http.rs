//! # Retrying HTTP Client
//!
//! Bounded-retry request client for the third-party pricing/info APIs.
//! Policy: up to 5 attempts; 429 honours `Retry-After` (else exponential
//! backoff); 500/502 back off linearly; any other non-2xx status is terminal
//! and resolves to no data. Retry exhaustion and terminal failure are
//! deliberately indistinguishable to callers: both are `Ok(None)`, and a
//! missing quote degrades a report rather than crashing the relay.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::domain::traits::HttpTransport;
use crate::domain::types::{Payload, TransportResponse};

pub const MAX_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct RetryClient {
    transport: Arc<dyn HttpTransport>,
}

impl RetryClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Issues the request, retrying 429/500/502 with backoff. Transport-level
    /// errors (malformed URL, connection failure) are not retried and
    /// propagate unchanged. Dropping the returned future during a backoff
    /// sleep abandons the remaining attempts.
    pub async fn request(&self, method: &str, url: &str) -> Result<Option<Payload>, String> {
        for attempt in 0..MAX_ATTEMPTS {
            let response = self.transport.execute(method, url).await?;

            match response.status {
                200..=299 => return Ok(Some(decode_body(&response))),
                429 => {
                    let delay = response
                        .retry_after
                        .unwrap_or_else(|| 2u64.pow(attempt));
                    tracing::debug!(
                        "{url}: rate limited, attempt {}/{MAX_ATTEMPTS}, backing off {delay}s",
                        attempt + 1
                    );
                    if attempt + 1 < MAX_ATTEMPTS {
                        sleep(Duration::from_secs(delay)).await;
                    }
                }
                500 | 502 => {
                    let delay = 1 + u64::from(attempt) * 3;
                    tracing::debug!(
                        "{url}: server error {}, attempt {}/{MAX_ATTEMPTS}, backing off {delay}s",
                        response.status,
                        attempt + 1
                    );
                    if attempt + 1 < MAX_ATTEMPTS {
                        sleep(Duration::from_secs(delay)).await;
                    }
                }
                status => {
                    tracing::debug!("{url}: terminal status {status}, giving up");
                    return Ok(None);
                }
            }
        }

        tracing::debug!("{url}: retries exhausted");
        Ok(None)
    }
}

fn decode_body(response: &TransportResponse) -> Payload {
    let is_json = response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("json"));
    if is_json && let Ok(value) = serde_json::from_str(&response.body) {
        return Payload::Json(value);
    }
    Payload::Text(response.body.clone())
}

/// The production transport, backed by a shared reqwest connection pool.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, method: &str, url: &str) -> Result<TransportResponse, String> {
        let method = reqwest::Method::from_bytes(method.as_bytes()).map_err(|e| e.to_string())?;
        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| e.to_string())?;

        Ok(TransportResponse {
            status,
            retry_after,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;

    /// Plays back a fixed response script, recording when each attempt ran.
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<TransportResponse, String>>>,
        attempts: Mutex<Vec<Instant>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<TransportResponse, String>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                attempts: Mutex::new(Vec::new()),
            })
        }

        fn attempt_count(&self) -> usize {
            self.attempts.lock().unwrap().len()
        }

        /// Seconds between consecutive attempts.
        fn gaps(&self) -> Vec<u64> {
            let attempts = self.attempts.lock().unwrap();
            attempts
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).as_secs())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, _method: &str, _url: &str) -> Result<TransportResponse, String> {
            self.attempts.lock().unwrap().push(Instant::now());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    fn status(code: u16) -> Result<TransportResponse, String> {
        Ok(TransportResponse {
            status: code,
            retry_after: None,
            content_type: None,
            body: String::new(),
        })
    }

    fn json_ok(body: &str) -> Result<TransportResponse, String> {
        Ok(TransportResponse {
            status: 200,
            retry_after: None,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt() {
        let transport = ScriptedTransport::new(vec![json_ok(r#"{"ok":true}"#)]);
        let client = RetryClient::new(transport.clone());

        let payload = client.request("GET", "http://api.test/x").await.unwrap();
        assert_eq!(
            payload,
            Some(Payload::Json(serde_json::json!({"ok": true})))
        );
        assert_eq!(transport.attempt_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn server_errors_back_off_linearly_then_succeed() {
        let transport = ScriptedTransport::new(vec![
            status(500),
            status(502),
            status(500),
            status(500),
            json_ok(r#"{"sell":{"metal":60.0}}"#),
        ]);
        let client = RetryClient::new(transport.clone());

        let payload = client.request("GET", "http://api.test/x").await.unwrap();
        assert!(payload.is_some());
        assert_eq!(transport.attempt_count(), 5);
        // 1 + attempt * 3 for attempts 0..=3
        assert_eq!(transport.gaps(), vec![1, 4, 7, 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_status_fails_soft_without_retry() {
        let transport = ScriptedTransport::new(vec![status(404)]);
        let client = RetryClient::new(transport.clone());

        let payload = client.request("GET", "http://api.test/x").await.unwrap();
        assert_eq!(payload, None);
        assert_eq!(transport.attempt_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_is_terminal_too() {
        let transport = ScriptedTransport::new(vec![status(401)]);
        let client = RetryClient::new(transport.clone());

        assert_eq!(client.request("GET", "http://api.test/x").await.unwrap(), None);
        assert_eq!(transport.attempt_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhaustion_uses_exponential_backoff() {
        let transport = ScriptedTransport::new(vec![
            status(429),
            status(429),
            status(429),
            status(429),
            status(429),
        ]);
        let client = RetryClient::new(transport.clone());

        let payload = client.request("GET", "http://api.test/x").await.unwrap();
        assert_eq!(payload, None);
        assert_eq!(transport.attempt_count(), 5);
        // 2^attempt for attempts 0..=3; no sleep after the final attempt
        assert_eq!(transport.gaps(), vec![1, 2, 4, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_honours_retry_after_header() {
        let transport = ScriptedTransport::new(vec![
            Ok(TransportResponse {
                status: 429,
                retry_after: Some(7),
                content_type: None,
                body: String::new(),
            }),
            json_ok("{}"),
        ]);
        let client = RetryClient::new(transport.clone());

        let payload = client.request("GET", "http://api.test/x").await.unwrap();
        assert!(payload.is_some());
        assert_eq!(transport.gaps(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn non_json_body_decodes_as_text() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse {
            status: 200,
            retry_after: None,
            content_type: Some("text/plain".to_string()),
            body: "pong".to_string(),
        })]);
        let client = RetryClient::new(transport);

        let payload = client.request("GET", "http://api.test/x").await.unwrap();
        assert_eq!(payload, Some(Payload::Text("pong".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_propagate_unchanged() {
        let transport =
            ScriptedTransport::new(vec![Err("builder error for url (not-a-url)".to_string())]);
        let client = RetryClient::new(transport.clone());

        let err = client.request("GET", "not-a-url").await.unwrap_err();
        assert!(err.contains("builder error"));
        assert_eq!(transport.attempt_count(), 1);
    }
}
