//! Retry and timeout behavior for completion API calls.
//!
//! Linear backoff with jitter, bounded attempts, retries on rate limits,
//! server errors, and network failures. A `retry-after` header is honored
//! when the server provides one.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::llm::LlmError;

const MAX_ATTEMPTS: u32 = 5;
const BASE_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 30_000;

/// Linear backoff with ±10% jitter, capped at `MAX_DELAY_MS`.
fn backoff_delay(attempt: u32) -> u64 {
    let linear = BASE_DELAY_MS * u64::from(attempt);
    let jitter_range = linear / 10;
    let jitter = rand::random::<u64>() % (jitter_range * 2 + 1);
    linear
        .saturating_add(jitter)
        .saturating_sub(jitter_range)
        .min(MAX_DELAY_MS)
}

/// Send a request, retrying transient failures, and deserialize the body.
pub async fn send_with_retry<T, F>(prepare_request: F) -> Result<T, LlmError>
where
    T: serde::de::DeserializeOwned,
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempts = 0;

    loop {
        if attempts > 0 {
            debug!(attempts, "retrying completion API call");
        }

        match prepare_request().send().await {
            Ok(res) if res.status().is_success() => {
                let body = res.text().await.map_err(|e| {
                    LlmError::Api(format!("failed to read response body: {}", e))
                })?;
                return serde_json::from_str::<T>(&body).map_err(|e| {
                    warn!(error = %e, body, "failed to parse completion response");
                    LlmError::Api(format!("failed to parse response: {}", e))
                });
            }
            Ok(res) if res.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                attempts += 1;
                if attempts >= MAX_ATTEMPTS {
                    return Err(LlmError::RateLimited);
                }
                let delay_ms = res
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|secs| secs * 1000)
                    .unwrap_or_else(|| backoff_delay(attempts));
                warn!(delay_ms, "rate limited by completion API");
                sleep(Duration::from_millis(delay_ms)).await;
            }
            Ok(res) if res.status().is_server_error() => {
                attempts += 1;
                let status = res.status();
                if attempts >= MAX_ATTEMPTS {
                    let detail = res
                        .text()
                        .await
                        .unwrap_or_else(|_| "unknown server error".to_string());
                    return Err(LlmError::Api(format!(
                        "server error {} after {} attempts: {}",
                        status, attempts, detail
                    )));
                }
                let delay_ms = backoff_delay(attempts);
                warn!(%status, delay_ms, "completion API server error");
                sleep(Duration::from_millis(delay_ms)).await;
            }
            Ok(res) => {
                let status = res.status();
                let detail = res
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                return Err(LlmError::Api(format!("HTTP {}: {}", status, detail)));
            }
            Err(err) => {
                attempts += 1;
                if attempts >= MAX_ATTEMPTS {
                    return Err(LlmError::Api(format!(
                        "network error after {} attempts: {}",
                        attempts, err
                    )));
                }
                let delay_ms = backoff_delay(attempts);
                warn!(error = %err, delay_ms, "completion API request failed");
                sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
