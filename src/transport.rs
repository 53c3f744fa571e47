use crate::config::TransportConfig;
use crate::error::{PipelineError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Error body shape shared by the AI service and the page-creation proxy.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP POST wrapper with bounded retry and exponential backoff.
///
/// Failures are split into two classes: retryable (no response at all, or
/// a non-4xx failure status) and terminal (4xx, which carries a
/// server-supplied message and is surfaced immediately). A retryable
/// failure on the final attempt is propagated as terminal.
#[derive(Clone)]
pub struct RetryingClient {
    client: reqwest::Client,
    max_attempts: usize,
    base_delay: Duration,
}

impl RetryingClient {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PipelineError::Network(e.to_string()))?;
        Ok(Self {
            client,
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        })
    }

    /// POST `body` as JSON to `url`, retrying retryable failures with
    /// delays of `base_delay * 2^attempt` between attempts. Returns the
    /// successful response untouched for the caller to interpret.
    pub async fn post_json(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        for attempt in 0..self.max_attempts {
            let last = attempt + 1 == self.max_attempts;
            debug!(url, attempt = attempt + 1, "dispatching request");

            match self.client.post(url).json(body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(url, %status, "request succeeded");
                        return Ok(response);
                    }
                    if status.is_client_error() {
                        // Terminal: surface the structured error body, no retry.
                        let message = read_error_message(response).await;
                        warn!(url, %status, message, "client error, not retrying");
                        return Err(PipelineError::Client { status: status.as_u16(), message });
                    }
                    warn!(url, %status, attempt = attempt + 1, "retryable failure status");
                    if last {
                        return Err(PipelineError::Server { status: status.as_u16() });
                    }
                }
                Err(e) => {
                    warn!(url, error = %e, attempt = attempt + 1, "request failed without response");
                    if last {
                        return Err(PipelineError::Network(e.to_string()));
                    }
                }
            }

            let delay = self.base_delay * 2u32.saturating_pow(attempt.min(16) as u32);
            debug!(url, delay_ms = delay.as_millis() as u64, "backing off before retry");
            tokio::time::sleep(delay).await;
        }

        // max_attempts is clamped to >= 1, so every loop path returns.
        Err(PipelineError::Network(
            "transport exhausted all attempts without a result".to_string(),
        ))
    }
}

async fn read_error_message(response: reqwest::Response) -> String {
    match response.json::<ErrorBody>().await {
        Ok(ErrorBody { message: Some(message) }) => message,
        _ => "The remote service rejected the request".to_string(),
    }
}
