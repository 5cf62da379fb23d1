use crate::error::FetchError;
use crate::types::ErrorBody;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::debug;

const USER_AGENT: &str = concat!("profile-stats/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Shared reqwest client for every outbound call. The timeout is the only
/// deadline any fetch gets.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

/// Send `request` and decode a JSON body, recording latency and outcome under
/// the `endpoint` label.
pub async fn send_json<T: DeserializeOwned>(
    endpoint: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, FetchError> {
    let start = Instant::now();
    let res = execute(endpoint, request).await;
    let ms = start.elapsed().as_secs_f64() * 1000.0;
    metrics::histogram!("profile_upstream_latency_ms", "endpoint" => endpoint).record(ms);
    match &res {
        Ok(_) => {
            metrics::counter!("profile_upstream_requests_total", "endpoint" => endpoint, "status" => "ok")
                .increment(1);
        }
        Err(e) => {
            metrics::counter!("profile_upstream_requests_total", "endpoint" => endpoint, "status" => "error")
                .increment(1);
            metrics::counter!(
                "profile_upstream_errors_total",
                "endpoint" => endpoint,
                "kind" => e.kind().as_str()
            )
            .increment(1);
        }
    }
    res
}

async fn execute<T: DeserializeOwned>(
    endpoint: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, FetchError> {
    let resp = request
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(endpoint, &e))?;
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| FetchError::from_reqwest(endpoint, &e))?;

    debug!(endpoint, status = status.as_u16(), bytes = body.len(), "upstream responded");

    if !status.is_success() {
        return Err(FetchError::upstream(
            endpoint,
            Some(status.as_u16()),
            error_message(&body, status),
        ));
    }

    serde_json::from_slice(&body)
        .map_err(|e| FetchError::upstream(endpoint, None, format!("malformed JSON: {e}")))
}

/// Codeforces reports failures as `{ "status": "FAILED", "comment": ... }`.
#[derive(serde::Deserialize)]
struct CommentBody {
    comment: String,
}

/// Prefer the `{ "error": ... }` body our own proxy sends, then a judge
/// `comment`, then a truncated body, then the status reason.
fn error_message(body: &[u8], status: reqwest::StatusCode) -> String {
    if let Ok(ErrorBody { error }) = serde_json::from_slice(body) {
        return error;
    }
    if let Ok(CommentBody { comment }) = serde_json::from_slice(body) {
        return comment;
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();
    }
    text.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
