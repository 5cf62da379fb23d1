use anyhow::{anyhow, Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Mutex;

static PROM_HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

pub fn describe() {
    describe_gauge!(
        "profile_web_build_info",
        "Build info for the profile stats server (value is always 1)."
    );
    describe_histogram!(
        "profile_upstream_latency_ms",
        "Latency of outbound judge and proxy calls, by endpoint."
    );
    describe_counter!(
        "profile_upstream_requests_total",
        "Outbound calls by endpoint and status (ok|error)."
    );
    describe_counter!(
        "profile_upstream_errors_total",
        "Failed outbound calls by endpoint and kind (network|status|body)."
    );
    describe_counter!(
        "profile_proxy_requests_total",
        "Aggregations served by /api/stats, by outcome (ok|partial|error)."
    );
    describe_counter!(
        "profile_page_loads_total",
        "Profile page loads by primary outcome (ready|failed)."
    );
    describe_counter!(
        "profile_tracing_error_events",
        "ERROR-level tracing events."
    );
}

/// Install the global Prometheus recorder once and return a handle for
/// rendering `/metrics`. Upkeep runs on each `/metrics` request.
pub fn init_global() -> Result<PrometheusHandle> {
    let mut slot = PROM_HANDLE
        .lock()
        .map_err(|e| anyhow!("prometheus handle lock poisoned: {e}"))?;
    let handle = if let Some(handle) = slot.as_ref() {
        handle.clone()
    } else {
        describe();
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus recorder")?;
        *slot = Some(handle.clone());
        handle
    };
    drop(slot);

    let git_sha = std::env::var("GIT_SHA").unwrap_or_else(|_| "unknown".to_string());
    ::metrics::gauge!(
        "profile_web_build_info",
        "version" => env!("CARGO_PKG_VERSION"),
        "git_sha" => git_sha,
    )
    .set(1.0);

    Ok(handle)
}
