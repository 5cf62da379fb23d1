mod metrics;
mod models;

use anyhow::{Context, Result};
use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use common::codeforces::CodeforcesClient;
use common::config::{Config, DEFAULT_CONFIG_PATH};
use common::http::build_client;
use common::leetcode::LeetCodeClient;
use common::types::ErrorBody;
use metrics_exporter_prometheus::PrometheusHandle;
use models::{ProfileView, SecondaryView};
use serde::{Deserialize, Serialize};
use stats::fetcher::{Handles, ProxyClient, StatsFetcher};
use stats::page::{LoadState, PageSession, PageState};
use stats::proxy::{
    requested_username, ProxyAggregator, STATS_FAILURE_MESSAGE, USERNAME_REQUIRED_MESSAGE,
};
use stats::record::{SecondarySourceRecord, StatisticsRecord};
use stats::segments::{RingEncoding, RingLayout};
use stats::tier::{classify_int, rank_label, RatingTier};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct AppState {
    pub config: Config,
    pub aggregator: ProxyAggregator<LeetCodeClient, LeetCodeClient>,
    pub fetcher: Arc<StatsFetcher<ProxyClient, CodeforcesClient>>,
    pub layout: RingLayout,
    pub prometheus: PrometheusHandle,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn from_config(config: Config, prometheus: PrometheusHandle) -> Result<Self> {
        let client = build_client(config.upstream.timeout())?;
        let leetcode = LeetCodeClient::new(
            &config.upstream.stats_api_url,
            &config.upstream.graphql_url,
            client.clone(),
        );
        let codeforces = CodeforcesClient::new(&config.upstream.codeforces_api_url, client.clone())?;
        let proxy = ProxyClient::new(&config.profile.proxy_url, client)?;

        Ok(Self {
            aggregator: ProxyAggregator::new(leetcode.clone(), leetcode),
            fetcher: Arc::new(StatsFetcher::new(proxy, codeforces)),
            layout: RingLayout::from(config.ring),
            prometheus,
            started_at: chrono::Utc::now(),
            config,
        })
    }

    /// Query parameters override the configured handles when non-blank.
    fn handles(&self, query: &ProfileQuery) -> Handles {
        let profile = &self.config.profile;
        Handles {
            primary: requested_username(query.username.as_deref())
                .unwrap_or(&profile.leetcode_handle)
                .to_string(),
            secondary: requested_username(query.codeforces.as_deref())
                .unwrap_or(&profile.codeforces_handle)
                .to_string(),
        }
    }
}

// --- Templates ---

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    handle: String,
}

#[derive(Template)]
#[template(path = "partials/profile.html")]
struct ProfileTemplate {
    view: ProfileView,
    secondary: SecondaryView,
}

#[derive(Template)]
#[template(path = "partials/profile_error.html")]
struct ProfileErrorTemplate {
    message: String,
    secondary: SecondaryView,
}

// --- Page loading ---

/// One page visit: fetch both sources and settle.
async fn load_page(state: &AppState, handles: Handles) -> PageState {
    let mut session = PageSession::new();
    let page = session.refresh(&state.fetcher, handles).await.clone();
    let outcome = match page.primary {
        LoadState::Ready(_) => "ready",
        LoadState::Failed(_) => "failed",
        LoadState::Loading => "loading",
    };
    ::metrics::counter!("profile_page_loads_total", "outcome" => outcome).increment(1);
    page
}

fn render(template: &impl Template) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "template render failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// --- Handlers ---

async fn index(State(state): State<Arc<AppState>>) -> Response {
    render(&DashboardTemplate {
        handle: state.config.profile.leetcode_handle.clone(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct StatsQuery {
    username: Option<String>,
}

async fn api_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Response {
    let Some(username) = requested_username(query.username.as_deref()) else {
        return error_response(StatusCode::BAD_REQUEST, USERNAME_REQUIRED_MESSAGE);
    };
    match state.aggregator.aggregate(username).await {
        Ok(payload) => Json(payload).into_response(),
        Err(_) => error_response(StatusCode::INTERNAL_SERVER_ERROR, STATS_FAILURE_MESSAGE),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
struct ProfileQuery {
    username: Option<String>,
    codeforces: Option<String>,
}

async fn profile_partial(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProfileQuery>,
) -> Response {
    let handles = state.handles(&query);
    let page = load_page(&state, handles.clone()).await;
    let secondary = SecondaryView::new(&handles.secondary, &page.secondary);

    match &page.primary {
        LoadState::Ready(record) => {
            let ring = RingEncoding::for_record(state.layout, record);
            render(&ProfileTemplate {
                view: ProfileView::build(&handles.primary, record, &ring),
                secondary,
            })
        }
        LoadState::Failed(message) => render(&ProfileErrorTemplate {
            message: message.clone(),
            secondary,
        }),
        LoadState::Loading => render(&ProfileErrorTemplate {
            message: "Statistics are still loading".to_string(),
            secondary,
        }),
    }
}

#[derive(Serialize)]
struct ProfileResponse {
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<StatisticsRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ring: Option<RingEncoding>,
    retry_available: bool,
    secondary: SecondarySourceRecord,
    rank_label: String,
    tier: RatingTier,
    max_tier: RatingTier,
}

async fn api_profile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProfileQuery>,
) -> Json<ProfileResponse> {
    let handles = state.handles(&query);
    let page = load_page(&state, handles).await;

    let retry_available = page.retry_available();
    let (state_label, record, error) = match page.primary {
        LoadState::Ready(record) => ("ready", Some(record), None),
        LoadState::Failed(message) => ("failed", None, Some(message)),
        LoadState::Loading => ("loading", None, None),
    };
    let ring = record
        .as_ref()
        .map(|r| RingEncoding::for_record(state.layout, r));

    Json(ProfileResponse {
        state: state_label,
        record,
        error,
        ring,
        retry_available,
        rank_label: rank_label(page.secondary.rank.as_deref()).to_string(),
        tier: classify_int(page.secondary.rating),
        max_tier: classify_int(page.secondary.max_rating),
        secondary: page.secondary,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = chrono::Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime,
    })
}

async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus.run_upkeep();
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.prometheus.render(),
    )
}

// --- Router ---

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/partials/profile", get(profile_partial))
        .route("/api/stats", get(api_stats))
        .route("/api/profile", get(api_profile))
        .route("/api/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;

    let (dispatch, _otel_guard) = common::observability::build_dispatch(
        "profile-web",
        &config.general.log_level,
        config.general.log_format,
    );
    tracing::dispatcher::set_global_default(dispatch).map_err(anyhow::Error::msg)?;
    info!(path = %config_path, "loaded config");

    let prometheus = metrics::init_global()?;
    let addr: SocketAddr = config
        .web_addr()
        .parse()
        .with_context(|| format!("invalid listen address: {}", config.web_addr()))?;
    let state = Arc::new(AppState::from_config(config, prometheus)?);

    let app = create_router(state);
    info!(%addr, "profile stats server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
