//! Fan-out behind `GET /api/stats`: solved counts and contest ranking are
//! fetched concurrently and merged with the static badge list.

use common::error::FetchError;
use common::leetcode::LeetCodeClient;
use common::types::{Badge, ContestData, SolvedStats, StatsPayload};
use std::future::Future;
use tracing::{error, info, warn};

pub const USERNAME_REQUIRED_MESSAGE: &str = "Username is required";
pub const STATS_FAILURE_MESSAGE: &str = "Failed to fetch LeetCode data";

pub trait SolvedCountSource {
    fn solved_stats(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<SolvedStats, FetchError>> + Send;
}

pub trait ContestSource {
    fn contest(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<ContestData, FetchError>> + Send;
}

impl SolvedCountSource for LeetCodeClient {
    async fn solved_stats(&self, username: &str) -> Result<SolvedStats, FetchError> {
        self.fetch_solved_stats(username).await
    }
}

impl ContestSource for LeetCodeClient {
    async fn contest(&self, username: &str) -> Result<ContestData, FetchError> {
        self.fetch_contest(username).await
    }
}

pub fn static_badges() -> Vec<Badge> {
    [
        (
            "200 Days Badge 2024",
            "https://leetcode.com/static/images/badges/2024/lg/2024-annual-100.png",
        ),
        (
            "75 Days Badge",
            "https://leetcode.com/static/images/badges/2024/lg/dcc-2024-2.png",
        ),
        (
            "50 Days Badge",
            "https://leetcode.com/static/images/badges/2024/lg/dcc-2024-1.png",
        ),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, icon), id)| Badge {
        id,
        name: name.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

/// Trimmed username, or `None` when absent or blank.
pub fn requested_username(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|u| !u.is_empty())
}

pub struct ProxyAggregator<S, C> {
    stats: S,
    contest: C,
}

impl<S, C> ProxyAggregator<S, C>
where
    S: SolvedCountSource + Sync,
    C: ContestSource + Sync,
{
    pub fn new(stats: S, contest: C) -> Self {
        Self { stats, contest }
    }

    /// Fails only when the solved-count call fails. A contest failure is
    /// logged and leaves `contest` absent.
    pub async fn aggregate(&self, username: &str) -> Result<StatsPayload, FetchError> {
        let (stats, contest) = tokio::join!(
            self.stats.solved_stats(username),
            self.contest.contest(username)
        );

        let stats = match stats {
            Ok(s) => s,
            Err(e) => {
                error!(username, endpoint = e.endpoint(), error = %e, "solved-count fetch failed");
                metrics::counter!("profile_proxy_requests_total", "outcome" => "error").increment(1);
                return Err(e);
            }
        };

        let contest = match contest {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(username, endpoint = e.endpoint(), error = %e, "contest fetch failed, omitting contest data");
                metrics::counter!("profile_proxy_requests_total", "outcome" => "partial").increment(1);
                None
            }
        };
        if contest.is_some() {
            metrics::counter!("profile_proxy_requests_total", "outcome" => "ok").increment(1);
        }

        info!(username, has_contest = contest.is_some(), "aggregated stats");
        Ok(StatsPayload {
            stats: Some(stats),
            contest,
            badges: Some(static_badges()),
        })
    }
}
