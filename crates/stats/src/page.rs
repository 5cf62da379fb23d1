//! Load state of one profile page visit.
//!
//! Refetch is last-write-wins: every [`PageSession::begin_fetch`] starts a new
//! generation and cancels the previous one, and updates tagged with an older
//! generation are dropped. Dropping the session cancels whatever is in flight.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::fetcher::{Handles, ProxySource, SecondarySource, StatsFetcher, StatsUpdate, Tagged};
use crate::normalizer::normalize;
use crate::record::{SecondarySourceRecord, StatisticsRecord};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready(StatisticsRecord),
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    pub primary: LoadState,
    pub secondary: SecondarySourceRecord,
}

impl PageState {
    /// Records are replaced whole, never patched.
    pub fn apply(&mut self, update: StatsUpdate) {
        match update {
            StatsUpdate::Primary(Ok(payload)) => {
                self.primary = LoadState::Ready(normalize(Some(payload.as_ref())));
            }
            StatsUpdate::Primary(Err(e)) => {
                warn!(endpoint = e.endpoint(), error = %e, "primary stats unavailable");
                self.primary = LoadState::Failed(e.message().to_string());
            }
            StatsUpdate::Secondary(Ok(user)) => {
                self.secondary = SecondarySourceRecord::from(user);
            }
            StatsUpdate::Secondary(Err(e)) => {
                warn!(endpoint = e.endpoint(), error = %e, "secondary rating unavailable");
                self.secondary = SecondarySourceRecord::default();
            }
        }
    }

    pub fn record(&self) -> Option<&StatisticsRecord> {
        match &self.primary {
            LoadState::Ready(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.primary, LoadState::Loading)
    }

    /// A failed primary fetch offers a retry; nothing else does.
    pub fn retry_available(&self) -> bool {
        matches!(self.primary, LoadState::Failed(_))
    }
}

pub struct PageSession {
    generation: u64,
    cancel: CancellationToken,
    state: PageState,
    pending: usize,
}

impl Default for PageSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSession {
    pub fn new() -> Self {
        Self {
            generation: 0,
            cancel: CancellationToken::new(),
            state: PageState::default(),
            pending: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Both sources of the current generation have answered.
    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }

    /// Start a new generation: cancel the old one, reset to `Loading`, and
    /// hand back the tag and token the new fetch must carry.
    pub fn begin_fetch(&mut self) -> (u64, CancellationToken) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation += 1;
        self.state = PageState::default();
        self.pending = 2;
        (self.generation, self.cancel.clone())
    }

    /// Returns `false` when the update belongs to a superseded generation.
    pub fn apply(&mut self, tagged: Tagged) -> bool {
        if tagged.generation != self.generation {
            info!(
                stale = tagged.generation,
                current = self.generation,
                "ignoring stale fetch result"
            );
            return false;
        }
        self.state.apply(tagged.update);
        self.pending = self.pending.saturating_sub(1);
        true
    }

    /// Fetch both sources for `handles` and fold each result in as it
    /// arrives. Returns once the generation has settled.
    pub async fn refresh<P, S>(
        &mut self,
        fetcher: &Arc<StatsFetcher<P, S>>,
        handles: Handles,
    ) -> &PageState
    where
        P: ProxySource + Send + Sync + 'static,
        S: SecondarySource + Send + Sync + 'static,
    {
        let (generation, token) = self.begin_fetch();
        let (tx, mut rx) = mpsc::channel(2);
        let tasks = fetcher.spawn(handles, generation, tx, token);
        while let Some(tagged) = rx.recv().await {
            self.apply(tagged);
        }
        // A task that panicked closed its sender without delivering; its
        // source stays `Loading`.
        for task in tasks {
            if let Err(e) = task.await {
                warn!(generation, error = %e, "fetch task did not finish");
            }
        }
        &self.state
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::FetchError;
    use common::types::{CodeforcesUser, SolvedStats, StatsPayload};

    fn payload(easy: i64) -> Box<StatsPayload> {
        Box::new(StatsPayload {
            stats: Some(SolvedStats {
                easy_solved: Some(easy),
                ..SolvedStats::default()
            }),
            ..StatsPayload::default()
        })
    }

    fn tagged(generation: u64, update: StatsUpdate) -> Tagged {
        Tagged { generation, update }
    }

    #[test]
    fn test_primary_success_normalizes() {
        let mut state = PageState::default();
        assert!(state.is_loading());
        state.apply(StatsUpdate::Primary(Ok(payload(500))));
        let record = state.record().unwrap();
        assert_eq!(record.easy.solved, 500);
        assert_eq!(record.easy.total, 873);
        assert_eq!(record.medium.solved, 339);
        assert!(!state.retry_available());
    }

    #[test]
    fn test_primary_failure_offers_retry() {
        let mut state = PageState::default();
        state.apply(StatsUpdate::Primary(Err(FetchError::upstream(
            "stats_proxy",
            Some(500),
            "Failed to fetch LeetCode data",
        ))));
        assert_eq!(
            state.primary,
            LoadState::Failed("Failed to fetch LeetCode data".to_string())
        );
        assert!(state.retry_available());
    }

    #[test]
    fn test_secondary_failure_never_fails_page() {
        let mut state = PageState::default();
        state.apply(StatsUpdate::Primary(Ok(payload(1))));
        state.apply(StatsUpdate::Secondary(Err(FetchError::network(
            "codeforces_user_info",
            "timed out",
        ))));
        assert!(state.record().is_some());
        assert!(!state.secondary.is_populated());
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut session = PageSession::new();
        let (first, first_token) = session.begin_fetch();
        let (second, _) = session.begin_fetch();
        assert!(first_token.is_cancelled());
        assert!(second > first);

        assert!(!session.apply(tagged(first, StatsUpdate::Primary(Ok(payload(1))))));
        assert!(session.state().is_loading());

        assert!(session.apply(tagged(second, StatsUpdate::Primary(Ok(payload(2))))));
        assert_eq!(session.state().record().unwrap().easy.solved, 2);
        assert!(!session.is_complete());

        let user = CodeforcesUser {
            rating: Some(1901),
            rank: Some("candidate master".to_string()),
            ..CodeforcesUser::default()
        };
        assert!(session.apply(tagged(second, StatsUpdate::Secondary(Ok(user)))));
        assert!(session.is_complete());
        assert_eq!(session.state().secondary.rating, Some(1901));
    }

    #[test]
    fn test_refetch_resets_to_loading() {
        let mut session = PageSession::new();
        let (generation, _) = session.begin_fetch();
        session.apply(tagged(generation, StatsUpdate::Primary(Ok(payload(3)))));
        assert!(session.state().record().is_some());

        session.begin_fetch();
        assert_eq!(session.state(), &PageState::default());
        assert_eq!(session.generation(), generation + 1);
    }

    #[test]
    fn test_drop_cancels_in_flight_generation() {
        let mut session = PageSession::new();
        let (_, token) = session.begin_fetch();
        assert!(!token.is_cancelled());
        drop(session);
        assert!(token.is_cancelled());
    }

    struct PanickingProxy;

    impl ProxySource for PanickingProxy {
        async fn fetch_stats(&self, _username: &str) -> Result<StatsPayload, FetchError> {
            panic!("malformed upstream payload")
        }
    }

    struct FixedSecondary;

    impl SecondarySource for FixedSecondary {
        async fn fetch_profile(&self, handle: &str) -> Result<CodeforcesUser, FetchError> {
            Ok(CodeforcesUser {
                handle: Some(handle.to_string()),
                rating: Some(1500),
                ..CodeforcesUser::default()
            })
        }
    }

    #[tokio::test]
    async fn test_refresh_settles_when_a_fetch_task_panics() {
        let fetcher = Arc::new(StatsFetcher::new(PanickingProxy, FixedSecondary));
        let handles = Handles {
            primary: "yash".to_string(),
            secondary: "cf".to_string(),
        };
        let mut session = PageSession::new();

        let state = session.refresh(&fetcher, handles).await;
        assert_eq!(state.primary, LoadState::Loading);
        assert_eq!(state.secondary.rating, Some(1500));
        assert!(!session.is_complete());
    }
}
