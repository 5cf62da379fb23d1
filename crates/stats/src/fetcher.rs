use anyhow::{Context, Result};
use common::codeforces::CodeforcesClient;
use common::error::FetchError;
use common::http::send_json;
use common::types::{CodeforcesUser, StatsPayload};
use reqwest::Url;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const PROXY_ENDPOINT: &str = "stats_proxy";

pub trait ProxySource {
    fn fetch_stats(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<StatsPayload, FetchError>> + Send;
}

pub trait SecondarySource {
    fn fetch_profile(
        &self,
        handle: &str,
    ) -> impl Future<Output = Result<CodeforcesUser, FetchError>> + Send;
}

/// Client for our own `/api/stats` endpoint, the way the browser would call it.
#[derive(Clone)]
pub struct ProxyClient {
    url: Url,
    client: reqwest::Client,
}

impl ProxyClient {
    pub fn new(proxy_url: &str, client: reqwest::Client) -> Result<Self> {
        let url =
            Url::parse(proxy_url).with_context(|| format!("invalid proxy url: {proxy_url}"))?;
        Ok(Self { url, client })
    }

    pub fn stats_url(&self, username: &str) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("username", username);
        url
    }
}

impl ProxySource for ProxyClient {
    async fn fetch_stats(&self, username: &str) -> Result<StatsPayload, FetchError> {
        let url = self.stats_url(username);
        debug!(url = %url, "fetching aggregated stats");
        send_json(PROXY_ENDPOINT, self.client.get(url)).await
    }
}

impl SecondarySource for CodeforcesClient {
    async fn fetch_profile(&self, handle: &str) -> Result<CodeforcesUser, FetchError> {
        self.fetch_user(handle).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handles {
    pub primary: String,
    pub secondary: String,
}

/// One source's answer. The two arrive in no particular order.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsUpdate {
    Primary(Result<Box<StatsPayload>, FetchError>),
    Secondary(Result<CodeforcesUser, FetchError>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    pub generation: u64,
    pub update: StatsUpdate,
}

pub struct StatsFetcher<P, S> {
    proxy: P,
    secondary: S,
}

impl<P, S> StatsFetcher<P, S>
where
    P: ProxySource + Send + Sync + 'static,
    S: SecondarySource + Send + Sync + 'static,
{
    pub fn new(proxy: P, secondary: S) -> Self {
        Self { proxy, secondary }
    }

    /// Both calls concurrently; returns once both have settled.
    pub async fn fetch_both(
        &self,
        handles: &Handles,
    ) -> (
        Result<StatsPayload, FetchError>,
        Result<CodeforcesUser, FetchError>,
    ) {
        tokio::join!(
            self.proxy.fetch_stats(&handles.primary),
            self.secondary.fetch_profile(&handles.secondary)
        )
    }

    /// Run each call as its own task and send its result on `tx` as soon as
    /// it lands. Both tasks exit early once `token` is cancelled; a closed
    /// channel just drops the result.
    pub fn spawn(
        self: &Arc<Self>,
        handles: Handles,
        generation: u64,
        tx: mpsc::Sender<Tagged>,
        token: CancellationToken,
    ) -> [JoinHandle<()>; 2] {
        let Handles { primary, secondary } = handles;

        let primary_task = {
            let this = Arc::clone(self);
            let tx = tx.clone();
            let token = token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!(generation, "primary fetch cancelled");
                    }
                    res = this.proxy.fetch_stats(&primary) => {
                        let update = StatsUpdate::Primary(res.map(Box::new));
                        deliver(&tx, Tagged { generation, update }).await;
                    }
                }
            })
        };

        let this = Arc::clone(self);
        let secondary_task = tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    debug!(generation, "secondary fetch cancelled");
                }
                res = this.secondary.fetch_profile(&secondary) => {
                    let update = StatsUpdate::Secondary(res);
                    deliver(&tx, Tagged { generation, update }).await;
                }
            }
        });

        [primary_task, secondary_task]
    }
}

async fn deliver(tx: &mpsc::Sender<Tagged>, tagged: Tagged) {
    let generation = tagged.generation;
    if tx.send(tagged).await.is_err() {
        debug!(generation, "page session gone, dropping fetch result");
    }
}
