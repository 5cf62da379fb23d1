use crate::error::FetchError;
use crate::http::send_json;
use crate::types::{ContestData, GraphQlRequest, GraphQlResponse, SolvedStats};
use serde::Serialize;
use tracing::debug;

pub const STATS_ENDPOINT: &str = "leetcode_stats";
pub const CONTEST_ENDPOINT: &str = "leetcode_contest";

const CONTEST_QUERY: &str = "
query userContestRankingInfo($username: String!) {
  userContestRanking(username: $username) {
    attendedContestsCount
    rating
    globalRanking
    totalParticipants
    topPercentage
  }
  userContestRankingHistory(username: $username) {
    attended
    rating
    ranking
    contest {
      title
      startTime
    }
  }
}
";

#[derive(Serialize)]
struct ContestVariables<'a> {
    username: &'a str,
}

/// Client for the two upstreams behind `/api/stats`: the public solved-count
/// stats API and LeetCode's GraphQL contest ranking.
#[derive(Clone)]
pub struct LeetCodeClient {
    stats_api_url: String,
    graphql_url: String,
    client: reqwest::Client,
}

impl LeetCodeClient {
    pub fn new(stats_api_url: &str, graphql_url: &str, client: reqwest::Client) -> Self {
        Self {
            stats_api_url: stats_api_url.trim_end_matches('/').to_string(),
            graphql_url: graphql_url.to_string(),
            client,
        }
    }

    pub fn stats_url(&self, username: &str) -> String {
        format!("{}/{}", self.stats_api_url, urlencoding::encode(username))
    }

    pub async fn fetch_solved_stats(&self, username: &str) -> Result<SolvedStats, FetchError> {
        let url = self.stats_url(username);
        debug!(url = %url, "fetching solved-count stats");
        send_json(STATS_ENDPOINT, self.client.get(&url)).await
    }

    /// Contest rating and per-contest history. A GraphQL response carrying
    /// only `errors` is an upstream failure; `data` with null members is not.
    pub async fn fetch_contest(&self, username: &str) -> Result<ContestData, FetchError> {
        debug!(username, "fetching contest ranking");
        let request = self.client.post(&self.graphql_url).json(&GraphQlRequest {
            query: CONTEST_QUERY,
            variables: ContestVariables { username },
        });
        let resp: GraphQlResponse<ContestData> = send_json(CONTEST_ENDPOINT, request).await?;
        match resp.data {
            Some(data) => Ok(data),
            None => {
                let message = if resp.errors.is_empty() {
                    "response carried no data".to_string()
                } else {
                    resp.errors
                        .iter()
                        .map(|e| e.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; ")
                };
                Err(FetchError::upstream(CONTEST_ENDPOINT, None, message))
            }
        }
    }
}
