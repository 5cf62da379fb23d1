use crate::error::FetchError;
use crate::http::send_json;
use crate::types::{CodeforcesEnvelope, CodeforcesUser};
use anyhow::{Context, Result};
use reqwest::Url;
use tracing::debug;

pub const ENDPOINT: &str = "codeforces_user_info";

#[derive(Clone)]
pub struct CodeforcesClient {
    user_info_url: Url,
    client: reqwest::Client,
}

impl CodeforcesClient {
    pub fn new(api_url: &str, client: reqwest::Client) -> Result<Self> {
        let user_info_url = Url::parse(&format!("{}/user.info", api_url.trim_end_matches('/')))
            .with_context(|| format!("invalid codeforces api url: {api_url}"))?;
        Ok(Self {
            user_info_url,
            client,
        })
    }

    pub fn user_info_url(&self, handle: &str) -> Url {
        let mut url = self.user_info_url.clone();
        url.query_pairs_mut().append_pair("handles", handle);
        url
    }

    /// `user.info` for a single handle. `status != "OK"` and an empty result
    /// are both upstream failures.
    pub async fn fetch_user(&self, handle: &str) -> Result<CodeforcesUser, FetchError> {
        let url = self.user_info_url(handle);
        debug!(url = %url, "fetching codeforces user");
        let envelope: CodeforcesEnvelope<Vec<CodeforcesUser>> =
            send_json(ENDPOINT, self.client.get(url)).await?;

        if envelope.status != "OK" {
            return Err(FetchError::upstream(
                ENDPOINT,
                None,
                envelope
                    .comment
                    .unwrap_or_else(|| format!("status {}", envelope.status)),
            ));
        }

        envelope
            .result
            .and_then(|users| users.into_iter().next())
            .ok_or_else(|| FetchError::upstream(ENDPOINT, None, format!("no user {handle} in result")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_url() {
        let client =
            CodeforcesClient::new("https://codeforces.com/api/", reqwest::Client::new()).unwrap();
        assert_eq!(
            client.user_info_url("yash280876").as_str(),
            "https://codeforces.com/api/user.info?handles=yash280876"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(CodeforcesClient::new("not a url", reqwest::Client::new()).is_err());
    }
}
