//! Wire formats of the external services and of our own proxy endpoint.
//! Every field the upstreams may omit is an `Option`; filling the gaps is the
//! normalizer's job, not the decoder's.

use serde::{Deserialize, Serialize};

/// Solved-count statistics from the LeetCode stats API (`GET /<username>`).
/// Unknown users still answer 200, with `status = "error"` and no counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_solved: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easy_solved: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_solved: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_solved: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_easy: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_medium: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hard: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_rate: Option<f64>,
}

/// `data` of the `userContestRankingInfo` GraphQL query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_contest_ranking: Option<ContestRanking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_contest_ranking_history: Option<Vec<ContestHistoryEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestRanking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended_contests_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_ranking: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_participants: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestHistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contest: Option<ContestInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: u32,
    pub name: String,
    pub icon: String,
}

/// Body of `GET /api/stats`: the two first-judge upstream answers merged with
/// the badge list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<SolvedStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contest: Option<ContestData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<Vec<Badge>>,
}

/// `{ "error": "..." }`, returned by the proxy with any non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// Codeforces API envelope. `status` is `"OK"` or `"FAILED"`; on failure
/// `comment` explains why and `result` is absent.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeforcesEnvelope<T> {
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub result: Option<T>,
}

/// One user from `user.info`. Unrated accounts have no rating or rank fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesUser {
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub max_rating: Option<i64>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub max_rank: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_solved_stats() {
        let json = r#"{"status":"success","message":"retrieved","totalSolved":684,
            "easySolved":316,"totalEasy":873,"mediumSolved":339,"totalMedium":1829,
            "hardSolved":29,"totalHard":824,"acceptanceRate":61.2,"ranking":167220,
            "contributionPoints":120,"reputation":0}"#;
        let stats: SolvedStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.easy_solved, Some(316));
        assert_eq!(stats.total_medium, Some(1829));
        assert_eq!(stats.ranking, Some(167_220));
    }

    #[test]
    fn test_parse_unknown_user_stats() {
        let json = r#"{"status":"error","message":"user does not exist"}"#;
        let stats: SolvedStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.status.as_deref(), Some("error"));
        assert!(stats.easy_solved.is_none());
    }

    #[test]
    fn test_parse_contest_data_with_null_ranking() {
        let json = r#"{"userContestRanking":null,"userContestRankingHistory":[
            {"attended":true,"rating":1520.4,"ranking":3021,
             "contest":{"title":"Weekly Contest 400","startTime":1717295400}}]}"#;
        let data: ContestData = serde_json::from_str(json).unwrap();
        assert!(data.user_contest_ranking.is_none());
        let history = data.user_contest_ranking_history.unwrap();
        assert_eq!(history[0].contest.as_ref().unwrap().start_time, Some(1_717_295_400));
    }

    #[test]
    fn test_stats_payload_skips_absent_fields() {
        let payload = StatsPayload {
            stats: Some(SolvedStats {
                easy_solved: Some(500),
                ..SolvedStats::default()
            }),
            contest: None,
            badges: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"stats":{"easySolved":500}}"#);
    }

    #[test]
    fn test_parse_codeforces_envelope() {
        let json = r#"{"status":"OK","result":[{"handle":"yash280876","rating":1432,
            "maxRating":1501,"rank":"specialist","maxRank":"specialist"}]}"#;
        let env: CodeforcesEnvelope<Vec<CodeforcesUser>> = serde_json::from_str(json).unwrap();
        let user = &env.result.unwrap()[0];
        assert_eq!(user.rating, Some(1432));
        assert_eq!(user.max_rating, Some(1501));
        assert_eq!(user.rank.as_deref(), Some("specialist"));
    }

    #[test]
    fn test_parse_codeforces_failure() {
        let json = r#"{"status":"FAILED","comment":"handles: User with handle nobody not found"}"#;
        let env: CodeforcesEnvelope<Vec<CodeforcesUser>> = serde_json::from_str(json).unwrap();
        assert_eq!(env.status, "FAILED");
        assert!(env.result.is_none());
        assert!(env.comment.unwrap().contains("not found"));
    }
}
