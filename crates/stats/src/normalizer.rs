//! Single place where missing first-judge data is filled in.
//!
//! Each field is coalesced on its own: a payload carrying only `easySolved`
//! keeps that value and takes every other field from [`FALLBACKS`].

use chrono::DateTime;
use common::types::{
    ContestData, ContestHistoryEntry, ContestInfo, ContestRanking, SolvedStats, StatsPayload,
};

use crate::record::{CategoryCounts, RatingPoint, StatisticsRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallbacks {
    pub easy: CategoryCounts,
    pub medium: CategoryCounts,
    pub hard: CategoryCounts,
    pub ranking: u64,
}

pub const FALLBACKS: Fallbacks = Fallbacks {
    easy: CategoryCounts::new(316, 873),
    medium: CategoryCounts::new(339, 1829),
    hard: CategoryCounts::new(29, 824),
    ranking: 167_220,
};

/// `None` means the payload has not arrived (or its fetch failed); the result
/// is then the fallback table alone.
pub fn normalize(payload: Option<&StatsPayload>) -> StatisticsRecord {
    normalize_with(payload, &FALLBACKS)
}

pub fn normalize_with(payload: Option<&StatsPayload>, fallbacks: &Fallbacks) -> StatisticsRecord {
    let stats = payload.and_then(|p| p.stats.as_ref());
    let contest = payload.and_then(|p| p.contest.as_ref());
    let ranking_info = contest.and_then(|c| c.user_contest_ranking.as_ref());

    StatisticsRecord {
        easy: counts(
            stats.and_then(|s| s.easy_solved),
            stats.and_then(|s| s.total_easy),
            fallbacks.easy,
        ),
        medium: counts(
            stats.and_then(|s| s.medium_solved),
            stats.and_then(|s| s.total_medium),
            fallbacks.medium,
        ),
        hard: counts(
            stats.and_then(|s| s.hard_solved),
            stats.and_then(|s| s.total_hard),
            fallbacks.hard,
        ),
        rating: ranking_info.and_then(|r| r.rating).filter(|r| r.is_finite()),
        attended_contests: ranking_info
            .and_then(|r| r.attended_contests_count)
            .map_or(0, saturating_u32),
        ranking: stats
            .and_then(|s| s.ranking)
            .and_then(positive_u64)
            .unwrap_or(fallbacks.ranking),
        contest_ranking: ranking_info
            .and_then(|r| r.global_ranking)
            .and_then(positive_u64),
        total_participants: ranking_info
            .and_then(|r| r.total_participants)
            .and_then(positive_u64),
        top_percentage: ranking_info
            .and_then(|r| r.top_percentage)
            .filter(|p| p.is_finite()),
        history: history(contest.and_then(|c| c.user_contest_ranking_history.as_deref())),
        badges: payload
            .and_then(|p| p.badges.clone())
            .unwrap_or_default(),
    }
}

/// Re-running the normalizer over its own output changes nothing.
pub fn renormalize(record: &StatisticsRecord) -> StatisticsRecord {
    normalize(Some(&StatsPayload::from(record)))
}

/// Absent solved counts take the fallback; non-positive totals count as
/// absent. Total is raised to solved when a stale fallback total is smaller.
fn counts(solved: Option<i64>, total: Option<i64>, fallback: CategoryCounts) -> CategoryCounts {
    let solved = solved.map_or(fallback.solved, saturating_u32);
    let total = total
        .filter(|t| *t > 0)
        .map_or(fallback.total, saturating_u32);
    CategoryCounts {
        solved,
        total: total.max(solved).max(1),
    }
}

fn history(entries: Option<&[ContestHistoryEntry]>) -> Vec<RatingPoint> {
    let mut points: Vec<RatingPoint> = entries
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| {
            let contest = entry.contest.as_ref()?;
            let start_time = DateTime::from_timestamp(contest.start_time?, 0)?;
            let rating = entry.rating.filter(|r| r.is_finite())?;
            Some(RatingPoint {
                contest: contest.title.clone().unwrap_or_default(),
                start_time,
                rating,
                attended: entry.attended.unwrap_or(false),
                ranking: entry.ranking.and_then(positive_u64),
            })
        })
        .collect();
    points.sort_by_key(|p| p.start_time);
    points
}

fn saturating_u32(v: i64) -> u32 {
    u32::try_from(v.max(0)).unwrap_or(u32::MAX)
}

fn positive_u64(v: i64) -> Option<u64> {
    u64::try_from(v).ok().filter(|v| *v > 0)
}

impl From<&StatisticsRecord> for StatsPayload {
    fn from(record: &StatisticsRecord) -> Self {
        let history = record
            .history
            .iter()
            .map(|p| ContestHistoryEntry {
                attended: Some(p.attended),
                rating: Some(p.rating),
                ranking: p.ranking.and_then(|r| i64::try_from(r).ok()),
                contest: Some(ContestInfo {
                    title: Some(p.contest.clone()),
                    start_time: Some(p.start_time.timestamp()),
                }),
            })
            .collect();

        StatsPayload {
            stats: Some(SolvedStats {
                total_solved: Some(i64::from(record.total_solved())),
                easy_solved: Some(i64::from(record.easy.solved)),
                medium_solved: Some(i64::from(record.medium.solved)),
                hard_solved: Some(i64::from(record.hard.solved)),
                total_easy: Some(i64::from(record.easy.total)),
                total_medium: Some(i64::from(record.medium.total)),
                total_hard: Some(i64::from(record.hard.total)),
                ranking: i64::try_from(record.ranking).ok(),
                ..SolvedStats::default()
            }),
            contest: Some(ContestData {
                user_contest_ranking: Some(ContestRanking {
                    attended_contests_count: Some(i64::from(record.attended_contests)),
                    rating: record.rating,
                    global_ranking: record.contest_ranking.and_then(|r| i64::try_from(r).ok()),
                    total_participants: record
                        .total_participants
                        .and_then(|r| i64::try_from(r).ok()),
                    top_percentage: record.top_percentage,
                }),
                user_contest_ranking_history: Some(history),
            }),
            badges: Some(record.badges.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;
    use common::types::Badge;

    fn stats_only(stats: SolvedStats) -> StatsPayload {
        StatsPayload {
            stats: Some(stats),
            contest: None,
            badges: None,
        }
    }

    fn entry(title: &str, start: Option<i64>, rating: Option<f64>) -> ContestHistoryEntry {
        ContestHistoryEntry {
            attended: Some(true),
            rating,
            ranking: Some(1200),
            contest: Some(ContestInfo {
                title: Some(title.to_string()),
                start_time: start,
            }),
        }
    }

    fn full_payload() -> StatsPayload {
        StatsPayload {
            stats: Some(SolvedStats {
                easy_solved: Some(320),
                total_easy: Some(880),
                medium_solved: Some(350),
                total_medium: Some(1840),
                hard_solved: Some(31),
                total_hard: Some(830),
                ranking: Some(150_000),
                ..SolvedStats::default()
            }),
            contest: Some(ContestData {
                user_contest_ranking: Some(ContestRanking {
                    attended_contests_count: Some(12),
                    rating: Some(1623.7),
                    global_ranking: Some(98_765),
                    total_participants: Some(650_000),
                    top_percentage: Some(14.2),
                }),
                user_contest_ranking_history: Some(vec![
                    entry("Weekly Contest 392", Some(1_712_457_000), Some(1623.7)),
                    entry("Weekly Contest 390", Some(1_711_247_400), Some(1580.1)),
                    entry("Biweekly Contest 127", Some(1_711_809_000), Some(1601.0)),
                ]),
            }),
            badges: Some(vec![Badge {
                id: 1,
                name: "50 Days Badge".to_string(),
                icon: "https://example.invalid/50.png".to_string(),
            }]),
        }
    }

    #[test]
    fn test_absent_payload_is_fallback_table() {
        let record = normalize(None);
        assert_eq!(record.easy, CategoryCounts::new(316, 873));
        assert_eq!(record.medium, CategoryCounts::new(339, 1829));
        assert_eq!(record.hard, CategoryCounts::new(29, 824));
        assert_eq!(record.ranking, 167_220);
        assert!(record.rating.is_none());
        assert_eq!(record.attended_contests, 0);
        assert!(record.history.is_empty());
        assert!(record.badges.is_empty());
    }

    #[test]
    fn test_partial_stats_keep_present_fields() {
        let payload = stats_only(SolvedStats {
            easy_solved: Some(500),
            ..SolvedStats::default()
        });
        let record = normalize(Some(&payload));
        assert_eq!(record.easy.solved, 500);
        assert_eq!(record.easy.total, 873);
        assert_eq!(record.medium.solved, 339);
        assert_eq!(record.medium.total, 1829);
        assert_eq!(record.hard, CategoryCounts::new(29, 824));
    }

    #[test]
    fn test_full_payload_passes_through() {
        let record = normalize(Some(&full_payload()));
        assert_eq!(record.easy, CategoryCounts::new(320, 880));
        assert_eq!(record.medium, CategoryCounts::new(350, 1840));
        assert_eq!(record.hard, CategoryCounts::new(31, 830));
        assert_eq!(record.ranking, 150_000);
        assert_eq!(record.rating, Some(1623.7));
        assert_eq!(record.attended_contests, 12);
        assert_eq!(record.contest_ranking, Some(98_765));
        assert_eq!(record.total_participants, Some(650_000));
        assert_eq!(record.top_percentage, Some(14.2));
        assert_eq!(record.badges.len(), 1);
    }

    #[test]
    fn test_zero_solved_is_kept_but_zero_total_is_replaced() {
        let payload = stats_only(SolvedStats {
            hard_solved: Some(0),
            total_hard: Some(0),
            total_medium: Some(-4),
            ..SolvedStats::default()
        });
        let record = normalize(Some(&payload));
        assert_eq!(record.hard, CategoryCounts::new(0, 824));
        assert_eq!(record.medium.total, 1829);
    }

    #[test]
    fn test_solved_above_total_raises_total() {
        let payload = stats_only(SolvedStats {
            easy_solved: Some(900),
            hard_solved: Some(-3),
            ..SolvedStats::default()
        });
        let record = normalize(Some(&payload));
        assert_eq!(record.easy, CategoryCounts::new(900, 900));
        assert_eq!(record.hard.solved, 0);
    }

    #[test]
    fn test_zero_fallback_total_still_positive() {
        let fallbacks = Fallbacks {
            easy: CategoryCounts::new(0, 0),
            ..FALLBACKS
        };
        let record = normalize_with(None, &fallbacks);
        assert_eq!(record.easy, CategoryCounts::new(0, 1));
    }

    #[test]
    fn test_counts_invariant_over_awkward_inputs() {
        let values = [None, Some(-1), Some(0), Some(1), Some(5_000), Some(i64::MAX)];
        for solved in values {
            for total in values {
                let payload = stats_only(SolvedStats {
                    easy_solved: solved,
                    total_easy: total,
                    medium_solved: solved,
                    total_medium: total,
                    hard_solved: solved,
                    total_hard: total,
                    ..SolvedStats::default()
                });
                let record = normalize(Some(&payload));
                for category in Category::ALL {
                    let c = record.counts(category);
                    assert!(c.total > 0, "{solved:?}/{total:?}");
                    assert!(c.solved <= c.total, "{solved:?}/{total:?}");
                }
            }
        }
    }

    #[test]
    fn test_zero_ranking_takes_fallback() {
        let payload = stats_only(SolvedStats {
            ranking: Some(0),
            ..SolvedStats::default()
        });
        assert_eq!(normalize(Some(&payload)).ranking, 167_220);
    }

    #[test]
    fn test_missing_contest_ranking_leaves_options_empty() {
        let payload = StatsPayload {
            stats: None,
            contest: Some(ContestData {
                user_contest_ranking: None,
                user_contest_ranking_history: None,
            }),
            badges: Some(vec![]),
        };
        let record = normalize(Some(&payload));
        assert!(record.rating.is_none());
        assert!(record.contest_ranking.is_none());
        assert!(record.total_participants.is_none());
        assert!(record.top_percentage.is_none());
        assert_eq!(record.easy, FALLBACKS.easy);
    }

    #[test]
    fn test_history_sorted_and_invalid_points_dropped() {
        let mut payload = full_payload();
        if let Some(contest) = payload.contest.as_mut() {
            let history = contest.user_contest_ranking_history.as_mut().unwrap();
            history.push(entry("No start", None, Some(1500.0)));
            history.push(entry("No rating", Some(1_700_000_000), None));
            history.push(ContestHistoryEntry {
                contest: None,
                ..ContestHistoryEntry::default()
            });
        }
        let record = normalize(Some(&payload));
        let titles: Vec<_> = record.history.iter().map(|p| p.contest.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Weekly Contest 390", "Biweekly Contest 127", "Weekly Contest 392"]
        );
        assert!(record
            .history
            .windows(2)
            .all(|w| w[0].start_time <= w[1].start_time));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let payloads = [
            None,
            Some(full_payload()),
            Some(stats_only(SolvedStats {
                easy_solved: Some(500),
                ..SolvedStats::default()
            })),
            Some(stats_only(SolvedStats {
                easy_solved: Some(2000),
                total_hard: Some(0),
                ..SolvedStats::default()
            })),
        ];
        for payload in &payloads {
            let once = normalize(payload.as_ref());
            let twice = renormalize(&once);
            assert_eq!(once, twice);
            assert_eq!(renormalize(&twice), twice);
        }
    }
}
