use chrono::{DateTime, Utc};
use common::types::{Badge, CodeforcesUser};
use serde::{Deserialize, Serialize};

/// Problem difficulty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Easy,
    Medium,
    Hard,
}

impl Category {
    /// Also the ring's paint order.
    pub const ALL: [Category; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Share of the full ring this category fills at 100% solved.
    pub fn ring_weight(&self) -> f64 {
        match self {
            Self::Easy | Self::Medium => 0.4,
            Self::Hard => 0.2,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Easy => "#43CD89",
            Self::Medium => "#FFB800",
            Self::Hard => "#FF375F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub solved: u32,
    pub total: u32,
}

impl CategoryCounts {
    pub const fn new(solved: u32, total: u32) -> Self {
        Self { solved, total }
    }

    /// `100 * solved / total`. Not defined for `total == 0`; normalized
    /// records never carry one.
    pub fn percentage(&self) -> f64 {
        100.0 * f64::from(self.solved) / f64::from(self.total)
    }
}

/// One contest in the first judge's rating history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPoint {
    pub contest: String,
    pub start_time: DateTime<Utc>,
    pub rating: f64,
    pub attended: bool,
    pub ranking: Option<u64>,
}

/// First-judge statistics after normalization: every category count is
/// present with `solved <= total` and `total > 0`, and `history` is sorted by
/// contest start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub easy: CategoryCounts,
    pub medium: CategoryCounts,
    pub hard: CategoryCounts,
    pub rating: Option<f64>,
    pub attended_contests: u32,
    pub ranking: u64,
    pub contest_ranking: Option<u64>,
    pub total_participants: Option<u64>,
    pub top_percentage: Option<f64>,
    pub history: Vec<RatingPoint>,
    pub badges: Vec<Badge>,
}

impl StatisticsRecord {
    pub fn counts(&self, category: Category) -> CategoryCounts {
        match category {
            Category::Easy => self.easy,
            Category::Medium => self.medium,
            Category::Hard => self.hard,
        }
    }

    /// Counts in [`Category::ALL`] order.
    pub fn categories(&self) -> [CategoryCounts; 3] {
        Category::ALL.map(|c| self.counts(c))
    }

    pub fn total_solved(&self) -> u32 {
        self.easy
            .solved
            .saturating_add(self.medium.solved)
            .saturating_add(self.hard.solved)
    }

    /// Attended contests, most recent first.
    pub fn recent_contests(&self, limit: usize) -> impl Iterator<Item = &RatingPoint> {
        self.history
            .iter()
            .rev()
            .filter(|p| p.attended)
            .take(limit)
    }
}

/// Second-judge rating card. Every field stays `None` until that source
/// answers, and after it fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondarySourceRecord {
    pub rating: Option<i64>,
    pub max_rating: Option<i64>,
    pub rank: Option<String>,
}

impl SecondarySourceRecord {
    pub fn is_populated(&self) -> bool {
        self.rating.is_some() || self.max_rating.is_some() || self.rank.is_some()
    }
}

impl From<CodeforcesUser> for SecondarySourceRecord {
    fn from(user: CodeforcesUser) -> Self {
        Self {
            rating: user.rating,
            max_rating: user.max_rating,
            rank: user.rank.filter(|r| !r.trim().is_empty()),
        }
    }
}
