use serde::Serialize;

/// Discrete rating bracket, lowest first. Picks the badge and text color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingTier {
    Base,
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

/// Label shown when the second judge reports no rank.
pub const DEFAULT_RANK_LABEL: &str = "Newbie";

/// Exclusive lower bounds, checked top-down.
const LADDER: [(f64, RatingTier); 4] = [
    (1900.0, RatingTier::Tier4),
    (1600.0, RatingTier::Tier3),
    (1400.0, RatingTier::Tier2),
    (1200.0, RatingTier::Tier1),
];

/// Total over every input: an absent rating, NaN and anything at or below
/// 1200 are [`RatingTier::Base`]. A rating exactly on a boundary belongs to
/// the tier below it.
pub fn classify(rating: Option<f64>) -> RatingTier {
    let Some(rating) = rating else {
        return RatingTier::Base;
    };
    LADDER
        .iter()
        .find(|(threshold, _)| rating > *threshold)
        .map_or(RatingTier::Base, |(_, tier)| *tier)
}

/// Codeforces reports integral ratings.
#[allow(clippy::cast_precision_loss)]
pub fn classify_int(rating: Option<i64>) -> RatingTier {
    classify(rating.map(|r| r as f64))
}

pub fn rank_label(rank: Option<&str>) -> &str {
    rank.filter(|r| !r.trim().is_empty())
        .unwrap_or(DEFAULT_RANK_LABEL)
}

impl RatingTier {
    pub const ALL: [RatingTier; 5] = [
        Self::Base,
        Self::Tier1,
        Self::Tier2,
        Self::Tier3,
        Self::Tier4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::Tier3 => "tier3",
            Self::Tier4 => "tier4",
        }
    }

    pub fn color_name(&self) -> &'static str {
        match self {
            Self::Base => "gray",
            Self::Tier1 => "green",
            Self::Tier2 => "cyan",
            Self::Tier3 => "blue",
            Self::Tier4 => "purple",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            Self::Base => "#9CA3AF",
            Self::Tier1 => "#4ADE80",
            Self::Tier2 => "#22D3EE",
            Self::Tier3 => "#60A5FA",
            Self::Tier4 => "#C084FC",
        }
    }

    /// Tailwind classes for the rank pill.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::Base => "bg-gray-500/20 text-gray-400",
            Self::Tier1 => "bg-green-500/20 text-green-400",
            Self::Tier2 => "bg-cyan-500/20 text-cyan-400",
            Self::Tier3 => "bg-blue-500/20 text-blue-400",
            Self::Tier4 => "bg-purple-500/20 text-purple-400",
        }
    }

    /// Tailwind class for a bare rating number.
    pub fn text_class(&self) -> &'static str {
        match self {
            Self::Base => "text-gray-400",
            Self::Tier1 => "text-green-400",
            Self::Tier2 => "text-cyan-400",
            Self::Tier3 => "text-blue-400",
            Self::Tier4 => "text-purple-400",
        }
    }
}
