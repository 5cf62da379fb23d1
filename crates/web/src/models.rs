//! View models for the profile templates.
//! Every display string and CSS class is computed here; templates only print.

use stats::record::{Category, RatingPoint, SecondarySourceRecord, StatisticsRecord};
use stats::segments::RingEncoding;
use stats::tier::{classify, classify_int, rank_label};

const RECENT_CONTESTS: usize = 5;
const MISSING: &str = "N/A";
const CHART_WIDTH: f64 = 320.0;
const CHART_HEIGHT: f64 = 80.0;
const CHART_PAD: f64 = 4.0;

pub struct StrokeView {
    pub color: &'static str,
    pub dash_array: String,
    pub dash_offset: String,
}

pub struct RingView {
    pub size: String,
    pub center: String,
    pub radius: String,
    pub stroke_width: String,
    pub strokes: Vec<StrokeView>,
}

/// One legend row beside the ring.
pub struct CategoryRow {
    pub label: &'static str,
    pub solved: u32,
    pub total: u32,
    pub percent_display: String,
    /// Width of the small progress bar, as a CSS percentage.
    pub width_pct: String,
    pub color: &'static str,
}

pub struct ContestSummary {
    pub rating_display: String,
    pub rating_class: &'static str,
    pub attended: u32,
    pub global_ranking_display: String,
    pub top_percentage_display: String,
}

pub struct ContestRow {
    pub title: String,
    pub date: String,
    pub rating_display: String,
    pub ranking_display: String,
}

/// Rating-over-time line. Attended contests in start-time order, spaced
/// evenly along x, with y scaled between the lowest and highest rating.
#[derive(Debug)]
pub struct RatingChart {
    pub width: String,
    pub height: String,
    /// `x,y` pairs for `<polyline points=...>`.
    pub points: String,
    /// Same line closed along the bottom edge, for the shaded fill.
    pub area: String,
    pub first_date: String,
    pub last_date: String,
    pub low_display: String,
    pub high_display: String,
}

pub struct BadgeView {
    pub name: String,
    pub icon: String,
}

/// Second-judge card. Shows placeholders until (and unless) the source answers.
pub struct SecondaryView {
    pub handle: String,
    pub populated: bool,
    pub rating_display: String,
    pub rating_class: &'static str,
    pub max_rating_display: String,
    pub max_rating_class: &'static str,
    pub rank_label: String,
    pub badge_class: &'static str,
}

pub struct ProfileView {
    pub handle: String,
    pub total_solved: String,
    pub ranking_display: String,
    pub ring: RingView,
    pub categories: Vec<CategoryRow>,
    pub contest: Option<ContestSummary>,
    pub recent_contests: Vec<ContestRow>,
    pub rating_chart: Option<RatingChart>,
    pub badges: Vec<BadgeView>,
}

/// `1234567` -> `"1,234,567"`.
pub fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn fmt_len(v: f64) -> String {
    format!("{v:.3}")
}

impl From<&RingEncoding> for RingView {
    fn from(ring: &RingEncoding) -> Self {
        let size = ring.layout.size();
        Self {
            size: fmt_len(size),
            center: fmt_len(size / 2.0),
            radius: fmt_len(ring.normalized_radius),
            stroke_width: fmt_len(ring.layout.stroke_width),
            strokes: ring
                .strokes()
                .iter()
                .map(|s| StrokeView {
                    color: s.color,
                    dash_array: format!("{} {}", fmt_len(s.dash_length), fmt_len(s.dash_gap)),
                    dash_offset: fmt_len(s.dash_offset),
                })
                .collect(),
        }
    }
}

impl RatingChart {
    /// `None` below two attended contests; one point draws no line.
    pub fn build(history: &[RatingPoint]) -> Option<Self> {
        let attended: Vec<&RatingPoint> = history.iter().filter(|p| p.attended).collect();
        let (first, last) = match attended.as_slice() {
            [first, .., last] => (*first, *last),
            _ => return None,
        };

        let low = attended.iter().map(|p| p.rating).fold(f64::INFINITY, f64::min);
        let high = attended.iter().map(|p| p.rating).fold(f64::NEG_INFINITY, f64::max);
        let span = high - low;
        let inner_height = CHART_HEIGHT - 2.0 * CHART_PAD;
        let step = (CHART_WIDTH - 2.0 * CHART_PAD) / (attended.len() - 1) as f64;

        let coords: Vec<String> = attended
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let x = CHART_PAD + step * i as f64;
                let y = if span > f64::EPSILON {
                    CHART_PAD + (high - p.rating) / span * inner_height
                } else {
                    CHART_HEIGHT / 2.0
                };
                format!("{x:.1},{y:.1}")
            })
            .collect();
        let points = coords.join(" ");
        let baseline = CHART_HEIGHT - CHART_PAD;
        let area = format!(
            "{CHART_PAD:.1},{baseline:.1} {points} {:.1},{baseline:.1}",
            CHART_WIDTH - CHART_PAD
        );

        Some(Self {
            width: format!("{CHART_WIDTH:.0}"),
            height: format!("{CHART_HEIGHT:.0}"),
            points,
            area,
            first_date: first.start_time.format("%Y-%m-%d").to_string(),
            last_date: last.start_time.format("%Y-%m-%d").to_string(),
            low_display: format!("{low:.0}"),
            high_display: format!("{high:.0}"),
        })
    }
}

impl SecondaryView {
    pub fn new(handle: &str, record: &SecondarySourceRecord) -> Self {
        let tier = classify_int(record.rating);
        let max_tier = classify_int(record.max_rating);
        let display = |r: Option<i64>| r.map_or_else(|| MISSING.to_string(), |r| r.to_string());
        Self {
            handle: handle.to_string(),
            populated: record.is_populated(),
            rating_display: display(record.rating),
            rating_class: tier.text_class(),
            max_rating_display: display(record.max_rating),
            max_rating_class: max_tier.text_class(),
            rank_label: rank_label(record.rank.as_deref()).to_string(),
            badge_class: tier.badge_class(),
        }
    }
}

impl ProfileView {
    pub fn build(handle: &str, record: &StatisticsRecord, ring: &RingEncoding) -> Self {
        let categories = Category::ALL
            .iter()
            .map(|&category| {
                let counts = record.counts(category);
                let pct = ring.segment(category).percentage;
                CategoryRow {
                    label: category.label(),
                    solved: counts.solved,
                    total: counts.total,
                    percent_display: format!("{pct:.1}%"),
                    width_pct: format!("{:.2}", pct.clamp(0.0, 100.0)),
                    color: category.color(),
                }
            })
            .collect();

        let contest = record.rating.map(|rating| ContestSummary {
            rating_display: format!("{rating:.0}"),
            rating_class: classify(Some(rating)).text_class(),
            attended: record.attended_contests,
            global_ranking_display: record
                .contest_ranking
                .map_or_else(|| MISSING.to_string(), |r| format!("#{}", with_thousands(r))),
            top_percentage_display: record
                .top_percentage
                .map_or_else(|| MISSING.to_string(), |p| format!("Top {p:.2}%")),
        });

        let recent_contests = record
            .recent_contests(RECENT_CONTESTS)
            .map(|p| ContestRow {
                title: p.contest.clone(),
                date: p.start_time.format("%Y-%m-%d").to_string(),
                rating_display: format!("{:.0}", p.rating),
                ranking_display: p
                    .ranking
                    .map_or_else(|| MISSING.to_string(), |r| format!("#{}", with_thousands(r))),
            })
            .collect();

        Self {
            handle: handle.to_string(),
            total_solved: with_thousands(u64::from(record.total_solved())),
            ranking_display: format!("#{}", with_thousands(record.ranking)),
            ring: RingView::from(ring),
            categories,
            contest,
            recent_contests,
            rating_chart: RatingChart::build(&record.history),
            badges: record
                .badges
                .iter()
                .map(|b| BadgeView {
                    name: b.name.clone(),
                    icon: b.icon.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats::normalizer::normalize;
    use stats::segments::RingLayout;

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(167_220), "167,220");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_fallback_profile_view() {
        let record = normalize(None);
        let ring = RingEncoding::for_record(RingLayout::default(), &record);
        let view = ProfileView::build("yash", &record, &ring);

        assert_eq!(view.total_solved, "684");
        assert_eq!(view.ranking_display, "#167,220");
        assert_eq!(view.categories.len(), 3);
        assert_eq!(view.categories[0].label, "Easy");
        assert_eq!(view.categories[0].percent_display, "36.2%");
        assert_eq!(view.categories[0].width_pct, "36.20");
        assert!(view.contest.is_none());
        assert!(view.recent_contests.is_empty());
        assert!(view.rating_chart.is_none());

        assert_eq!(view.ring.size, "110.000");
        assert_eq!(view.ring.radius, "43.000");
        assert_eq!(view.ring.strokes.len(), 4);
        assert_eq!(view.ring.strokes[0].color, "#262626");
        assert_eq!(view.ring.strokes[1].dash_offset, "0.000");
    }

    #[test]
    fn test_secondary_view_placeholders_and_tiers() {
        let empty = SecondaryView::new("cf", &SecondarySourceRecord::default());
        assert!(!empty.populated);
        assert_eq!(empty.rating_display, "N/A");
        assert_eq!(empty.rank_label, "Newbie");
        assert_eq!(empty.badge_class, "bg-gray-500/20 text-gray-400");

        let record = SecondarySourceRecord {
            rating: Some(1900),
            max_rating: Some(1950),
            rank: Some("expert".to_string()),
        };
        let view = SecondaryView::new("cf", &record);
        assert!(view.populated);
        assert_eq!(view.rating_display, "1900");
        assert_eq!(view.rating_class, "text-blue-400");
        assert_eq!(view.max_rating_class, "text-purple-400");
        assert_eq!(view.rank_label, "expert");
    }

    fn point(contest: &str, start: i64, rating: f64, attended: bool) -> RatingPoint {
        RatingPoint {
            contest: contest.to_string(),
            start_time: chrono::DateTime::from_timestamp(start, 0).unwrap(),
            rating,
            attended,
            ranking: None,
        }
    }

    #[test]
    fn test_rating_chart_scales_between_low_and_high() {
        let history = vec![
            point("Weekly Contest 1", 1_700_000_000, 1500.0, true),
            point("Weekly Contest 2", 1_700_600_000, 1500.0, false),
            point("Weekly Contest 3", 1_701_200_000, 1700.0, true),
            point("Weekly Contest 4", 1_701_800_000, 1600.0, true),
        ];
        let chart = RatingChart::build(&history).unwrap();

        // skipped contest dropped; highest rating at the top, lowest at the bottom
        assert_eq!(chart.points, "4.0,76.0 160.0,4.0 316.0,40.0");
        assert_eq!(chart.area, "4.0,76.0 4.0,76.0 160.0,4.0 316.0,40.0 316.0,76.0");
        assert_eq!(chart.width, "320");
        assert_eq!(chart.height, "80");
        assert_eq!(chart.low_display, "1500");
        assert_eq!(chart.high_display, "1700");
        assert_eq!(chart.first_date, "2023-11-14");
        assert_eq!(chart.last_date, "2023-12-05");
    }

    #[test]
    fn test_rating_chart_needs_two_attended_contests() {
        assert!(RatingChart::build(&[]).is_none());
        let one = vec![
            point("Weekly Contest 1", 1_700_000_000, 1500.0, true),
            point("Weekly Contest 2", 1_700_600_000, 1550.0, false),
        ];
        assert!(RatingChart::build(&one).is_none());

        let flat = vec![
            point("Weekly Contest 1", 1_700_000_000, 1500.0, true),
            point("Weekly Contest 2", 1_700_600_000, 1500.0, true),
        ];
        assert_eq!(RatingChart::build(&flat).unwrap().points, "4.0,40.0 316.0,40.0");
    }
}
