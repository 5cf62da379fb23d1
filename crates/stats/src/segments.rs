//! Geometry for the three-category progress ring.
//!
//! Each category owns a fixed slice of the circle (easy 40%, medium 40%,
//! hard 20%) and fills it in proportion to its solved percentage. Segments are
//! drawn as SVG dashes: a visible dash of `arc_length` followed by a gap of
//! the full circumference, shifted by `dash_offset` so each one starts where
//! the previous visible arc ended.

use common::config::Ring;
use serde::Serialize;
use std::f64::consts::PI;

use crate::record::{Category, CategoryCounts, StatisticsRecord};

pub const TRACK_COLOR: &str = "#262626";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingLayout {
    pub radius: f64,
    pub stroke_width: f64,
}

impl Default for RingLayout {
    fn default() -> Self {
        Self {
            radius: 55.0,
            stroke_width: 6.0,
        }
    }
}

impl From<Ring> for RingLayout {
    fn from(ring: Ring) -> Self {
        Self {
            radius: ring.radius,
            stroke_width: ring.stroke_width,
        }
    }
}

impl RingLayout {
    pub fn normalized_radius(&self) -> f64 {
        self.radius - 2.0 * self.stroke_width
    }

    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.normalized_radius()
    }

    /// Width and height of the square SVG viewport.
    pub fn size(&self) -> f64 {
        self.radius * 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcSegment {
    pub category: Category,
    pub percentage: f64,
    pub arc_length: f64,
    /// `arc_length / circumference`, in `[0, 1]`.
    pub length_fraction: f64,
    /// Start of the segment as a negative fraction of the circumference.
    pub offset_fraction: f64,
    /// SVG `stroke-dashoffset`.
    pub dash_offset: f64,
}

/// One stroke to draw, in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    /// `None` for the background track.
    pub role: Option<Category>,
    pub color: &'static str,
    pub dash_length: f64,
    pub dash_gap: f64,
    pub dash_offset: f64,
}

impl Stroke {
    pub fn dash_array(&self) -> String {
        format!("{} {}", self.dash_length, self.dash_gap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingEncoding {
    pub layout: RingLayout,
    pub normalized_radius: f64,
    pub circumference: f64,
    pub segments: [ArcSegment; 3],
}

/// Encode the three `(solved, total)` pairs, given in [`Category::ALL`]
/// order. Expects normalized counts: a zero total yields NaN geometry.
pub fn encode(layout: RingLayout, counts: [CategoryCounts; 3]) -> RingEncoding {
    let circumference = layout.circumference();
    let mut start = 0.0;
    let segments = Category::ALL.map(|category| {
        let idx = category as usize;
        let percentage = counts[idx].percentage();
        let arc_length = (percentage / 100.0) * circumference * category.ring_weight();
        let segment = ArcSegment {
            category,
            percentage,
            arc_length,
            length_fraction: arc_length / circumference,
            offset_fraction: (0.0 - start) / circumference,
            dash_offset: 0.0 - start,
        };
        start += arc_length;
        segment
    });

    RingEncoding {
        layout,
        normalized_radius: layout.normalized_radius(),
        circumference,
        segments,
    }
}

impl RingEncoding {
    pub fn for_record(layout: RingLayout, record: &StatisticsRecord) -> Self {
        encode(layout, record.categories())
    }

    pub fn segment(&self, category: Category) -> &ArcSegment {
        &self.segments[category as usize]
    }

    pub fn filled_length(&self) -> f64 {
        self.segments.iter().map(|s| s.arc_length).sum()
    }

    /// Background track first, then easy, medium, hard.
    pub fn strokes(&self) -> Vec<Stroke> {
        let track = Stroke {
            role: None,
            color: TRACK_COLOR,
            dash_length: self.circumference,
            dash_gap: 0.0,
            dash_offset: 0.0,
        };
        std::iter::once(track)
            .chain(self.segments.iter().map(|s| Stroke {
                role: Some(s.category),
                color: s.category.color(),
                dash_length: s.arc_length,
                dash_gap: self.circumference,
                dash_offset: s.dash_offset,
            }))
            .collect()
    }
}
