//! Profile statistics pipeline: fetch the two judges, normalize the primary
//! payload against fixed fallbacks, and project the result into ring geometry
//! and rating tiers for rendering.

pub mod fetcher;
pub mod normalizer;
pub mod page;
pub mod proxy;
pub mod record;
pub mod segments;
pub mod tier;
