//! Water meter readings and consumption.
//!
//! Pure domain logic: consumption math, the high-consumption threshold,
//! previous-reading inference and per-unit summaries. No IO.

pub mod reading;
pub mod summary;

pub use reading::{
    NewReading, ReadingFilter, ReadingId, ReadingPatch, WaterReading, exceeds_limit, latest_for_unit,
    sort_newest_first,
};
pub use summary::{UnitSummary, summarize};
