//! Display models for CLI output
//!
//! Flat, table-friendly views of pipeline and cache types.

pub mod display;

pub use display::{CacheDisplay, DayDisplay, SummaryRow};
