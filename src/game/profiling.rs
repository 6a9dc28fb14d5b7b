//! Performance profiling utilities
//!
//! The timing guard is only compiled when the `perf_stats` feature is enabled.

pub use fiefdom_macros::profile;
