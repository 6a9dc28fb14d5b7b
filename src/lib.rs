pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log progress of a long-running generation loop every 10th iteration when
/// the perf_stats feature is enabled.
///
/// Used by the merge rounds of connectivity repair and by the clustering
/// refinement loop. Without the perf_stats feature the macro expands to an
/// empty block and its arguments are never evaluated.
///
/// # Example
/// ```
/// # use fiefdom::profile_log;
/// let round = 20usize;
/// profile_log!(round, "merge round {} finished", round);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($iteration:expr, $($arg:tt)*) => {
        if $iteration % 10 == 0 {
            bevy::prelude::debug!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($iteration:expr, $($arg:tt)*) => {};
}
