//! Error types for bounded containers.

/// A container was sized too small for its call site.
///
/// Capacities are chosen by code, never by user input, so this error marks a
/// sizing defect rather than a condition to recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    /// No free slot was found within the probe limit.
    #[error("fixed-size map overflow: no free slot within {max_probe} probes (capacity {capacity})")]
    ProbeLimitExceeded { capacity: usize, max_probe: usize },
}
