use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures raised by the pivot analysis core.
///
/// All of these are immediate and fatal to the current analysis request:
/// inputs are deterministic in-memory series, so retrying never helps.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The candle series is too short to detect any pivot.
    #[error("insufficient data: {required} candles required, {provided} provided")]
    InsufficientData { required: usize, provided: usize },

    /// The bounce threshold must be a positive fraction (e.g. 0.01 = 1%).
    #[error("invalid bounce threshold {0}: must be > 0")]
    InvalidThreshold(f64),

    /// A merge was requested on a pivot with no adjacent segment in the
    /// given segment series.
    #[error("no segment adjacent to pivot at {pivot_time} in the segment series")]
    SegmentNotFound { pivot_time: DateTime<Utc> },

    /// The adjusted-time re-detection produced no trailing pivot.
    #[error("re-detection over candles up to {cutoff} yielded no trailing pivot")]
    PivotNotFound { cutoff: DateTime<Utc> },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
