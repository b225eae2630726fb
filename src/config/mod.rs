//! Configuration module for the pivot analysis.

pub mod params;

// Re-export commonly used items
pub use params::{
    DEFAULT_DIFF_TH, DEFAULT_HR_PIPS, DEFAULT_N_CANDLES, DEFAULT_TH_BOUNCES, PivotParams,
};
