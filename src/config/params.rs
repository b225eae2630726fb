//! Tunable pivot-analysis parameters.

use serde::{Deserialize, Serialize};

/// Bounce threshold confirming a reversal (fraction of the running extreme)
pub const DEFAULT_TH_BOUNCES: f64 = 0.01;
/// Half-width of the SR area band, in pips
pub const DEFAULT_HR_PIPS: u32 = 30;
/// Segments spanning fewer candles than this are merge candidates
pub const DEFAULT_N_CANDLES: usize = 10;
/// Segments moving fewer pips than this are merge candidates
pub const DEFAULT_DIFF_TH: u32 = 30;

/// The knobs every detection/filter/merge call takes explicitly.
///
/// One value object instead of ambient configuration keeps each operation a
/// pure function of its arguments. A JSON params file can override any
/// subset of the fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotParams {
    /// Minimum relative retracement confirming a new pivot.
    pub th_bounces: f64,
    /// Half-width of the SR band in pips.
    pub hr_pips: u32,
    /// Always retain (and re-resolve) the chronologically last pivot.
    pub last_pivot: bool,
    /// Candle-count bound for the segment-merge criterion.
    pub n_candles: usize,
    /// Pip-movement bound for the segment-merge criterion.
    pub diff_th: u32,
    /// Apply the merge policy to retained pivots' `pre` segments.
    pub runmerge_pre: bool,
    /// Apply the merge policy to retained pivots' `aft` segments.
    pub runmerge_aft: bool,
}

impl Default for PivotParams {
    fn default() -> Self {
        PivotParams {
            th_bounces: DEFAULT_TH_BOUNCES,
            hr_pips: DEFAULT_HR_PIPS,
            last_pivot: true,
            n_candles: DEFAULT_N_CANDLES,
            diff_th: DEFAULT_DIFF_TH,
            runmerge_pre: true,
            runmerge_aft: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_from_json() {
        let p: PivotParams = serde_json::from_str(r#"{"th_bounces": 0.05, "last_pivot": false}"#)
            .unwrap();
        assert_eq!(p.th_bounces, 0.05);
        assert!(!p.last_pivot);
        // untouched fields keep their defaults
        assert_eq!(p.hr_pips, DEFAULT_HR_PIPS);
        assert!(p.runmerge_pre);
    }
}
