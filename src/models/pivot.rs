use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::segment::{Segment, SegmentList};

/// Kind of turning point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotKind {
    High,
    Low,
}

/// A turning-point candle plus its adjacent runs.
///
/// `pre` ends at the pivot candle, `aft` starts there. The most recent
/// (open) pivot carries only `pre`; the earliest pivot only `aft`.
/// `score` stays unset until `calc_score` assigns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub candle: Candle,
    pub kind: PivotKind,
    pub pre: Option<Segment>,
    pub aft: Option<Segment>,
    pub score: Option<f64>,
}

impl Pivot {
    pub fn new(candle: Candle, kind: PivotKind, pre: Option<Segment>, aft: Option<Segment>) -> Self {
        debug_assert!(
            pre.as_ref().is_none_or(|s| s.end() == candle.time),
            "pre segment must end at the pivot candle"
        );
        debug_assert!(
            aft.as_ref().is_none_or(|s| s.start() == candle.time),
            "aft segment must start at the pivot candle"
        );
        Pivot { candle, kind, pre, aft, score: None }
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.candle.time
    }

    /// Significance score: the total number of candle intervals covered by
    /// the two adjacent runs. Longer approach and departure means a more
    /// significant turning point.
    pub fn calc_score(&mut self) -> f64 {
        let pre = self.pre.as_ref().map_or(0, |s| s.count);
        let aft = self.aft.as_ref().map_or(0, |s| s.count);
        let score = (pre + aft) as f64;
        self.score = Some(score);
        score
    }

    /// Absorb short, noisy runs into `pre`.
    ///
    /// While `pre` spans fewer than `n_candles` intervals and moves fewer
    /// than `diff_th` pips, its start boundary is replaced by the boundary
    /// of the segment immediately beyond it in `slist`. A `pre` that never
    /// meets the criteria makes this a no-op, so repeated calls are
    /// idempotent.
    pub fn merge_pre(
        &mut self,
        slist: &SegmentList,
        n_candles: usize,
        diff_th: u32,
    ) -> AnalysisResult<()> {
        let pivot_time = self.candle.time;
        let pre = self
            .pre
            .as_mut()
            .filter(|_| slist.ending_at(pivot_time).is_some())
            .ok_or(AnalysisError::SegmentNotFound { pivot_time })?;

        loop {
            if pre.count >= n_candles || pre.diff_pips(&slist.instrument) >= diff_th as f64 {
                break;
            }
            match slist.ending_at(pre.start()) {
                Some(earlier) => pre.absorb_earlier(earlier),
                None => break, // already at the start of the series
            }
        }
        Ok(())
    }

    /// Mirror image of [`merge_pre`](Self::merge_pre) for the `aft` run.
    pub fn merge_aft(
        &mut self,
        slist: &SegmentList,
        n_candles: usize,
        diff_th: u32,
    ) -> AnalysisResult<()> {
        let pivot_time = self.candle.time;
        let aft = self
            .aft
            .as_mut()
            .filter(|_| slist.starting_at(pivot_time).is_some())
            .ok_or(AnalysisError::SegmentNotFound { pivot_time })?;

        loop {
            if aft.count >= n_candles || aft.diff_pips(&slist.instrument) >= diff_th as f64 {
                break;
            }
            match slist.starting_at(aft.end()) {
                Some(later) => aft.absorb_later(later),
                None => break,
            }
        }
        Ok(())
    }

    /// Where the approach to this pivot actually starts.
    ///
    /// Starting from the `pre` boundary, keeps walking to earlier adjacent
    /// segments in `slist` for as long as their pip movement stays below
    /// `diff_th`. Sub-threshold runs are noise, not part of a real trend
    /// change. A pivot with no `pre` resolves to its own candle time.
    pub fn adjusted_pivot_time(&self, slist: &SegmentList, diff_th: u32) -> DateTime<Utc> {
        let Some(pre) = &self.pre else {
            return self.candle.time;
        };
        let mut adjusted = pre.start();
        while let Some(seg) = slist.ending_at(adjusted) {
            if seg.diff_pips(&slist.instrument) >= diff_th as f64 {
                break;
            }
            adjusted = seg.start();
        }
        adjusted
    }
}
