//! Zigzag pivot detection.
//!
//! Walks a candle series accumulating a running extreme in the current
//! direction; a pivot is confirmed once price retraces from that extreme by
//! at least the bounce threshold (a fraction of the extreme). Confirmed
//! pivots close the segment behind them; the final candle is always emitted
//! as an open pivot so a setup still in progress stays visible.

use std::sync::Arc;

use itertools::Itertools;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::candle_series::CandleSeries;
use crate::models::pivot::{Pivot, PivotKind};
use crate::models::pivot_list::PivotList;
use crate::models::segment::{Segment, SegmentList};

/// Minimum series length for detection to be meaningful.
const MIN_CANDLES: usize = 2;

/// Detect pivots over `clist` with the given bounce threshold.
///
/// Deterministic: ties for the running extreme keep the earliest candle,
/// so repeated calls over the same input yield the identical list.
pub fn detect(clist: Arc<CandleSeries>, bounce_threshold: f64) -> AnalysisResult<PivotList> {
    if bounce_threshold <= 0.0 {
        return Err(AnalysisError::InvalidThreshold(bounce_threshold));
    }
    if clist.len() < MIN_CANDLES {
        return Err(AnalysisError::InsufficientData {
            required: MIN_CANDLES,
            provided: clist.len(),
        });
    }

    log::debug!(
        "detecting pivots over {} candles of {} ({}), threshold {}",
        clist.len(),
        clist.instrument,
        clist.granularity,
        bounce_threshold
    );

    let closes: Vec<f64> = clist.candles.iter().map(|c| c.mid_close()).collect();
    let marks = mark_turning_points(&closes, bounce_threshold);

    let slist = Arc::new(build_segments(&clist, &closes, &marks));
    let plist = attach_segments(&clist, &marks, &slist);

    log::debug!("detected {} pivots, {} segments", plist.len(), slist.len());

    Ok(PivotList::new(plist, clist, Arc::clone(&slist)))
}

/// Turning points as (candle index, kind), chronological.
fn mark_turning_points(closes: &[f64], threshold: f64) -> Vec<(usize, PivotKind)> {
    let up_ratio = 1.0 + threshold;
    let down_ratio = 1.0 - threshold;
    let last_idx = closes.len() - 1;

    let first_kind = initial_pivot_kind(closes, up_ratio, down_ratio);
    let mut marks: Vec<(usize, PivotKind)> = vec![(0, first_kind)];

    // Trend we are currently riding: away from the initial pivot.
    let mut rising = first_kind == PivotKind::Low;
    let mut extreme_idx = 0usize;
    let mut extreme = closes[0];

    for (i, &x) in closes.iter().enumerate().skip(1) {
        let r = x / extreme;
        if rising {
            if r <= down_ratio {
                // retraced enough: the running maximum becomes a high pivot
                if extreme_idx != 0 {
                    marks.push((extreme_idx, PivotKind::High));
                }
                rising = false;
                extreme_idx = i;
                extreme = x;
            } else if x > extreme {
                // strict: an equal extreme keeps the earlier candle
                extreme_idx = i;
                extreme = x;
            }
        } else if r >= up_ratio {
            if extreme_idx != 0 {
                marks.push((extreme_idx, PivotKind::Low));
            }
            rising = true;
            extreme_idx = i;
            extreme = x;
        } else if x < extreme {
            extreme_idx = i;
            extreme = x;
        }
    }

    // The tail: either the running extreme sits on the very last candle and
    // gets confirmed by construction, or the last candle is emitted as the
    // open (unconfirmed) pivot of the opposite kind.
    if extreme_idx == last_idx {
        let kind = if rising { PivotKind::High } else { PivotKind::Low };
        marks.push((last_idx, kind));
    } else {
        let kind = if rising { PivotKind::Low } else { PivotKind::High };
        marks.push((last_idx, kind));
    }

    marks
}

/// Kind of the pivot at index 0: decided by whichever direction price
/// first moves by the threshold. When the series never moves that far,
/// the first and last closes break the tie.
fn initial_pivot_kind(closes: &[f64], up_ratio: f64, down_ratio: f64) -> PivotKind {
    let x0 = closes[0];
    let (mut max_x, mut max_t) = (x0, 0usize);
    let (mut min_x, mut min_t) = (x0, 0usize);

    for (t, &x) in closes.iter().enumerate().skip(1) {
        if x / min_x >= up_ratio {
            return if min_t == 0 { PivotKind::Low } else { PivotKind::High };
        }
        if x / max_x <= down_ratio {
            return if max_t == 0 { PivotKind::High } else { PivotKind::Low };
        }
        if x > max_x {
            (max_x, max_t) = (x, t);
        }
        if x < min_x {
            (min_x, min_t) = (x, t);
        }
    }

    if x0 < closes[closes.len() - 1] { PivotKind::Low } else { PivotKind::High }
}

/// One segment per consecutive pair of turning points.
fn build_segments(
    clist: &CandleSeries,
    closes: &[f64],
    marks: &[(usize, PivotKind)],
) -> SegmentList {
    let segments = marks
        .iter()
        .tuple_windows()
        .map(|(&(from, _), &(to, _))| {
            Segment::new(
                clist.candles[from].time,
                clist.candles[to].time,
                closes[from],
                closes[to],
                to - from,
            )
        })
        .collect();
    SegmentList::new(&clist.instrument, segments)
}

/// Build the pivots, wiring each one to its adjacent segments. The pivot at
/// position i takes segment i-1 as `pre` and segment i as `aft`.
fn attach_segments(
    clist: &CandleSeries,
    marks: &[(usize, PivotKind)],
    slist: &SegmentList,
) -> Vec<Pivot> {
    marks
        .iter()
        .enumerate()
        .map(|(i, &(idx, kind))| {
            let pre = i.checked_sub(1).and_then(|j| slist.segments.get(j)).cloned();
            let aft = slist.segments.get(i).cloned();
            Pivot::new(clist.candles[idx].clone(), kind, pre, aft)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::{Candle, Quote};
    use chrono::{DateTime, TimeZone, Utc};

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, day, 22, 0, 0).unwrap()
    }

    fn series(prices: &[f64]) -> Arc<CandleSeries> {
        let candles = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let q = Quote { open: p, high: p, low: p, close: p };
                Candle { time: t(i as u32 + 1), bid: q, ask: q, mid: None, volume: 1.0, rsi: None }
            })
            .collect();
        Arc::new(CandleSeries::new("EUR_GBP", "D", candles))
    }

    // 10% threshold over a rally, a slump and a recovery with an
    // unconfirmed tail: pivots at indices 0, 2, 4 and the open one at 6.
    const PRICES: [f64; 7] = [100.0, 105.0, 110.0, 99.0, 98.0, 108.0, 107.0];

    #[test]
    fn test_detects_confirmed_and_open_pivots() {
        let pl = detect(series(&PRICES), 0.1).unwrap();
        assert_eq!(pl.times(), vec![t(1), t(3), t(5), t(7)]);

        let kinds: Vec<PivotKind> = pl.plist.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![PivotKind::Low, PivotKind::High, PivotKind::Low, PivotKind::Low]
        );
    }

    #[test]
    fn test_segment_wiring() {
        let pl = detect(series(&PRICES), 0.1).unwrap();
        assert_eq!(pl.slist.len(), 3);

        // earliest pivot: aft only; open pivot: pre only
        assert!(pl.plist[0].pre.is_none());
        assert!(pl.plist[0].aft.is_some());
        assert!(pl.plist[3].pre.is_some());
        assert!(pl.plist[3].aft.is_none());

        // pre.end == pivot time == aft.start for an interior pivot
        let p = &pl.plist[1];
        assert_eq!(p.pre.as_ref().unwrap().end_time, p.time());
        assert_eq!(p.aft.as_ref().unwrap().start_time, p.time());
        assert_eq!(p.pre.as_ref().unwrap().count, 2);
    }

    #[test]
    fn test_determinism() {
        let s = series(&PRICES);
        let a = detect(Arc::clone(&s), 0.1).unwrap();
        let b = detect(s, 0.1).unwrap();
        assert_eq!(a.times(), b.times());
        assert_eq!(a.slist.segments, b.slist.segments);
    }

    #[test]
    fn test_tie_keeps_earliest_extreme() {
        // two candles tie for the maximum; the earlier one is the pivot
        let pl = detect(series(&[100.0, 110.0, 110.0, 95.0, 94.0]), 0.1).unwrap();
        assert_eq!(pl.plist[1].time(), t(2));
        assert_eq!(pl.plist[1].kind, PivotKind::High);
    }

    #[test]
    fn test_monotonic_chronology() {
        let pl = detect(series(&PRICES), 0.1).unwrap();
        assert!(pl.times().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_extreme_on_last_candle_is_confirmed() {
        // rally straight into the final candle: it carries the trend's kind
        let pl = detect(series(&[100.0, 90.0, 101.0, 105.0]), 0.05).unwrap();
        let last = pl.last().unwrap();
        assert_eq!(last.time(), t(4));
        assert_eq!(last.kind, PivotKind::High);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(matches!(
            detect(series(&[100.0]), 0.1),
            Err(AnalysisError::InsufficientData { provided: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(matches!(
            detect(series(&PRICES), 0.0),
            Err(AnalysisError::InvalidThreshold(_))
        ));
        assert!(matches!(
            detect(series(&PRICES), -0.5),
            Err(AnalysisError::InvalidThreshold(_))
        ));
    }
}
