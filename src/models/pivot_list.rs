use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::candle_series::CandleSeries;
use crate::models::pivot::Pivot;
use crate::models::segment::SegmentList;

/// An ordered collection of pivots plus the series they were derived from.
///
/// `clist` and `slist` are shared immutably between every list a detection
/// spawns; filtering builds a new `plist` and clones the `Arc`s, never the
/// underlying data.
#[derive(Debug, Clone)]
pub struct PivotList {
    pub plist: Vec<Pivot>,
    pub clist: Arc<CandleSeries>,
    pub slist: Arc<SegmentList>,
}

impl PivotList {
    pub fn new(plist: Vec<Pivot>, clist: Arc<CandleSeries>, slist: Arc<SegmentList>) -> Self {
        debug_assert!(
            plist.windows(2).all(|w| w[0].time() < w[1].time()),
            "pivot times must be strictly increasing"
        );
        PivotList { plist, clist, slist }
    }

    pub fn len(&self) -> usize {
        self.plist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plist.is_empty()
    }

    pub fn last(&self) -> Option<&Pivot> {
        self.plist.last()
    }

    /// Pivot candle times in order; handy for reporting and assertions.
    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.plist.iter().map(|p| p.time()).collect()
    }

    /// New list keeping only pivots with `candle.time >= cutoff`, in the
    /// original order. The input is left untouched.
    pub fn after(&self, cutoff: DateTime<Utc>) -> PivotList {
        let plist = self
            .plist
            .iter()
            .filter(|p| p.time() >= cutoff)
            .cloned()
            .collect();
        PivotList {
            plist,
            clist: Arc::clone(&self.clist),
            slist: Arc::clone(&self.slist),
        }
    }

    /// Sum of all pivot scores, rounded to one decimal place. Pivots that
    /// have not been scored contribute nothing.
    pub fn total_score(&self) -> f64 {
        let sum: f64 = self.plist.iter().filter_map(|p| p.score).sum();
        (sum * 10.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::{Candle, Quote};
    use crate::models::pivot::PivotKind;
    use chrono::TimeZone;

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 7, day, 21, 0, 0).unwrap()
    }

    fn pivot(day: u32, score: Option<f64>) -> Pivot {
        let q = Quote { open: 1.0, high: 1.0, low: 1.0, close: 1.0 };
        let candle = Candle { time: t(day), bid: q, ask: q, mid: None, volume: 0.0, rsi: None };
        let mut p = Pivot::new(candle, PivotKind::Low, None, None);
        p.score = score;
        p
    }

    fn list(days: &[u32]) -> PivotList {
        let clist = Arc::new(CandleSeries::new("EUR_GBP", "D", vec![]));
        let slist = Arc::new(SegmentList::new("EUR_GBP", vec![]));
        let plist = days.iter().map(|&d| pivot(d, Some(2.0))).collect();
        PivotList::new(plist, clist, slist)
    }

    #[test]
    fn test_after_is_inclusive_and_order_preserving() {
        let pl = list(&[1, 5, 9, 14]);
        let filtered = pl.after(t(5));
        assert_eq!(filtered.times(), vec![t(5), t(9), t(14)]);
        // input untouched
        assert_eq!(pl.len(), 4);
    }

    #[test]
    fn test_after_everything_and_nothing() {
        let pl = list(&[1, 5, 9]);
        assert_eq!(pl.after(t(1)).len(), 3);
        assert!(pl.after(t(10)).is_empty());
    }

    #[test]
    fn test_total_score_rounds_to_one_decimal() {
        let clist = Arc::new(CandleSeries::new("EUR_GBP", "D", vec![]));
        let slist = Arc::new(SegmentList::new("EUR_GBP", vec![]));
        let plist = vec![pivot(1, Some(1.03)), pivot(2, Some(2.04)), pivot(3, None)];
        let pl = PivotList::new(plist, clist, slist);
        assert_eq!(pl.total_score(), 3.1);
    }
}
