//! Selection of the pivots relevant to a trading setup.
//!
//! The filter keeps pivots whose candle prices fall inside the SR band and,
//! when configured, always retains the chronologically last pivot — the one
//! carrying the setup in progress — after re-resolving it over a truncated
//! candle window so the result does not depend on how much future data the
//! series happens to contain.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::analysis::zigzag;
use crate::config::PivotParams;
use crate::domain::price_area::PriceArea;
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::pivot::{Pivot, PivotKind};
use crate::models::pivot_list::PivotList;
use crate::models::segment::SegmentList;

pub struct AreaFilter {
    area: PriceArea,
    params: PivotParams,
}

impl AreaFilter {
    /// Band centred on `sr_price`, `params.hr_pips` wide to either side.
    pub fn new(pair: &str, sr_price: f64, params: &PivotParams) -> Self {
        AreaFilter {
            area: PriceArea::new(pair, sr_price, params.hr_pips),
            params: params.clone(),
        }
    }

    /// Select the pivots of `pl` relevant to the SR band.
    ///
    /// Output shares `clist`/`slist` with the input and preserves
    /// chronological order; no two retained pivots share a candle time.
    /// Filtering an already filtered list leaves it unchanged.
    pub fn filter(&self, pl: &PivotList) -> AnalysisResult<PivotList> {
        log::debug!(
            "area filter on {} pivots, band [{:.5}, {:.5}]",
            pl.len(),
            self.area.lower,
            self.area.upper
        );

        let last_idx = pl.len().saturating_sub(1);
        let mut retained: Vec<Pivot> = Vec::new();
        let mut seen: HashSet<DateTime<Utc>> = HashSet::new();

        for (i, pivot) in pl.plist.iter().enumerate() {
            if self.params.last_pivot && i == last_idx {
                continue; // resolved separately below
            }

            // refresh derived price fields before comparing: the detector
            // is not required to populate them
            let mut candle = pivot.candle.clone();
            candle.ensure_features();

            if self.in_area(&candle.mid(), pivot.kind) && seen.insert(candle.time) {
                let mut kept = pivot.clone();
                kept.candle = candle;
                self.apply_merges(&mut kept, &pl.slist)?;
                retained.push(kept);
            }
        }

        if self.params.last_pivot
            && let Some(naive_last) = pl.last()
        {
            // Only a pivot sitting on the final candle is the open tail of
            // a fresh detection; that one gets re-resolved. A last pivot on
            // an earlier candle was already resolved and merged by a prior
            // filtering pass, and re-resolving it against a segment series
            // it was not derived from would drift it off the band.
            if Some(naive_last.time()) == pl.clist.last_time() {
                let (mut resolved, re_slist) = self.resolve_last_pivot(pl, naive_last)?;
                if seen.insert(resolved.time()) {
                    self.apply_merges(&mut resolved, &re_slist)?;
                    retained.push(resolved);
                }
            } else if seen.insert(naive_last.time()) {
                let mut kept = naive_last.clone();
                kept.candle.ensure_features();
                retained.push(kept);
            }
        }

        retained.sort_by_key(|p| p.time());

        log::debug!("area filter retained {} pivots", retained.len());

        Ok(PivotList::new(
            retained,
            Arc::clone(&pl.clist),
            Arc::clone(&pl.slist),
        ))
    }

    /// Band membership: always the close, plus the high for a high pivot
    /// or the low for a low pivot.
    fn in_area(&self, mid: &crate::domain::candle::Quote, kind: PivotKind) -> bool {
        let extra = match kind {
            PivotKind::High => mid.high,
            PivotKind::Low => mid.low,
        };
        self.area.contains(mid.close) || self.area.contains(extra)
    }

    /// Re-resolve the naive last pivot of a full-series detection.
    ///
    /// The naive pivot can be off by one reversal when the series tail has
    /// not confirmed yet. Re-detecting over the candles up to the adjusted
    /// pivot time (where its approach actually starts) pins it to a stable,
    /// reproducible turning point. Returns the pivot together with the
    /// segment series of the re-detection, which is what its `pre`/`aft`
    /// belong to.
    fn resolve_last_pivot(
        &self,
        pl: &PivotList,
        naive_last: &Pivot,
    ) -> AnalysisResult<(Pivot, Arc<SegmentList>)> {
        let cutoff = naive_last.adjusted_pivot_time(&pl.slist, self.params.diff_th);
        let start = pl.clist.first_time().unwrap_or(cutoff);

        let window = Arc::new(pl.clist.slice(start, cutoff));
        if window.len() < 2 {
            return Err(AnalysisError::PivotNotFound { cutoff });
        }

        let re_detected = zigzag::detect(window, self.params.th_bounces)?;
        let resolved = re_detected
            .last()
            .cloned()
            .ok_or(AnalysisError::PivotNotFound { cutoff })?;

        log::debug!(
            "last pivot re-resolved from {} to {} (cutoff {})",
            naive_last.time(),
            resolved.time(),
            cutoff
        );

        Ok((resolved, Arc::clone(&re_detected.slist)))
    }

    fn apply_merges(&self, pivot: &mut Pivot, slist: &SegmentList) -> AnalysisResult<()> {
        if self.params.runmerge_pre && pivot.pre.is_some() {
            pivot.merge_pre(slist, self.params.n_candles, self.params.diff_th)?;
        }
        if self.params.runmerge_aft && pivot.aft.is_some() {
            pivot.merge_aft(slist, self.params.n_candles, self.params.diff_th)?;
        }
        Ok(())
    }
}
