//! The detect → area-filter → score pipeline a trade setup runs through.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::analysis::area_filter::AreaFilter;
use crate::analysis::zigzag;
use crate::config::PivotParams;
use crate::domain::price_area::PriceArea;
use crate::error::AnalysisResult;
use crate::models::pivot_list::PivotList;
use crate::models::trade::TradeSetup;

/// Detect pivots over the trade's series, keep the ones relevant to its SR
/// level and score every survivor.
pub fn get_pivots(trade: &TradeSetup, params: &PivotParams) -> AnalysisResult<PivotList> {
    log::debug!("running get_pivots for {}", trade.id);

    let pivotlist = zigzag::detect(Arc::clone(&trade.series), params.th_bounces)?;

    let filter = AreaFilter::new(&trade.pair, trade.sr, params);
    let mut in_area = filter.filter(&pivotlist)?;

    for pivot in &mut in_area.plist {
        pivot.calc_score();
    }

    log::debug!(
        "get_pivots for {}: {} pivots in area, total score {}",
        trade.id,
        in_area.len(),
        in_area.total_score()
    );

    Ok(in_area)
}

/// New list with only the pivots at or after `lasttime`.
pub fn get_pivots_lasttime(pl: &PivotList, lasttime: DateTime<Utc>) -> PivotList {
    pl.after(lasttime)
}

/// Last time price visited the far side of the trade's SR area.
pub fn get_lasttime(trade: &TradeSetup, params: &PivotParams) -> Option<DateTime<Utc>> {
    let area = PriceArea::new(&trade.pair, trade.sr, params.hr_pips);
    trade.series.last_time_in_area(&area)
}
