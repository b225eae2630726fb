use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::domain::instrument::pips_between;
use crate::models::candle_series::CandleSeries;

/// RSI levels beyond which an entry counts as "on RSI".
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Long,
    Short,
}

/// Market session a trade entry falls into. An entry can belong to more
/// than one session where their hours overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TradeSession {
    Asian,
    European,
    Namerican,
}

impl TradeSession {
    /// Whether `t` (UTC time of day) falls inside this session's hours.
    /// The Asian session wraps midnight, hence its two windows.
    pub fn contains(&self, t: NaiveTime) -> bool {
        let hms = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();
        let within = |lo: NaiveTime, hi: NaiveTime| t >= lo && t <= hi;
        match self {
            TradeSession::Asian => {
                within(hms(23, 0, 0), hms(23, 59, 59)) || within(hms(0, 0, 0), hms(7, 0, 0))
            }
            TradeSession::European => within(hms(7, 0, 0), hms(15, 0, 0)),
            TradeSession::Namerican => within(hms(12, 0, 0), hms(19, 0, 0)),
        }
    }
}

/// The read-only view of a trade the pivot analysis consumes: the setup
/// prices plus the candle series loaded up to the trade start. Outcome
/// simulation and journal persistence live elsewhere.
#[derive(Debug, Clone)]
pub struct TradeSetup {
    pub id: String,
    pub pair: String,
    pub timeframe: String,
    pub kind: TradeKind,
    pub start: DateTime<Utc>,
    pub entry_time: Option<DateTime<Utc>>,
    pub sr: f64,
    pub sl: f64,
    pub tp: f64,
    pub entry: f64,
    pub series: Arc<CandleSeries>,
}

impl TradeSetup {
    /// True when the entry candle's RSI is overbought or oversold.
    pub fn is_entry_on_rsi(&self) -> bool {
        self.series
            .candles
            .last()
            .and_then(|c| c.rsi)
            .is_some_and(|rsi| rsi >= RSI_OVERBOUGHT || rsi <= RSI_OVERSOLD)
    }

    /// Extreme RSI over the trailing `window` candles: the maximum for a
    /// short setup, the minimum for a long one. Rounded to 2 decimals.
    pub fn max_min_rsi(&self, window: usize) -> Option<f64> {
        let candles = &self.series.candles;
        let start = candles.len().saturating_sub(window);
        let extreme = candles[start..]
            .iter()
            .filter_map(|c| c.rsi)
            .reduce(|acc, rsi| match self.kind {
                TradeKind::Short => acc.max(rsi),
                TradeKind::Long => acc.min(rsi),
            })?;
        Some((extreme * 100.0).round() / 100.0)
    }

    /// Sessions the entry time falls into, comma-joined in fixed order,
    /// or `"n.a."` when no entry time is recorded and `"nosession"` when
    /// the time matches none.
    pub fn trade_session(&self) -> String {
        let Some(entry_time) = self.entry_time else {
            return "n.a.".to_string();
        };
        let t = entry_time.time();

        let sessions: Vec<String> = TradeSession::iter()
            .filter(|session| session.contains(t))
            .map(|session| session.to_string())
            .collect();
        if sessions.is_empty() {
            return "nosession".to_string();
        }
        sessions.join(",")
    }

    /// Average pips covered per candle from `trend_start` up to the trade
    /// start, rounded to 1 decimal. `None` when the window holds fewer
    /// than two candles.
    pub fn pips_per_candle_of_trend(&self, trend_start: DateTime<Utc>) -> Option<f64> {
        let sub = self.series.slice(trend_start, self.start);
        if sub.len() < 2 {
            return None;
        }
        let first = sub.candles.first()?.mid_close();
        let last = sub.candles.last()?.mid_close();
        let pips = pips_between(&self.pair, first, last);
        let per_candle = pips / sub.len() as f64;
        Some((per_candle * 10.0).round() / 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::{Candle, Quote};
    use chrono::TimeZone;

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 9, day, hour, 0, 0).unwrap()
    }

    fn candle(day: u32, price: f64, rsi: Option<f64>) -> Candle {
        let q = Quote { open: price, high: price, low: price, close: price };
        Candle { time: t(day, 21), bid: q, ask: q, mid: None, volume: 1.0, rsi }
    }

    fn setup(kind: TradeKind, rsis: Vec<Option<f64>>) -> TradeSetup {
        let candles = rsis
            .into_iter()
            .enumerate()
            .map(|(i, rsi)| candle(i as u32 + 1, 0.6600 + i as f64 * 0.0010, rsi))
            .collect();
        TradeSetup {
            id: "EUR_GBP TEST".to_string(),
            pair: "EUR_GBP".to_string(),
            timeframe: "D".to_string(),
            kind,
            start: t(28, 21),
            entry_time: None,
            sr: 0.6595,
            sl: 0.6550,
            tp: 0.6700,
            entry: 0.6610,
            series: Arc::new(CandleSeries::new("EUR_GBP", "D", candles)),
        }
    }

    #[test]
    fn test_entry_on_rsi_boundaries() {
        assert!(setup(TradeKind::Long, vec![Some(50.0), Some(70.0)]).is_entry_on_rsi());
        assert!(setup(TradeKind::Long, vec![Some(50.0), Some(30.0)]).is_entry_on_rsi());
        assert!(!setup(TradeKind::Long, vec![Some(50.0), Some(55.0)]).is_entry_on_rsi());
        assert!(!setup(TradeKind::Long, vec![Some(50.0), None]).is_entry_on_rsi());
    }

    #[test]
    fn test_max_min_rsi_by_trade_kind() {
        let rsis = vec![Some(40.0), Some(75.0), Some(25.0), Some(60.0)];
        assert_eq!(setup(TradeKind::Short, rsis.clone()).max_min_rsi(4), Some(75.0));
        assert_eq!(setup(TradeKind::Long, rsis.clone()).max_min_rsi(4), Some(25.0));
        // window narrower than the series only sees the tail
        assert_eq!(setup(TradeKind::Short, rsis).max_min_rsi(2), Some(60.0));
    }

    #[test]
    fn test_trade_session_classification() {
        let mut s = setup(TradeKind::Long, vec![Some(50.0)]);

        s.entry_time = Some(t(10, 3));
        assert_eq!(s.trade_session(), "asian");

        s.entry_time = Some(t(10, 23)); // late window, past midnight wrap
        assert_eq!(s.trade_session(), "asian");

        s.entry_time = Some(t(10, 14)); // european and namerican overlap
        assert_eq!(s.trade_session(), "european,namerican");

        s.entry_time = Some(t(10, 20));
        assert_eq!(s.trade_session(), "nosession");

        s.entry_time = None;
        assert_eq!(s.trade_session(), "n.a.");
    }

    #[test]
    fn test_pips_per_candle_of_trend() {
        // 5 candles from 0.6600 to 0.6640: 40 pips over 5 candles -> 8.0
        let s = setup(TradeKind::Long, vec![None; 5]);
        assert_eq!(s.pips_per_candle_of_trend(t(1, 21)), Some(8.0));
    }
}
