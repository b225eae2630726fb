use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::domain::price_area::PriceArea;

/// An ordered candle series for one instrument and granularity.
///
/// Candle times are unique and strictly increasing; detection, filtering
/// and scoring all treat the series as immutable shared input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub instrument: String,
    /// Broker-style granularity shorthand (`D`, `H8`, ...).
    pub granularity: String,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(instrument: &str, granularity: &str, candles: Vec<Candle>) -> Self {
        debug_assert!(
            candles.iter().tuple_windows().all(|(a, b)| a.time < b.time),
            "candle times must be strictly increasing"
        );
        CandleSeries {
            instrument: instrument.to_string(),
            granularity: granularity.to_string(),
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.candles.first().map(|c| c.time)
    }

    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.candles.last().map(|c| c.time)
    }

    /// Contiguous sub-series with `start <= time <= end`.
    pub fn slice(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> CandleSeries {
        let candles = self
            .candles
            .iter()
            .filter(|c| c.time >= start && c.time <= end)
            .cloned()
            .collect();
        CandleSeries {
            instrument: self.instrument.clone(),
            granularity: self.granularity.clone(),
            candles,
        }
    }

    /// Last time price visited the far side of `area`.
    ///
    /// The side is judged from the final candle's mid close relative to the
    /// area's SR price; walking backwards from the end, the first candle
    /// that pierced the opposite boundary wins. Falls back to the earliest
    /// candle's time when price never crossed.
    pub fn last_time_in_area(&self, area: &PriceArea) -> Option<DateTime<Utc>> {
        let last = self.candles.last()?;
        let above = last.mid_close() > area.price;

        for c in self.candles.iter().rev() {
            let crossed = if above {
                c.mid_low() <= area.lower
            } else {
                c.mid_high() >= area.upper
            };
            if crossed {
                return Some(c.time);
            }
        }
        self.first_time()
    }
}
