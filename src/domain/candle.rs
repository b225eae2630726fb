use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One side of an OHLC quote (bid, ask or the derived mid).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Quote {
    /// Element-wise midpoint of two quotes.
    pub fn midpoint(bid: &Quote, ask: &Quote) -> Quote {
        Quote {
            open: (bid.open + ask.open) / 2.0,
            high: (bid.high + ask.high) / 2.0,
            low: (bid.low + ask.low) / 2.0,
            close: (bid.close + ask.close) / 2.0,
        }
    }
}

/// A single price candle as delivered by the broker feed.
///
/// Bid and ask OHLC are the raw data; `mid` is a derived feature that a
/// cache file may or may not carry. Identified by `time`, which is unique
/// and strictly increasing within a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub bid: Quote,
    pub ask: Quote,
    /// Derived mid prices; populated lazily via `ensure_features`.
    #[serde(default)]
    pub mid: Option<Quote>,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub rsi: Option<f64>,
}

impl Candle {
    /// (Re-)derive the mid OHLC from bid/ask. Idempotent: an already
    /// populated `mid` is recomputed so stale features cannot survive.
    pub fn ensure_features(&mut self) {
        self.mid = Some(Quote::midpoint(&self.bid, &self.ask));
    }

    /// Mid quote, derived on the fly when the stored feature is absent.
    pub fn mid(&self) -> Quote {
        self.mid.unwrap_or_else(|| Quote::midpoint(&self.bid, &self.ask))
    }

    pub fn mid_close(&self) -> f64 {
        self.mid().close
    }

    pub fn mid_high(&self) -> f64 {
        self.mid().high
    }

    pub fn mid_low(&self) -> f64 {
        self.mid().low
    }
}
