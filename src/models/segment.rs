use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::instrument::pips_between;

/// Direction of a candle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Direction of the net move from `start_price` to `end_price`.
    pub fn from_move(start_price: f64, end_price: f64) -> Direction {
        if end_price >= start_price { Direction::Up } else { Direction::Down }
    }
}

/// A directional run of candles between two turning points.
///
/// Invariant: `start_time < end_time`, and `direction` matches the net
/// price movement between the boundary prices. Segments are owned by the
/// pivots they are attached to (as `pre`/`aft`); the full segment series a
/// detection produced lives in a [`SegmentList`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_price: f64,
    pub end_price: f64,
    pub direction: Direction,
    /// Number of candle intervals the run spans (end boundary exclusive).
    pub count: usize,
}

impl Segment {
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        start_price: f64,
        end_price: f64,
        count: usize,
    ) -> Self {
        debug_assert!(start_time < end_time, "segment must span forward in time");
        Segment {
            start_time,
            end_time,
            start_price,
            end_price,
            direction: Direction::from_move(start_price, end_price),
            count,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Absolute boundary-to-boundary movement in pips.
    pub fn diff_pips(&self, instrument: &str) -> f64 {
        pips_between(instrument, self.start_price, self.end_price)
    }

    /// Extend this segment backwards over `earlier`, absorbing its run.
    /// The direction is re-derived from the new boundary prices.
    pub fn absorb_earlier(&mut self, earlier: &Segment) {
        debug_assert_eq!(earlier.end_time, self.start_time);
        self.start_time = earlier.start_time;
        self.start_price = earlier.start_price;
        self.count += earlier.count;
        self.direction = Direction::from_move(self.start_price, self.end_price);
    }

    /// Extend this segment forwards over `later`, absorbing its run.
    pub fn absorb_later(&mut self, later: &Segment) {
        debug_assert_eq!(later.start_time, self.end_time);
        self.end_time = later.end_time;
        self.end_price = later.end_price;
        self.count += later.count;
        self.direction = Direction::from_move(self.start_price, self.end_price);
    }
}

/// The ordered segment series a pivot detection was derived from.
///
/// Merge operations never walk pivot back-pointers; they look segments up
/// here by boundary time instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentList {
    pub instrument: String,
    pub segments: Vec<Segment>,
}

impl SegmentList {
    pub fn new(instrument: &str, segments: Vec<Segment>) -> Self {
        SegmentList { instrument: instrument.to_string(), segments }
    }

    /// The segment whose run ends exactly at `time`, if any.
    pub fn ending_at(&self, time: DateTime<Utc>) -> Option<&Segment> {
        self.segments.iter().find(|s| s.end_time == time)
    }

    /// The segment whose run starts exactly at `time`, if any.
    pub fn starting_at(&self, time: DateTime<Utc>) -> Option<&Segment> {
        self.segments.iter().find(|s| s.start_time == time)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, day, 22, 0, 0).unwrap()
    }

    #[test]
    fn test_direction_from_move() {
        assert_eq!(Direction::from_move(1.0, 2.0), Direction::Up);
        assert_eq!(Direction::from_move(2.0, 1.0), Direction::Down);
    }

    #[test]
    fn test_diff_pips_uses_instrument_scale() {
        let s = Segment::new(t(1), t(4), 0.6600, 0.6630, 3);
        assert!((s.diff_pips("EUR_GBP") - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_absorb_earlier_extends_and_redirects() {
        // up run 1->4 preceded by a down run 5->1: absorbing yields a
        // net-down segment spanning both
        let mut seg = Segment::new(t(4), t(7), 1.0, 4.0, 3);
        let earlier = Segment::new(t(1), t(4), 5.0, 1.0, 3);
        seg.absorb_earlier(&earlier);
        assert_eq!(seg.start_time, t(1));
        assert_eq!(seg.count, 6);
        assert_eq!(seg.start_price, 5.0);
        assert_eq!(seg.direction, Direction::Down);
    }

    #[test]
    fn test_boundary_lookup() {
        let slist = SegmentList::new(
            "EUR_GBP",
            vec![
                Segment::new(t(1), t(4), 1.0, 2.0, 3),
                Segment::new(t(4), t(8), 2.0, 1.5, 4),
            ],
        );
        assert_eq!(slist.ending_at(t(4)).unwrap().start_time, t(1));
        assert_eq!(slist.starting_at(t(4)).unwrap().end_time, t(8));
        assert!(slist.ending_at(t(2)).is_none());
    }
}
