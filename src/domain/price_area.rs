use crate::domain::instrument::{add_pips, subtract_pips};

/// A horizontal support/resistance band: an SR price plus/minus a pip
/// half-width, resolved in the instrument's pip scale.
#[derive(Debug, Clone)]
pub struct PriceArea {
    pub instrument: String,
    /// The SR reference price the band is centred on.
    pub price: f64,
    pub lower: f64,
    pub upper: f64,
    /// Half-width in pips.
    pub pips: u32,
}

impl PriceArea {
    pub fn new(instrument: &str, price: f64, pips: u32) -> Self {
        PriceArea {
            instrument: instrument.to_string(),
            price,
            lower: subtract_pips(instrument, price, pips as f64),
            upper: add_pips(instrument, price, pips as f64),
            pips,
        }
    }

    /// Closed-band membership test.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.lower && price <= self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_bounds_non_jpy() {
        let area = PriceArea::new("EUR_GBP", 0.6595, 30);
        assert!((area.lower - 0.6565).abs() < 1e-9);
        assert!((area.upper - 0.6625).abs() < 1e-9);
    }

    #[test]
    fn test_contains_is_closed() {
        let area = PriceArea::new("EUR_GBP", 0.6595, 30);
        assert!(area.contains(area.lower));
        assert!(area.contains(area.upper));
        assert!(area.contains(0.6595));
        assert!(!area.contains(area.upper + 1e-6));
    }

    #[test]
    fn test_band_bounds_jpy() {
        let area = PriceArea::new("EUR_JPY", 122.173, 50);
        assert!((area.lower - 121.673).abs() < 1e-9);
        assert!((area.upper - 122.673).abs() < 1e-9);
    }
}
