// Core modules
pub mod analysis;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use analysis::{AreaFilter, get_lasttime, get_pivots, get_pivots_lasttime};
pub use config::PivotParams;
pub use domain::{Candle, PriceArea, Quote};
pub use error::{AnalysisError, AnalysisResult};
pub use models::{
    CandleSeries, Direction, Pivot, PivotKind, PivotList, Segment, SegmentList, TradeKind,
    TradeSetup,
};
