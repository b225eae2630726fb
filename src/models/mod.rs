// Series and pivot model
// These modules contain pure business logic independent of any I/O

pub mod candle_series;
pub mod pivot;
pub mod pivot_list;
pub mod segment;
pub mod trade;

// Re-export key types for convenience
pub use candle_series::CandleSeries;
pub use pivot::{Pivot, PivotKind};
pub use pivot_list::PivotList;
pub use segment::{Direction, Segment, SegmentList};
pub use trade::{TradeKind, TradeSession, TradeSetup};
