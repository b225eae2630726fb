// Pivot detection, area filtering and scoring
pub mod area_filter;
pub mod pipeline;
pub mod zigzag;

// Re-export commonly used types
pub use area_filter::AreaFilter;
pub use pipeline::{get_lasttime, get_pivots, get_pivots_lasttime};
