// Domain types and value objects
pub mod candle;
pub mod instrument;
pub mod price_area;

// Re-export commonly used types
pub use candle::{Candle, Quote};
pub use price_area::PriceArea;
