//! Data models for the prediction bot
//!
//! Result and data transfer structs shared by commands and services.

pub mod chart;
pub mod ping;
pub mod prediction;

// Re-export commonly used types for convenience
pub use chart::{ChartConfig, ChartSeries, LineColor};
pub use ping::PingMetrics;
pub use prediction::{display_text, normalize_symbol};
