pub mod analysis;
pub mod health;

// Re-export handlers for easier imports
pub use analysis::{analyze, get_analysis_config};
pub use health::health_check;
