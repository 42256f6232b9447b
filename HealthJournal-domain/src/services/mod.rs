// Domain services
// The blood pressure analysis engine, one module per sub-analysis.

pub mod alerts;
pub mod analysis;
pub mod circadian;
pub mod lifestyle;
pub mod predictive;
pub mod recommendations;
pub mod risk;
pub mod statistics;
pub mod summary;
pub mod trend;
pub mod weight;

// Re-export service traits and factory functions
pub use analysis::{AnalysisService, AnalysisServiceError, AnalysisServiceTrait, create_default_analysis_service};

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use analysis::create_mock_analysis_service;
