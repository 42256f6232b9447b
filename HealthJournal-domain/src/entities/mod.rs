// Domain entities and value objects
pub mod blood_pressure;
pub mod input;
pub mod lifestyle;
pub mod report;

// Re-export common types for easier imports
pub use blood_pressure::{BloodPressureCategory, BloodPressureReading};
pub use input::AnalysisInput;
pub use lifestyle::{CardioEntry, CigarEntry, DrinkEntry, EventEntry, LifestyleEntry, WeightEntry};
pub use report::{AnalysisOutcome, AnalysisReport, AnalysisStatus, ConfidenceLevel, RiskLevel, TrendDirection};
