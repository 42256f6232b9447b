// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::entities::blood_pressure::BloodPressureReading;
use crate::entities::input::AnalysisInput;
use crate::entities::lifestyle::{CardioEntry, CigarEntry, DrinkEntry, WeightEntry};
use crate::entities::report::AnalysisOutcome;
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::analysis::{AnalysisService, AnalysisServiceError, AnalysisServiceTrait};

/// Build a reading with a random id
pub fn reading_at(timestamp: DateTime<Utc>, systolic: u16, diastolic: u16, heart_rate: u16) -> BloodPressureReading {
    BloodPressureReading {
        id: Uuid::new_v4().to_string(),
        systolic,
        diastolic,
        heart_rate,
        timestamp,
        notes: None,
    }
}

/// One reading per day, oldest first, the last one taken on `end`
pub fn daily_readings(end: DateTime<Utc>, values: &[(u16, u16)]) -> Vec<BloodPressureReading> {
    let count = values.len() as i64;
    values
        .iter()
        .enumerate()
        .map(|(i, (systolic, diastolic))| {
            reading_at(end - Duration::days(count - 1 - i as i64), *systolic, *diastolic, 72)
        })
        .collect()
}

pub fn cigar_at(timestamp: DateTime<Utc>, count: u32) -> CigarEntry {
    CigarEntry {
        count,
        timestamp,
        brand: None,
    }
}

pub fn drinks_at(timestamp: DateTime<Utc>, count: u32) -> DrinkEntry {
    DrinkEntry {
        count,
        timestamp,
        drink_type: None,
        alcohol_content: None,
    }
}

pub fn cardio_at(timestamp: DateTime<Utc>, minutes: u32) -> CardioEntry {
    CardioEntry {
        activity: "walking".to_string(),
        minutes,
        timestamp,
    }
}

pub fn weight_at(timestamp: DateTime<Utc>, weight: f64) -> WeightEntry {
    WeightEntry { weight, timestamp }
}

/// Mock implementation of the AnalysisServiceTrait for testing
///
/// Runs the real engine with the default configuration unless a canned
/// outcome is set.
pub struct MockAnalysisService {
    engine: AnalysisService,
    canned_outcome: Option<AnalysisOutcome>,
    should_fail_validation: bool,
    analyze_calls: AtomicUsize,
}

impl Default for MockAnalysisService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnalysisService {
    /// Create a new mock analysis service
    pub fn new() -> Self {
        Self {
            engine: AnalysisService::default(),
            canned_outcome: None,
            should_fail_validation: false,
            analyze_calls: AtomicUsize::new(0),
        }
    }

    /// Configure the mock to fail validation
    pub fn with_validation_failure(mut self) -> Self {
        self.should_fail_validation = true;
        self
    }

    /// Always return `outcome` from analysis calls
    pub fn with_outcome(mut self, outcome: AnalysisOutcome) -> Self {
        self.canned_outcome = Some(outcome);
        self
    }

    /// How many times analysis has run
    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }
}

impl AnalysisServiceTrait for MockAnalysisService {
    fn validate_input(&self, input: &AnalysisInput) -> Result<(), AnalysisServiceError> {
        if self.should_fail_validation {
            Err(AnalysisServiceError::ValidationError(
                "Validation failed - mock is configured to fail validation".to_string(),
            ))
        } else {
            self.engine.validate_input(input)
        }
    }

    fn analyze_at(&self, input: &AnalysisInput, now: DateTime<Utc>) -> AnalysisOutcome {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        match &self.canned_outcome {
            Some(outcome) => outcome.clone(),
            None => self.engine.analyze_at(input, now),
        }
    }

    fn config(&self) -> &AnalysisConfig {
        self.engine.config()
    }
}

/// Mock implementation of the HealthServiceTrait for testing
#[derive(Debug)]
pub struct MockHealthService {
    engine_status: ComponentStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            engine_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with a degraded analysis engine
    pub fn with_degraded_engine(mut self) -> Self {
        self.engine_status = ComponentStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy analysis engine
    pub fn with_unhealthy_engine(mut self) -> Self {
        self.engine_status = ComponentStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        components.insert(
            "analysis_engine".to_string(),
            HealthComponent {
                status: self.engine_status.clone(),
                details: match self.engine_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Analysis engine returned no report".to_string()),
                    ComponentStatus::Unhealthy => Some("Analysis configuration error".to_string()),
                },
            },
        );

        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        SystemHealth { status, components }
    }

    async fn check_analysis_engine(&self) -> Result<bool, String> {
        match self.engine_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Analysis configuration error".to_string()),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::report::AnalysisStatus;
    use chrono::TimeZone;

    #[test]
    fn test_daily_readings_end_on_given_day() {
        let end = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let readings = daily_readings(end, &[(120, 80), (122, 81), (124, 82)]);
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[2].timestamp, end);
        assert_eq!(readings[0].timestamp, end - Duration::days(2));
        assert_ne!(readings[0].id, readings[1].id);
    }

    #[test]
    fn test_mock_counts_calls_and_returns_canned_outcome() {
        let canned = AnalysisOutcome::InsufficientData {
            message: "canned".to_string(),
            recommendations: Vec::new(),
        };
        let mock = MockAnalysisService::new().with_outcome(canned.clone());
        let end = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let input = AnalysisInput::from_readings(daily_readings(end, &[(120, 80), (121, 80)]));

        assert_eq!(mock.analyze_at(&input, end), canned);
        assert_eq!(mock.analyze_calls(), 1);
    }

    #[test]
    fn test_mock_validation_failure() {
        let mock = MockAnalysisService::new().with_validation_failure();
        assert!(mock.validate_input(&AnalysisInput::default()).is_err());
    }

    #[test]
    fn test_entry_builders_feed_every_lifestyle_section() {
        let end = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let readings = daily_readings(end, &[(138, 88), (121, 79), (140, 90), (120, 78), (139, 89), (122, 80)]);
        let days: Vec<DateTime<Utc>> = readings.iter().map(|r| r.timestamp).collect();
        let input = AnalysisInput {
            cigar_entries: vec![cigar_at(days[0], 2), cigar_at(days[2], 1), cigar_at(days[4], 3)],
            drink_entries: vec![drinks_at(days[0], 2), drinks_at(days[2], 2)],
            cardio_entries: vec![cardio_at(days[1], 30), cardio_at(days[3], 45), cardio_at(days[5], 20)],
            weight_entries: vec![weight_at(days[0], 200.0), weight_at(days[3], 199.0), weight_at(days[5], 198.5)],
            ..AnalysisInput::from_readings(readings)
        };

        let outcome = MockAnalysisService::new().analyze_at(&input, end);
        let lifestyle = &outcome.report().unwrap().lifestyle_correlation;

        assert_eq!(lifestyle.smoking.status, AnalysisStatus::Analyzed);
        assert_eq!(lifestyle.smoking.smoking_day_count, 3);
        assert_eq!(lifestyle.alcohol.status, AnalysisStatus::Analyzed);
        assert_eq!(lifestyle.cardio.status, AnalysisStatus::Analyzed);
        assert_eq!(lifestyle.cardio.total_minutes, 95);
        assert_eq!(lifestyle.weight.status, AnalysisStatus::Analyzed);
        assert_eq!(lifestyle.weight.latest_weight, Some(198.5));
    }

    #[tokio::test]
    async fn test_mock_health_service() {
        let health = MockHealthService::new().with_degraded_engine().get_system_health().await;
        assert_eq!(health.status, SystemStatus::Degraded);
    }

    #[tokio::test]
    async fn test_default_mock_health_service_is_healthy() {
        let service = create_mock_health_service();
        assert_eq!(service.check_analysis_engine().await, Ok(true));
        assert_eq!(service.get_system_health().await.status, SystemStatus::Healthy);
    }
}
