use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::config::{AnalysisConfig, ConfigError};
use crate::entities::input::AnalysisInput;
use crate::entities::report::{AnalysisOutcome, AnalysisReport};
use crate::services::alerts::detect_alerts;
use crate::services::circadian::analyze_circadian;
use crate::services::lifestyle::analyze_lifestyle;
use crate::services::predictive::predict;
use crate::services::recommendations::generate_recommendations;
use crate::services::risk::assess_risk;
use crate::services::summary::{assess_data_quality, confidence_score, summarize};
use crate::services::trend::analyze_trends;

/// Message returned when no readings were supplied
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Need at least 2 blood pressure readings to generate analysis";

/// Analysis service errors
#[derive(Debug, Error)]
pub enum AnalysisServiceError {
    /// Input failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The service was given an unusable configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Trait for analysis service operations
pub trait AnalysisServiceTrait {
    /// Validate an analysis request before running it
    fn validate_input(&self, input: &AnalysisInput) -> Result<(), AnalysisServiceError>;

    /// Analyze a journal snapshot as of `now`
    fn analyze_at(&self, input: &AnalysisInput, now: DateTime<Utc>) -> AnalysisOutcome;

    /// Analyze a journal snapshot as of the current time
    fn analyze(&self, input: &AnalysisInput) -> AnalysisOutcome {
        self.analyze_at(input, Utc::now())
    }

    /// Configuration the service runs with
    fn config(&self) -> &AnalysisConfig;
}

/// Blood pressure analysis engine
#[derive(Debug, Clone, Default)]
pub struct AnalysisService {
    config: AnalysisConfig,
}

impl AnalysisService {
    /// Create a service after checking the configuration
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    fn insufficient_data() -> AnalysisOutcome {
        AnalysisOutcome::InsufficientData {
            message: INSUFFICIENT_DATA_MESSAGE.to_string(),
            recommendations: vec![
                "Take at least two blood pressure readings on different days".to_string(),
                "Measure at consistent times, for example every morning and evening".to_string(),
                "Log smoking, drinks and exercise alongside your readings".to_string(),
            ],
        }
    }
}

/// Flatten nested validator errors into `path: message` strings
fn describe_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("Invalid {}", field),
                    })
                    .collect();
                out.push(format!("{}: {}", path, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(inner) => describe_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    describe_errors(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

impl AnalysisServiceTrait for AnalysisService {
    fn validate_input(&self, input: &AnalysisInput) -> Result<(), AnalysisServiceError> {
        let mut problems = Vec::new();
        if let Err(validation_errors) = input.validate() {
            describe_errors(&validation_errors, "", &mut problems);
        }

        for (index, reading) in input.readings.iter().enumerate() {
            if reading.systolic <= reading.diastolic {
                problems.push(format!(
                    "readings[{}]: Systolic pressure must be greater than diastolic pressure",
                    index
                ));
            }
        }

        if problems.is_empty() {
            return Ok(());
        }
        problems.sort();
        let message = problems.join("; ");
        warn!(%message, "Rejected analysis input");
        Err(AnalysisServiceError::ValidationError(message))
    }

    #[instrument(skip(self, input), fields(readings = input.readings.len()))]
    fn analyze_at(&self, input: &AnalysisInput, now: DateTime<Utc>) -> AnalysisOutcome {
        if input.readings.is_empty() {
            info!("No readings supplied, skipping analysis");
            return Self::insufficient_data();
        }

        let config = &self.config;
        let chronological = input.chronological_readings();

        let summary = summarize(&chronological);
        let data_quality = assess_data_quality(&chronological, input);
        let risk_assessment = assess_risk(&chronological, input, now, config);
        let trend_analysis = analyze_trends(&chronological, now);
        let lifestyle_correlation = analyze_lifestyle(&chronological, input, config);
        let circadian_analysis = analyze_circadian(&chronological, &config.bands, config.local_offset());
        let predictive_insights = predict(&chronological);
        let medical_alerts = detect_alerts(&chronological, now, &config.bands, &config.alerts);
        let personalized_recommendations =
            generate_recommendations(&risk_assessment, &trend_analysis, &lifestyle_correlation, &data_quality);
        let confidence_score = confidence_score(chronological.len(), data_quality.span_days);

        debug!(
            overall_risk = ?risk_assessment.overall,
            alerts = medical_alerts.len(),
            confidence_score,
            "Analysis complete"
        );

        AnalysisOutcome::Complete {
            report: Box::new(AnalysisReport {
                generated_at: now,
                summary,
                data_quality,
                risk_assessment,
                trend_analysis,
                lifestyle_correlation,
                circadian_analysis,
                predictive_insights,
                medical_alerts,
                personalized_recommendations,
                confidence_score,
            }),
        }
    }

    fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

/// Create an analysis service with the default configuration
pub fn create_default_analysis_service() -> impl AnalysisServiceTrait + Send + Sync {
    AnalysisService::default()
}

/// Create a mock analysis service for testing
/// This function is only available when the mock feature is enabled
#[cfg(feature = "mock")]
pub fn create_mock_analysis_service() -> impl AnalysisServiceTrait + Send + Sync {
    crate::testing::MockAnalysisService::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiskWeightConfig;
    use crate::entities::blood_pressure::BloodPressureReading;
    use crate::entities::lifestyle::CigarEntry;
    use crate::entities::report::RiskLevel;
    use crate::services::recommendations::{RecommendationCategory, RecommendationPriority};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 15, 20, 0, 0).unwrap()
    }

    /// One reading per day ending yesterday, given oldest first
    fn daily(values: &[(u16, u16)]) -> Vec<BloodPressureReading> {
        let count = values.len() as i64;
        values
            .iter()
            .enumerate()
            .map(|(i, (systolic, diastolic))| BloodPressureReading {
                id: format!("d{i}"),
                systolic: *systolic,
                diastolic: *diastolic,
                heart_rate: 70,
                timestamp: now() - Duration::days(count - i as i64),
                notes: None,
            })
            .collect()
    }

    fn service() -> AnalysisService {
        AnalysisService::new(AnalysisConfig::default()).unwrap()
    }

    fn report(input: &AnalysisInput) -> AnalysisReport {
        match service().analyze_at(input, now()) {
            AnalysisOutcome::Complete { report } => *report,
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = AnalysisConfig {
            risk_weights: RiskWeightConfig {
                current: 0.5,
                historical: 0.5,
                progression: 0.5,
                lifestyle: 0.5,
            },
            ..AnalysisConfig::default()
        };
        assert!(AnalysisService::new(config).is_err());
    }

    #[test]
    fn test_validate_input_valid() {
        let input = AnalysisInput::from_readings(daily(&[(120, 80), (125, 82)]));
        assert!(service().validate_input(&input).is_ok());
    }

    #[test]
    fn test_validate_input_out_of_range_reading() {
        let input = AnalysisInput::from_readings(daily(&[(120, 80), (350, 82)]));
        let err = service().validate_input(&input).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation error"));
        assert!(message.contains("readings[1].systolic"), "unexpected message: {}", message);
    }

    #[test]
    fn test_validate_input_systolic_not_greater_than_diastolic() {
        let input = AnalysisInput::from_readings(daily(&[(80, 80)]));
        let err = service().validate_input(&input).unwrap_err();
        assert!(err.to_string().contains("Systolic pressure must be greater"));
    }

    #[test]
    fn test_empty_readings_short_circuit() {
        let outcome = service().analyze_at(&AnalysisInput::default(), now());
        match outcome {
            AnalysisOutcome::InsufficientData { message, recommendations } => {
                assert_eq!(message, INSUFFICIENT_DATA_MESSAGE);
                assert!(!recommendations.is_empty());
            }
            other => panic!("expected insufficient data, got {:?}", other),
        }
    }

    #[test]
    fn test_single_reading_still_reports() {
        let report = report(&AnalysisInput::from_readings(daily(&[(118, 76)])));
        assert_eq!(report.summary.reading_count, 1);
        assert!(report.trend_analysis.systolic.is_none());
        assert_eq!(report.risk_assessment.current, RiskLevel::Low);
    }

    #[test]
    fn test_steady_readings_get_monitoring_reminder() {
        let report = report(&AnalysisInput::from_readings(daily(&[(118, 76); 5])));
        assert_eq!(report.personalized_recommendations.len(), 1);
        assert_eq!(report.personalized_recommendations[0].title, "Continue monitoring");
        assert!(report.medical_alerts.is_empty());
        assert_eq!(report.generated_at, now());
    }

    #[test]
    fn test_recommendation_rule_order() {
        let mut values = vec![(182, 121); 6];
        values.extend(vec![(195, 125); 6]);
        let mut readings = daily(&values);
        // Spread the history out so data quality needs improvement
        for (i, reading) in readings.iter_mut().enumerate() {
            reading.timestamp = now() - Duration::days(3 * (12 - i as i64));
        }
        let input = AnalysisInput {
            readings,
            cigar_entries: vec![CigarEntry {
                count: 1,
                timestamp: now() - Duration::days(3),
                brand: None,
            }],
            ..AnalysisInput::default()
        };
        let report = report(&input);

        assert_eq!(report.risk_assessment.overall, RiskLevel::High);
        let categories: Vec<RecommendationCategory> = report
            .personalized_recommendations
            .iter()
            .map(|r| r.category)
            .collect();
        assert_eq!(
            categories,
            vec![
                RecommendationCategory::Medical,
                RecommendationCategory::Trend,
                RecommendationCategory::Lifestyle,
                RecommendationCategory::Monitoring,
            ]
        );
        assert_eq!(report.personalized_recommendations[0].priority, RecommendationPriority::Urgent);
        assert!(report
            .personalized_recommendations
            .iter()
            .all(|r| r.title != "Continue monitoring"));
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let input = AnalysisInput::from_readings(daily(&[(120, 80), (135, 88), (128, 84), (142, 91), (119, 77)]));
        let service = service();
        assert_eq!(service.analyze_at(&input, now()), service.analyze_at(&input, now()));
    }
}
