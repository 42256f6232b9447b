//! Domain layer health check functionality
//! Reports whether the analysis engine is configured correctly and can produce a report

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::config::AnalysisConfig;
use crate::entities::blood_pressure::BloodPressureReading;
use crate::entities::input::AnalysisInput;
use crate::services::analysis::{AnalysisService, AnalysisServiceTrait};

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component ran but did not produce its full result
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Why the component is not healthy, when it isn't
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Worst status across all components
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the analysis engine
    /// Returns true if it produced a full report, false if it ran but returned no report
    /// Returns an error if the configuration is unusable
    async fn check_analysis_engine(&self) -> Result<bool, String>;
}

/// Run a two-reading smoke test through an engine built from `config`
///
/// Returns:
/// - Ok(true) if the engine produced a complete report
/// - Ok(false) if it ran but produced no report
/// - Err if the configuration is rejected
pub async fn check_analysis_engine(config: &AnalysisConfig) -> Result<bool, String> {
    let service = AnalysisService::new(config.clone()).map_err(|e| format!("Analysis configuration error: {}", e))?;

    let now = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).single().unwrap_or_else(Utc::now);
    let probe = |id: &str, offset_days: i64, systolic: u16, diastolic: u16| BloodPressureReading {
        id: id.to_string(),
        systolic,
        diastolic,
        heart_rate: 70,
        timestamp: now - Duration::days(offset_days),
        notes: None,
    };
    let input = AnalysisInput::from_readings(vec![probe("probe-1", 1, 120, 80), probe("probe-2", 0, 122, 81)]);

    Ok(service.analyze_at(&input, now).report().is_some())
}

/// Get overall system health
pub async fn get_system_health(config: &AnalysisConfig) -> SystemHealth {
    let engine = match check_analysis_engine(config).await {
        Ok(true) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        },
        Ok(false) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("Analysis engine returned no report for the smoke test".to_string()),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e),
        },
    };

    let overall_status = match engine.status {
        ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
        ComponentStatus::Degraded => SystemStatus::Degraded,
        ComponentStatus::Healthy => SystemStatus::Healthy,
    };

    SystemHealth {
        status: overall_status,
        components: vec![("analysis_engine".to_string(), engine)].into_iter().collect(),
    }
}

/// Health service bound to the configuration the server runs with
#[derive(Debug, Clone, Default)]
pub struct HealthService {
    config: AnalysisConfig,
}

impl HealthService {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        get_system_health(&self.config).await
    }

    async fn check_analysis_engine(&self) -> Result<bool, String> {
        check_analysis_engine(&self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BodyConfig;

    #[tokio::test]
    async fn test_get_system_health() {
        let health = get_system_health(&AnalysisConfig::default()).await;
        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("analysis_engine"));
    }

    #[tokio::test]
    async fn test_invalid_config_is_unhealthy() {
        let config = AnalysisConfig {
            body: BodyConfig {
                height_m: 0.0,
                ..BodyConfig::default()
            },
            ..AnalysisConfig::default()
        };
        let service = HealthService::new(config);
        assert!(service.check_analysis_engine().await.is_err());

        let health = service.get_system_health().await;
        assert_eq!(health.status, SystemStatus::Unhealthy);
        let engine = &health.components["analysis_engine"];
        assert!(engine.details.as_deref().unwrap_or_default().contains("configuration"));
    }
}
