//! Medical alerts for recent readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::config::{AlertConfig, RiskBandConfig};
use crate::entities::blood_pressure::BloodPressureReading;
use super::statistics::subtract_days;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    BloodPressure,
    HeartRate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MedicalAlert {
    pub severity: AlertSeverity,
    pub kind: AlertKind,
    pub message: String,
    pub reading_id: String,
    pub timestamp: DateTime<Utc>,
    pub systolic: u16,
    pub diastolic: u16,
    pub heart_rate: u16,
}

impl MedicalAlert {
    fn for_reading(reading: &BloodPressureReading, severity: AlertSeverity, kind: AlertKind, message: String) -> Self {
        Self {
            severity,
            kind,
            message,
            reading_id: reading.id.clone(),
            timestamp: reading.timestamp,
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            heart_rate: reading.heart_rate,
        }
    }
}

/// Alerts for every reading taken within the look-back window before `now`
///
/// A reading may raise one blood pressure alert and, independently, one
/// heart-rate alert.
pub fn detect_alerts(
    readings: &[&BloodPressureReading],
    now: DateTime<Utc>,
    bands: &RiskBandConfig,
    alerts: &AlertConfig,
) -> Vec<MedicalAlert> {
    let since = subtract_days(now, alerts.lookback_days);
    let mut found = Vec::new();

    for reading in readings.iter().filter(|r| r.timestamp >= since && r.timestamp <= now) {
        let systolic = f64::from(reading.systolic);
        let diastolic = f64::from(reading.diastolic);

        if systolic >= bands.crisis_systolic || diastolic >= bands.crisis_diastolic {
            found.push(MedicalAlert::for_reading(
                reading,
                AlertSeverity::Critical,
                AlertKind::BloodPressure,
                format!(
                    "Hypertensive crisis reading of {}/{} mmHg. Seek immediate medical attention.",
                    reading.systolic, reading.diastolic
                ),
            ));
        } else if systolic >= bands.high_systolic || diastolic >= bands.high_diastolic {
            found.push(MedicalAlert::for_reading(
                reading,
                AlertSeverity::Warning,
                AlertKind::BloodPressure,
                format!(
                    "Stage 2 hypertension reading of {}/{} mmHg. Contact your healthcare provider.",
                    reading.systolic, reading.diastolic
                ),
            ));
        }

        if reading.heart_rate > alerts.max_heart_rate || reading.heart_rate < alerts.min_heart_rate {
            found.push(MedicalAlert::for_reading(
                reading,
                AlertSeverity::Warning,
                AlertKind::HeartRate,
                format!("Unusual heart rate of {} bpm.", reading.heart_rate),
            ));
        }
    }

    debug!(alerts = found.len(), "Checked recent readings for alerts");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 10, 12, 0, 0).unwrap()
    }

    fn reading(hours_ago: i64, systolic: u16, diastolic: u16, heart_rate: u16) -> BloodPressureReading {
        BloodPressureReading {
            id: format!("a{hours_ago}"),
            systolic,
            diastolic,
            heart_rate,
            timestamp: now() - Duration::hours(hours_ago),
            notes: None,
        }
    }

    fn detect(data: &[BloodPressureReading]) -> Vec<MedicalAlert> {
        let refs: Vec<&BloodPressureReading> = data.iter().collect();
        detect_alerts(&refs, now(), &RiskBandConfig::default(), &AlertConfig::default())
    }

    #[test]
    fn test_crisis_with_fast_heart_rate_yields_two_alerts() {
        let alerts = detect(&[reading(2, 190, 125, 110)]);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].kind, AlertKind::BloodPressure);
        assert_eq!(alerts[1].severity, AlertSeverity::Warning);
        assert_eq!(alerts[1].kind, AlertKind::HeartRate);
        assert_eq!(alerts[1].reading_id, "a2");
    }

    #[test]
    fn test_crisis_alone_is_single_critical() {
        let alerts = detect(&[reading(1, 185, 100, 80)]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_stage_two_warning_and_slow_heart_rate() {
        let alerts = detect(&[reading(5, 150, 85, 72), reading(6, 118, 76, 45)]);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::BloodPressure);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
        assert_eq!(alerts[1].kind, AlertKind::HeartRate);
    }

    #[test]
    fn test_old_readings_are_ignored() {
        // Four days ago
        let alerts = detect(&[reading(96, 200, 130, 120)]);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_normal_readings_raise_nothing() {
        let alerts = detect(&[reading(1, 118, 76, 64), reading(20, 112, 74, 100), reading(30, 119, 79, 50)]);
        assert!(alerts.is_empty());
    }
}
