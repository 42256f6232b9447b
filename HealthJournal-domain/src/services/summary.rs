//! Descriptive statistics, data quality and report confidence.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::blood_pressure::{BloodPressureCategory, BloodPressureReading};
use crate::entities::input::AnalysisInput;
use super::statistics::{days_between, mean, safe_ratio, std_dev};

/// Readings per day at or above which data quality is excellent
const EXCELLENT_FREQUENCY: f64 = 1.0;
const GOOD_FREQUENCY: f64 = 0.5;

/// Reading count and span (days) at which the volume and span terms saturate
const CONFIDENCE_FULL_VOLUME: f64 = 30.0;
const CONFIDENCE_FULL_SPAN_DAYS: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MeasurementStats {
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl MeasurementStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        Self {
            mean: mean(values),
            std_dev: std_dev(values),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ReadingSummary {
    pub reading_count: usize,
    pub systolic: MeasurementStats,
    pub diastolic: MeasurementStats,
    pub heart_rate: MeasurementStats,
    /// Clinical category of the mean reading
    pub category: BloodPressureCategory,
}

pub fn summarize(readings: &[&BloodPressureReading]) -> ReadingSummary {
    let systolic: Vec<f64> = readings.iter().map(|r| f64::from(r.systolic)).collect();
    let diastolic: Vec<f64> = readings.iter().map(|r| f64::from(r.diastolic)).collect();
    let heart_rate: Vec<f64> = readings.iter().map(|r| f64::from(r.heart_rate)).collect();

    let systolic = MeasurementStats::from_values(&systolic);
    let diastolic = MeasurementStats::from_values(&diastolic);
    let category = BloodPressureCategory::from_measurements(systolic.mean, diastolic.mean);

    ReadingSummary {
        reading_count: readings.len(),
        systolic,
        diastolic,
        heart_rate: MeasurementStats::from_values(&heart_rate),
        category,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DataQualityLevel {
    Excellent,
    Good,
    NeedsImprovement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DataQuality {
    pub total_readings: usize,
    pub first_reading: Option<DateTime<Utc>>,
    pub last_reading: Option<DateTime<Utc>>,
    /// Fractional days from the first reading to the last
    pub span_days: f64,
    /// Readings divided by the span, with spans under a day counted as one day
    pub readings_per_day: f64,
    pub quality: DataQualityLevel,
    /// Lifestyle entries of every kind
    pub lifestyle_entries: usize,
    pub entries_by_kind: BTreeMap<String, usize>,
}

/// Quality of the logged data; `chronological` must be sorted oldest first
pub fn assess_data_quality(chronological: &[&BloodPressureReading], input: &AnalysisInput) -> DataQuality {
    let first_reading = chronological.first().map(|r| r.timestamp);
    let last_reading = chronological.last().map(|r| r.timestamp);
    let span_days = match (first_reading, last_reading) {
        (Some(first), Some(last)) => days_between(first, last),
        _ => 0.0,
    };
    let readings_per_day = safe_ratio(chronological.len() as f64, span_days.max(1.0));
    let quality = if readings_per_day >= EXCELLENT_FREQUENCY {
        DataQualityLevel::Excellent
    } else if readings_per_day >= GOOD_FREQUENCY {
        DataQualityLevel::Good
    } else {
        DataQualityLevel::NeedsImprovement
    };

    let timeline = input.lifestyle_timeline();
    let mut entries_by_kind = BTreeMap::new();
    for entry in &timeline {
        *entries_by_kind.entry(entry.kind().to_string()).or_insert(0) += 1;
    }

    DataQuality {
        total_readings: chronological.len(),
        first_reading,
        last_reading,
        span_days,
        readings_per_day,
        quality,
        lifestyle_entries: timeline.len(),
        entries_by_kind,
    }
}

/// Overall confidence in a report, 0-1
///
/// Mean of three capped terms: volume (count / 30), span (days / 90) and
/// average days between readings (days / count).
pub fn confidence_score(reading_count: usize, span_days: f64) -> f64 {
    let count = reading_count as f64;
    let volume = safe_ratio(count, CONFIDENCE_FULL_VOLUME).min(1.0);
    let span = safe_ratio(span_days, CONFIDENCE_FULL_SPAN_DAYS).min(1.0);
    let spacing = safe_ratio(span_days, count).min(1.0);
    (volume + span + spacing) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::lifestyle::{CigarEntry, EventEntry};
    use chrono::{Duration, TimeZone};

    fn readings_every(hours: i64, count: usize) -> Vec<BloodPressureReading> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        (0..count)
            .map(|i| BloodPressureReading {
                id: format!("q{i}"),
                systolic: 120 + (i % 3) as u16 * 10,
                diastolic: 80,
                heart_rate: 60 + i as u16,
                timestamp: start + Duration::hours(hours * i as i64),
                notes: None,
            })
            .collect()
    }

    #[test]
    fn test_summary_statistics() {
        let data = readings_every(24, 3);
        let refs: Vec<&BloodPressureReading> = data.iter().collect();
        let summary = summarize(&refs);

        assert_eq!(summary.reading_count, 3);
        assert_eq!(summary.systolic.mean, 130.0);
        assert_eq!(summary.systolic.min, 120.0);
        assert_eq!(summary.systolic.max, 140.0);
        assert!((summary.systolic.std_dev - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(summary.diastolic.std_dev, 0.0);
        assert_eq!(summary.heart_rate.mean, 61.0);
        assert_eq!(summary.category, BloodPressureCategory::Hypertension1);
    }

    #[test]
    fn test_quality_levels() {
        let input = AnalysisInput::default();

        let daily = readings_every(24, 10);
        let refs: Vec<&BloodPressureReading> = daily.iter().collect();
        let quality = assess_data_quality(&refs, &input);
        assert_eq!(quality.span_days, 9.0);
        assert!((quality.readings_per_day - 10.0 / 9.0).abs() < 1e-9);
        assert_eq!(quality.quality, DataQualityLevel::Excellent);

        let every_other_day = readings_every(48, 5);
        let refs: Vec<&BloodPressureReading> = every_other_day.iter().collect();
        assert_eq!(assess_data_quality(&refs, &input).quality, DataQualityLevel::Good);

        let weekly = readings_every(24 * 7, 4);
        let refs: Vec<&BloodPressureReading> = weekly.iter().collect();
        assert_eq!(assess_data_quality(&refs, &input).quality, DataQualityLevel::NeedsImprovement);
    }

    #[test]
    fn test_short_span_counts_as_one_day() {
        let data = readings_every(1, 2);
        let refs: Vec<&BloodPressureReading> = data.iter().collect();
        let quality = assess_data_quality(&refs, &AnalysisInput::default());
        assert_eq!(quality.readings_per_day, 2.0);
    }

    #[test]
    fn test_lifestyle_entry_counts() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 20, 0, 0).unwrap();
        let input = AnalysisInput {
            cigar_entries: vec![
                CigarEntry { count: 1, timestamp: ts, brand: None },
                CigarEntry { count: 2, timestamp: ts, brand: None },
            ],
            event_entries: vec![EventEntry { title: "Travel".to_string(), description: None, timestamp: ts }],
            ..AnalysisInput::default()
        };
        let data = readings_every(24, 2);
        let refs: Vec<&BloodPressureReading> = data.iter().collect();
        let quality = assess_data_quality(&refs, &input);

        assert_eq!(quality.lifestyle_entries, 3);
        assert_eq!(quality.entries_by_kind.get("cigar"), Some(&2));
        assert_eq!(quality.entries_by_kind.get("event"), Some(&1));
    }

    #[test]
    fn test_confidence_score() {
        // (10/30 + 9/90 + 9/10) / 3
        let expected = (1.0 / 3.0 + 0.1 + 0.9) / 3.0;
        assert!((confidence_score(10, 9.0) - expected).abs() < 1e-12);
        assert_eq!(confidence_score(60, 180.0), 1.0);
        assert!((confidence_score(1, 0.0) - 1.0 / 90.0).abs() < 1e-12);
    }
}
