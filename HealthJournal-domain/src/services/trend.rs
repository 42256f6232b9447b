//! Ordinary least-squares trend estimation over an evenly spaced series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::blood_pressure::BloodPressureReading;
use crate::entities::report::{AnalysisStatus, ConfidenceLevel, TrendDirection};
use super::lifestyle::BpAverage;
use super::statistics::{mean, safe_ratio, subtract_months, subtract_weeks};

/// Readings needed before trends are fitted
pub const MIN_TREND_READINGS: usize = 3;

/// |slope| at or below which a series is considered stable
const STABLE_SLOPE: f64 = 0.5;

/// Index steps covered by `change_rate` (a month of daily readings)
const CHANGE_RATE_STEPS: f64 = 30.0;

/// Number of points at which R² is taken at face value for confidence
const CONFIDENCE_REFERENCE_POINTS: f64 = 20.0;

/// Fitted linear trend of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct TrendResult {
    /// Direction of the fitted line
    pub direction: TrendDirection,
    /// Change per index step
    pub slope: f64,
    /// Fitted value at index 0
    pub intercept: f64,
    /// Coefficient of determination, exactly 0 for a flat series
    pub r_squared: f64,
    /// Confidence in the fit given R² and sample size
    pub confidence: ConfidenceLevel,
    /// Fitted value at the last index
    pub predicted_value: f64,
    /// Change over 30 index steps
    pub change_rate: f64,
}

impl TrendResult {
    /// Value of the fitted line at index `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a line through `values` with x = 0..n-1
///
/// Callers guarantee at least two points; trend analysis asks for three and
/// predictive analysis for ten before calling this.
pub fn calculate_trend(values: &[f64]) -> TrendResult {
    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

    let slope = safe_ratio(n * sum_xy - sum_x * sum_y, n * sum_x2 - sum_x.powi(2));
    let intercept = safe_ratio(sum_y - slope * sum_x, n);

    let avg = mean(values);
    let ss_tot: f64 = values.iter().map(|y| (y - avg).powi(2)).sum();
    let ss_res: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

    let direction = if slope.abs() <= STABLE_SLOPE {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    TrendResult {
        direction,
        slope,
        intercept,
        r_squared,
        confidence: fit_confidence(r_squared, values.len()),
        predicted_value: slope * (n - 1.0) + intercept,
        change_rate: slope * CHANGE_RATE_STEPS,
    }
}

fn fit_confidence(r_squared: f64, points: usize) -> ConfidenceLevel {
    let score = (r_squared * (points as f64 / CONFIDENCE_REFERENCE_POINTS)).min(1.0);
    if score > 0.8 {
        ConfidenceLevel::High
    } else if score > 0.6 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPeriod {
    Week,
    Month,
}

/// The latest period against the one before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PeriodComparison {
    pub period: ComparisonPeriod,
    pub status: AnalysisStatus,
    pub current: Option<BpAverage>,
    pub previous: Option<BpAverage>,
    /// Current mean minus previous mean
    pub systolic_change: Option<f64>,
    pub diastolic_change: Option<f64>,
}

/// Fitted trends over the whole history plus period comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct TrendAnalysis {
    /// `InsufficientData` below three readings, in which case no trend is fitted
    pub status: AnalysisStatus,
    pub systolic: Option<TrendResult>,
    pub diastolic: Option<TrendResult>,
    pub heart_rate: Option<TrendResult>,
    pub weekly: PeriodComparison,
    pub monthly: PeriodComparison,
}

/// Compare `(now - 1 period, now]` against the period before it
pub fn compare_periods(
    readings: &[&BloodPressureReading],
    now: DateTime<Utc>,
    period: ComparisonPeriod,
) -> PeriodComparison {
    let (current_start, previous_start) = match period {
        ComparisonPeriod::Week => (subtract_weeks(now, 1), subtract_weeks(now, 2)),
        ComparisonPeriod::Month => (subtract_months(now, 1), subtract_months(now, 2)),
    };

    let current: Vec<&BloodPressureReading> = readings
        .iter()
        .copied()
        .filter(|r| r.timestamp > current_start && r.timestamp <= now)
        .collect();
    let previous: Vec<&BloodPressureReading> = readings
        .iter()
        .copied()
        .filter(|r| r.timestamp > previous_start && r.timestamp <= current_start)
        .collect();

    let current = BpAverage::from_readings(&current);
    let previous = BpAverage::from_readings(&previous);
    let (status, systolic_change, diastolic_change) = match (&current, &previous) {
        (Some(cur), Some(prev)) => (
            AnalysisStatus::Analyzed,
            Some(cur.systolic - prev.systolic),
            Some(cur.diastolic - prev.diastolic),
        ),
        (None, None) => (AnalysisStatus::NoData, None, None),
        _ => (AnalysisStatus::InsufficientData, None, None),
    };

    PeriodComparison {
        period,
        status,
        current,
        previous,
        systolic_change,
        diastolic_change,
    }
}

/// Trend analysis over readings sorted oldest first
pub fn analyze_trends(chronological: &[&BloodPressureReading], now: DateTime<Utc>) -> TrendAnalysis {
    let weekly = compare_periods(chronological, now, ComparisonPeriod::Week);
    let monthly = compare_periods(chronological, now, ComparisonPeriod::Month);

    if chronological.len() < MIN_TREND_READINGS {
        return TrendAnalysis {
            status: AnalysisStatus::InsufficientData,
            systolic: None,
            diastolic: None,
            heart_rate: None,
            weekly,
            monthly,
        };
    }

    let series = |field: fn(&BloodPressureReading) -> u16| -> Vec<f64> {
        chronological.iter().map(|r| f64::from(field(*r))).collect()
    };
    let systolic = calculate_trend(&series(|r| r.systolic));
    let diastolic = calculate_trend(&series(|r| r.diastolic));
    let heart_rate = calculate_trend(&series(|r| r.heart_rate));

    debug!(
        systolic = ?systolic.direction,
        diastolic = ?diastolic.direction,
        "Fitted blood pressure trends"
    );

    TrendAnalysis {
        status: AnalysisStatus::Analyzed,
        systolic: Some(systolic),
        diastolic: Some(diastolic),
        heart_rate: Some(heart_rate),
        weekly,
        monthly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn reading(days_ago: i64, systolic: u16, diastolic: u16) -> BloodPressureReading {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        BloodPressureReading {
            id: format!("t{days_ago}"),
            systolic,
            diastolic,
            heart_rate: 70,
            timestamp: now - Duration::days(days_ago),
            notes: None,
        }
    }

    #[test]
    fn test_increasing_series() {
        let trend = calculate_trend(&[120.0, 125.0, 118.0, 130.0, 135.0]);
        // slope = (5*1291 - 10*628) / (5*30 - 100) = 175 / 50
        assert!((trend.slope - 3.5).abs() < 1e-9);
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert!((trend.intercept - 118.6).abs() < 1e-9);
        assert!((trend.predicted_value - 132.6).abs() < 1e-9);
        assert!((trend.change_rate - 105.0).abs() < 1e-9);
        // 1 - 74.7 / 197.2
        assert!((trend.r_squared - 0.621_196_754_563_894_5).abs() < 1e-9);
        // R² scaled by 5/20 stays under 0.6
        assert_eq!(trend.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_flat_series_has_zero_r_squared() {
        let trend = calculate_trend(&[120.0; 6]);
        assert_eq!(trend.slope, 0.0);
        assert_eq!(trend.r_squared, 0.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.predicted_value, 120.0);
    }

    #[test]
    fn test_stable_boundary_is_inclusive() {
        // slope of exactly 0.5
        let trend = calculate_trend(&[100.0, 100.5, 101.0]);
        assert!((trend.slope - 0.5).abs() < 1e-12);
        assert_eq!(trend.direction, TrendDirection::Stable);

        let trend = calculate_trend(&[101.0, 100.0, 99.0]);
        assert_eq!(trend.direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_high_confidence_needs_points_and_fit() {
        let values: Vec<f64> = (0..20).map(|i| 110.0 + i as f64).collect();
        let trend = calculate_trend(&values);
        assert!((trend.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(trend.confidence, ConfidenceLevel::High);

        let short = calculate_trend(&values[..10]);
        // perfect fit but only 10 points -> 0.5
        assert_eq!(short.confidence, ConfidenceLevel::Low);

        let medium = calculate_trend(&values[..14]);
        // 14 / 20 = 0.7
        assert_eq!(medium.confidence, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_value_at_extrapolates() {
        let trend = calculate_trend(&[100.0, 102.0, 104.0]);
        assert!((trend.value_at(2.0) - trend.predicted_value).abs() < 1e-9);
        assert!((trend.value_at(32.0) - (trend.predicted_value + 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_trends_needs_three_readings() {
        let data = vec![reading(2, 120, 80), reading(1, 122, 81)];
        let refs: Vec<&BloodPressureReading> = data.iter().collect();
        let now = data[1].timestamp + Duration::days(1);
        let analysis = analyze_trends(&refs, now);
        assert_eq!(analysis.status, AnalysisStatus::InsufficientData);
        assert!(analysis.systolic.is_none());
        assert!(analysis.heart_rate.is_none());
    }

    #[test]
    fn test_analyze_trends_fits_each_series() {
        let data = vec![reading(4, 120, 80), reading(3, 125, 80), reading(2, 118, 80), reading(1, 130, 80), reading(0, 135, 80)];
        let refs: Vec<&BloodPressureReading> = data.iter().collect();
        let analysis = analyze_trends(&refs, data[4].timestamp);

        assert_eq!(analysis.status, AnalysisStatus::Analyzed);
        let systolic = analysis.systolic.unwrap();
        assert_eq!(systolic.direction, TrendDirection::Increasing);
        assert!((systolic.slope - 3.5).abs() < 1e-9);
        assert_eq!(analysis.diastolic.unwrap().direction, TrendDirection::Stable);
        assert_eq!(analysis.heart_rate.unwrap().r_squared, 0.0);
    }

    #[test]
    fn test_weekly_comparison() {
        let data = vec![reading(10, 120, 78), reading(9, 122, 80), reading(3, 130, 84), reading(1, 132, 86)];
        let refs: Vec<&BloodPressureReading> = data.iter().collect();
        let now = data[3].timestamp + Duration::days(1);
        let weekly = compare_periods(&refs, now, ComparisonPeriod::Week);

        assert_eq!(weekly.status, AnalysisStatus::Analyzed);
        assert_eq!(weekly.current.as_ref().map(|c| c.reading_count), Some(2));
        assert_eq!(weekly.systolic_change, Some(10.0));
        assert_eq!(weekly.diastolic_change, Some(6.0));
    }

    #[test]
    fn test_monthly_comparison_sentinels() {
        let data = vec![reading(3, 130, 84), reading(10, 120, 80)];
        let refs: Vec<&BloodPressureReading> = data.iter().collect();
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();

        let monthly = compare_periods(&refs, now, ComparisonPeriod::Month);
        assert_eq!(monthly.status, AnalysisStatus::InsufficientData);
        assert!(monthly.systolic_change.is_none());

        let empty = compare_periods(&[], now, ComparisonPeriod::Month);
        assert_eq!(empty.status, AnalysisStatus::NoData);
    }
}
