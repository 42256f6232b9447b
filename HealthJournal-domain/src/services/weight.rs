//! Weight and blood pressure: trend, correlation, BMI and sensitivity.
//!
//! Unlike the other lifestyle factors, weight is matched per reading: every
//! reading is paired with the nearest weight entry inside the configured
//! window and unmatched readings are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::config::{AnalysisConfig, BodyConfig};
use crate::entities::blood_pressure::BloodPressureReading;
use crate::entities::lifestyle::WeightEntry;
use crate::entities::report::{AnalysisStatus, ConfidenceLevel, TrendDirection};
use super::statistics::{days_between, mean, pearson_correlation, safe_ratio};

pub const KG_PER_LB: f64 = 0.453_592;

/// Readings needed before a correlation is computed
const MIN_MATCHED_READINGS: usize = 3;

/// Weigh-ins needed before correlating weight with pressure
const MIN_WEIGHT_ENTRIES: usize = 2;

/// |r| above which the correlation drives a recommendation
const NOTABLE_CORRELATION: f64 = 0.5;

/// Weight change over the logged period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct WeightTrend {
    pub status: AnalysisStatus,
    pub direction: Option<TrendDirection>,
    /// Pounds per day
    pub change_rate: f64,
    /// Pounds, last entry minus first
    pub total_change: f64,
    pub days_tracked: f64,
}

/// Qualitative strength of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    Negligible,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        match r.abs() {
            r if r >= 0.7 => Self::Strong,
            r if r >= 0.4 => Self::Moderate,
            r if r >= 0.2 => Self::Weak,
            _ => Self::Negligible,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    SeverelyUnderweight,
    Underweight,
    Normal,
    Overweight,
    ObeseClassI,
    ObeseClassII,
    ObeseClassIII,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        match bmi {
            b if b < 16.5 => Self::SeverelyUnderweight,
            b if b < 18.5 => Self::Underweight,
            b if b < 25.0 => Self::Normal,
            b if b < 30.0 => Self::Overweight,
            b if b < 35.0 => Self::ObeseClassI,
            b if b < 40.0 => Self::ObeseClassII,
            _ => Self::ObeseClassIII,
        }
    }

    fn base_risk(self) -> HealthRisk {
        match self {
            Self::Normal => HealthRisk::Low,
            Self::Underweight | Self::Overweight => HealthRisk::Moderate,
            Self::SeverelyUnderweight | Self::ObeseClassI => HealthRisk::High,
            Self::ObeseClassII | Self::ObeseClassIII => HealthRisk::VeryHigh,
        }
    }

    fn is_underweight(self) -> bool {
        matches!(self, Self::SeverelyUnderweight | Self::Underweight)
    }

    fn is_overweight(self) -> bool {
        !self.is_underweight() && self != Self::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum HealthRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl HealthRisk {
    fn step_up(self) -> Self {
        match self {
            Self::Low => Self::Moderate,
            Self::Moderate => Self::High,
            Self::High | Self::VeryHigh => Self::VeryHigh,
        }
    }

    fn step_down(self) -> Self {
        match self {
            Self::Low | Self::Moderate => Self::Low,
            Self::High => Self::Moderate,
            Self::VeryHigh => Self::High,
        }
    }
}

/// Mean blood pressure change per kilogram between adjacent weight buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct WeightSensitivity {
    pub systolic_per_kg: f64,
    pub diastolic_per_kg: f64,
    /// Distinct whole-kilogram buckets among matched readings
    pub weight_buckets: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct WeightCorrelation {
    pub status: AnalysisStatus,
    pub matched_readings: usize,
    pub weight_trend: WeightTrend,
    pub systolic_correlation: f64,
    pub diastolic_correlation: f64,
    /// Mean of the systolic and diastolic coefficients
    pub correlation: f64,
    pub strength: CorrelationStrength,
    /// Most recent weight in pounds
    pub latest_weight: Option<f64>,
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub health_risk: Option<HealthRisk>,
    pub sensitivity: WeightSensitivity,
    pub confidence: ConfidenceLevel,
    pub recommendations: Vec<String>,
}

pub fn bmi(weight_lb: f64, height_m: f64) -> f64 {
    safe_ratio(weight_lb * KG_PER_LB, height_m * height_m)
}

/// Weight trend from the first to the last entry
pub fn weight_trend(entries: &[&WeightEntry], body: &BodyConfig) -> WeightTrend {
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return insufficient_trend();
    };
    if entries.len() < 2 {
        return insufficient_trend();
    }

    let total_change = last.weight - first.weight;
    let days_tracked = days_between(first.timestamp, last.timestamp);
    let change_rate = safe_ratio(total_change, days_tracked);
    let direction = if change_rate.abs() <= body.stable_weight_rate {
        TrendDirection::Stable
    } else if change_rate > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    WeightTrend {
        status: AnalysisStatus::Analyzed,
        direction: Some(direction),
        change_rate,
        total_change,
        days_tracked,
    }
}

fn insufficient_trend() -> WeightTrend {
    WeightTrend {
        status: AnalysisStatus::InsufficientData,
        direction: None,
        change_rate: 0.0,
        total_change: 0.0,
        days_tracked: 0.0,
    }
}

/// BMI risk moved one step by the weight trend
///
/// Gaining weight raises the risk above the normal band and lowers it below;
/// losing weight does the opposite.
pub fn health_risk(category: BmiCategory, direction: Option<TrendDirection>) -> HealthRisk {
    let base = category.base_risk();
    match direction {
        Some(TrendDirection::Increasing) if category.is_overweight() => base.step_up(),
        Some(TrendDirection::Increasing) if category.is_underweight() => base.step_down(),
        Some(TrendDirection::Decreasing) if category.is_overweight() => base.step_down(),
        Some(TrendDirection::Decreasing) if category.is_underweight() => base.step_up(),
        _ => base,
    }
}

/// Pair every reading with the nearest weight entry inside the match window
fn match_readings<'a>(
    readings: &[&'a BloodPressureReading],
    entries: &[&WeightEntry],
    body: &BodyConfig,
) -> Vec<(&'a BloodPressureReading, f64)> {
    let window_seconds = body.weight_match_window_days * 86_400;
    readings
        .iter()
        .filter_map(|reading| {
            entries
                .iter()
                .map(|entry| (entry, (reading.timestamp - entry.timestamp).num_seconds().abs()))
                .filter(|(_, distance)| *distance <= window_seconds)
                .min_by_key(|(_, distance)| *distance)
                .map(|(entry, _)| (*reading, entry.weight))
        })
        .collect()
}

/// Average adjacent-bucket slope of mean pressure against whole kilograms
pub fn weight_sensitivity(matched: &[(&BloodPressureReading, f64)]) -> WeightSensitivity {
    let mut buckets: BTreeMap<i64, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for (reading, weight_lb) in matched {
        let kg = (weight_lb * KG_PER_LB).round() as i64;
        let bucket = buckets.entry(kg).or_default();
        bucket.0.push(f64::from(reading.systolic));
        bucket.1.push(f64::from(reading.diastolic));
    }

    let means: Vec<(f64, f64, f64)> = buckets
        .iter()
        .map(|(kg, (systolic, diastolic))| (*kg as f64, mean(systolic), mean(diastolic)))
        .collect();
    let (systolic_slopes, diastolic_slopes): (Vec<f64>, Vec<f64>) = means
        .windows(2)
        .map(|pair| {
            let (kg_a, sys_a, dia_a) = pair[0];
            let (kg_b, sys_b, dia_b) = pair[1];
            let kg_delta = kg_b - kg_a;
            (safe_ratio(sys_b - sys_a, kg_delta), safe_ratio(dia_b - dia_a, kg_delta))
        })
        .unzip();

    WeightSensitivity {
        systolic_per_kg: mean(&systolic_slopes),
        diastolic_per_kg: mean(&diastolic_slopes),
        weight_buckets: buckets.len(),
    }
}

fn correlation_confidence(matched: usize) -> ConfidenceLevel {
    if matched >= 20 {
        ConfidenceLevel::High
    } else if matched >= 10 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

fn recommendations(correlation: &WeightCorrelation) -> Vec<String> {
    let mut recs = Vec::new();

    if correlation.status == AnalysisStatus::Analyzed {
        if correlation.correlation > NOTABLE_CORRELATION {
            recs.push(
                "Your blood pressure tends to rise with your weight. Weight management is likely to help your readings."
                    .to_string(),
            );
        } else if correlation.correlation < -NOTABLE_CORRELATION {
            recs.push(
                "Your blood pressure moves opposite to your weight. Discuss this pattern with your doctor.".to_string(),
            );
        }
    }

    match correlation.bmi_category {
        Some(category) if category >= BmiCategory::ObeseClassI => recs.push(
            "Your BMI is in the obese range. A structured weight-loss plan can lower blood pressure considerably."
                .to_string(),
        ),
        Some(BmiCategory::Overweight) => recs.push(
            "Your BMI is in the overweight range. Losing even a few pounds often lowers blood pressure.".to_string(),
        ),
        Some(category) if category.is_underweight() => recs.push(
            "Your BMI is below the healthy range. Talk to a clinician about nutrition.".to_string(),
        ),
        _ => {}
    }

    let overweight = correlation.bmi_category.is_some_and(BmiCategory::is_overweight);
    match correlation.weight_trend.direction {
        Some(TrendDirection::Increasing) if overweight => recs.push(
            "Your weight is trending upward. Watch portion sizes and stay active.".to_string(),
        ),
        Some(TrendDirection::Decreasing) if overweight => recs.push(
            "Your weight is trending down. Keep up the good work.".to_string(),
        ),
        _ => {}
    }

    recs
}

/// Analyze weight against the reading batch
pub fn analyze_weight(
    readings: &[&BloodPressureReading],
    entries: &[WeightEntry],
    config: &AnalysisConfig,
) -> WeightCorrelation {
    let body = &config.body;
    let mut sorted: Vec<&WeightEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.timestamp);

    let trend = weight_trend(&sorted, body);
    let latest_weight = sorted.last().map(|entry| entry.weight);
    let bmi_value = latest_weight.map(|weight| bmi(weight, body.height_m));
    let bmi_category = bmi_value.map(BmiCategory::from_bmi);
    let risk = bmi_category.map(|category| health_risk(category, trend.direction));

    let matched = match_readings(readings, &sorted, body);

    let mut result = WeightCorrelation {
        status: AnalysisStatus::NoData,
        matched_readings: matched.len(),
        weight_trend: trend,
        systolic_correlation: 0.0,
        diastolic_correlation: 0.0,
        correlation: 0.0,
        strength: CorrelationStrength::Negligible,
        latest_weight,
        bmi: bmi_value,
        bmi_category,
        health_risk: risk,
        sensitivity: WeightSensitivity {
            systolic_per_kg: 0.0,
            diastolic_per_kg: 0.0,
            weight_buckets: 0,
        },
        confidence: ConfidenceLevel::Low,
        recommendations: Vec::new(),
    };

    if sorted.is_empty() {
        return result;
    }

    if sorted.len() < MIN_WEIGHT_ENTRIES || matched.len() < MIN_MATCHED_READINGS {
        result.status = AnalysisStatus::InsufficientData;
    } else {
        let weights: Vec<f64> = matched.iter().map(|(_, weight)| *weight).collect();
        let systolic: Vec<f64> = matched.iter().map(|(r, _)| f64::from(r.systolic)).collect();
        let diastolic: Vec<f64> = matched.iter().map(|(r, _)| f64::from(r.diastolic)).collect();

        result.status = AnalysisStatus::Analyzed;
        result.systolic_correlation = pearson_correlation(&systolic, &weights);
        result.diastolic_correlation = pearson_correlation(&diastolic, &weights);
        result.correlation = (result.systolic_correlation + result.diastolic_correlation) / 2.0;
        result.strength = CorrelationStrength::from_coefficient(result.correlation);
        result.sensitivity = weight_sensitivity(&matched);
        result.confidence = correlation_confidence(matched.len());
    }
    result.recommendations = recommendations(&result);

    debug!(
        matched = result.matched_readings,
        correlation = result.correlation,
        bmi = ?result.bmi,
        "Analyzed weight correlation"
    );
    result
}
