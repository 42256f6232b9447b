//! Categorical risk classification and the weighted overall risk score.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::config::{AnalysisConfig, AssessmentIntervalConfig, LifestyleConfig, RiskBandConfig, RiskScoringConfig};
use crate::entities::blood_pressure::BloodPressureReading;
use crate::entities::input::AnalysisInput;
use crate::entities::report::RiskLevel;
use super::statistics::{mean, safe_ratio, subtract_days};

/// Cigars in the lifestyle window above which smoking scores two points
const HEAVY_SMOKING_CIGARS: u32 = 10;

/// Average weekly drinks above which drinking scores two points
const HEAVY_WEEKLY_DRINKS: f64 = 14.0;

/// Average weekly drinks above which drinking scores one point
const MODERATE_WEEKLY_DRINKS: f64 = 7.0;

/// Direction of systolic pressure between the older and newer half of history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ProgressionTrend {
    Stable,
    Increasing,
    Decreasing,
    InsufficientData,
}

impl ProgressionTrend {
    /// Ordinal used by the weighted overall score; only a rising history adds risk
    pub const fn ordinal(self) -> f64 {
        match self {
            Self::Increasing => RiskLevel::Moderate.ordinal(),
            Self::Stable | Self::Decreasing | Self::InsufficientData => RiskLevel::Low.ordinal(),
        }
    }
}

/// When the user should be assessed again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct NextAssessment {
    pub days: u32,
    pub date: DateTime<Utc>,
    pub reason: String,
}

/// Combined risk picture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RiskAssessment {
    /// Risk of the most recent readings
    pub current: RiskLevel,
    /// Risk of the whole history
    pub historical: RiskLevel,
    pub progression: ProgressionTrend,
    /// Risk from logged smoking and drinking
    pub lifestyle: RiskLevel,
    pub overall: RiskLevel,
    /// Weighted ordinal score behind `overall`
    pub risk_score: f64,
    pub next_assessment: NextAssessment,
}

/// Classify a mean systolic/diastolic pair against the configured bands
pub fn classify_means(systolic: f64, diastolic: f64, bands: &RiskBandConfig) -> RiskLevel {
    if systolic >= bands.crisis_systolic || diastolic >= bands.crisis_diastolic {
        RiskLevel::Critical
    } else if systolic >= bands.high_systolic || diastolic >= bands.high_diastolic {
        RiskLevel::High
    } else if systolic >= bands.moderate_systolic || diastolic >= bands.moderate_diastolic {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Classify a batch of readings by its mean; an empty batch is unknown
pub fn classify_readings(readings: &[&BloodPressureReading], bands: &RiskBandConfig) -> RiskLevel {
    if readings.is_empty() {
        return RiskLevel::Unknown;
    }
    let systolic: Vec<f64> = readings.iter().map(|r| f64::from(r.systolic)).collect();
    let diastolic: Vec<f64> = readings.iter().map(|r| f64::from(r.diastolic)).collect();
    classify_means(mean(&systolic), mean(&diastolic), bands)
}

/// Compare mean systolic of the older half of history against the newer half
///
/// `chronological` must be sorted oldest first.
pub fn assess_progression(chronological: &[&BloodPressureReading], scoring: &RiskScoringConfig) -> ProgressionTrend {
    if chronological.len() < scoring.progression_min_readings {
        return ProgressionTrend::InsufficientData;
    }
    let (older, newer) = chronological.split_at(chronological.len() / 2);
    let older: Vec<f64> = older.iter().map(|r| f64::from(r.systolic)).collect();
    let newer: Vec<f64> = newer.iter().map(|r| f64::from(r.systolic)).collect();
    let change = mean(&newer) - mean(&older);

    if change.abs() < scoring.progression_stable_delta {
        ProgressionTrend::Stable
    } else if change > 0.0 {
        ProgressionTrend::Increasing
    } else {
        ProgressionTrend::Decreasing
    }
}

/// Score recent smoking and drinking volume
///
/// Unknown when neither cigars nor drinks were ever logged.
pub fn assess_lifestyle_risk(input: &AnalysisInput, now: DateTime<Utc>, lifestyle: &LifestyleConfig) -> RiskLevel {
    if input.cigar_entries.is_empty() && input.drink_entries.is_empty() {
        return RiskLevel::Unknown;
    }
    let cutoff = subtract_days(now, lifestyle.risk_window_days);

    let cigars: u32 = input
        .cigar_entries
        .iter()
        .filter(|entry| entry.timestamp >= cutoff && entry.timestamp <= now)
        .map(|entry| entry.count)
        .sum();
    let drinks: u32 = input
        .drink_entries
        .iter()
        .filter(|entry| entry.timestamp >= cutoff && entry.timestamp <= now)
        .map(|entry| entry.count)
        .sum();
    let weekly_drinks = safe_ratio(f64::from(drinks), lifestyle.risk_window_days as f64 / 7.0);

    let mut points = 0;
    if cigars > HEAVY_SMOKING_CIGARS {
        points += 2;
    } else if cigars > 0 {
        points += 1;
    }
    if weekly_drinks > HEAVY_WEEKLY_DRINKS {
        points += 2;
    } else if weekly_drinks > MODERATE_WEEKLY_DRINKS {
        points += 1;
    }

    debug!(cigars, weekly_drinks, points, "Scored lifestyle risk");
    match points {
        p if p >= 3 => RiskLevel::High,
        2 => RiskLevel::Moderate,
        _ => RiskLevel::Low,
    }
}

/// Weighted combination of the four sub-scores
pub fn overall_risk(
    current: RiskLevel,
    historical: RiskLevel,
    progression: ProgressionTrend,
    lifestyle: RiskLevel,
    config: &AnalysisConfig,
) -> (RiskLevel, f64) {
    let weights = &config.risk_weights;
    let score = current.ordinal() * weights.current
        + historical.ordinal() * weights.historical
        + progression.ordinal() * weights.progression
        + lifestyle.ordinal() * weights.lifestyle;

    let level = if score >= config.risk_scoring.high_threshold {
        RiskLevel::High
    } else if score >= config.risk_scoring.moderate_threshold {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };
    (level, score)
}

/// Schedule the next assessment for a risk level
pub fn next_assessment(level: RiskLevel, now: DateTime<Utc>, intervals: &AssessmentIntervalConfig) -> NextAssessment {
    let (days, reason) = match level {
        RiskLevel::Critical => (
            intervals.critical_days,
            "Readings are in the hypertensive crisis range; seek medical attention and re-check tomorrow",
        ),
        RiskLevel::High => (intervals.high_days, "High blood pressure risk requires weekly follow-up"),
        RiskLevel::Moderate => (intervals.moderate_days, "Moderate risk; review your readings every two weeks"),
        RiskLevel::Low | RiskLevel::Unknown => (intervals.low_days, "Routine monthly review"),
    };
    NextAssessment {
        days,
        date: now + Duration::days(i64::from(days)),
        reason: reason.to_string(),
    }
}

/// Full risk assessment over chronologically sorted readings
pub fn assess_risk(
    chronological: &[&BloodPressureReading],
    input: &AnalysisInput,
    now: DateTime<Utc>,
    config: &AnalysisConfig,
) -> RiskAssessment {
    let window = config.risk_scoring.current_window_readings.min(chronological.len());
    let recent = &chronological[chronological.len() - window..];

    let current = classify_readings(recent, &config.bands);
    let historical = classify_readings(chronological, &config.bands);
    let progression = assess_progression(chronological, &config.risk_scoring);
    let lifestyle = assess_lifestyle_risk(input, now, &config.lifestyle);
    let (overall, risk_score) = overall_risk(current, historical, progression, lifestyle, config);

    debug!(?current, ?historical, ?progression, ?lifestyle, ?overall, risk_score, "Assessed risk");

    RiskAssessment {
        current,
        historical,
        progression,
        lifestyle,
        overall,
        risk_score,
        next_assessment: next_assessment(overall.more_urgent(current), now, &config.assessment_intervals),
    }
}
