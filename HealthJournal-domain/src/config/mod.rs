//! Analysis configuration
//!
//! Every threshold, weight and physical constant the analysis engine uses lives
//! here with its documented default, and is handed to the engine explicitly.

mod error;

pub use error::ConfigError;

use std::env;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Environment variable overriding [`BodyConfig::height_m`]
pub const HEIGHT_ENV_VAR: &str = "HEALTH_JOURNAL_HEIGHT_M";

/// Environment variable overriding [`AnalysisConfig::utc_offset_minutes`]
pub const UTC_OFFSET_ENV_VAR: &str = "HEALTH_JOURNAL_UTC_OFFSET_MINUTES";

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Top-level configuration for one analysis service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct AnalysisConfig {
    /// Blood pressure threshold bands
    pub bands: RiskBandConfig,
    /// Weights of the overall risk score
    pub risk_weights: RiskWeightConfig,
    /// Overall risk classification settings
    pub risk_scoring: RiskScoringConfig,
    /// Days until the next assessment per risk level
    pub assessment_intervals: AssessmentIntervalConfig,
    /// Lifestyle correlation thresholds
    pub lifestyle: LifestyleConfig,
    /// Body measurements and weight matching
    pub body: BodyConfig,
    /// Medical alert thresholds
    pub alerts: AlertConfig,
    /// Offset of the user's local time from UTC, in minutes
    pub utc_offset_minutes: i32,
}

/// Systolic/diastolic threshold bands (mmHg); a band is reached when either value reaches it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct RiskBandConfig {
    pub crisis_systolic: f64,
    pub crisis_diastolic: f64,
    pub high_systolic: f64,
    pub high_diastolic: f64,
    pub moderate_systolic: f64,
    pub moderate_diastolic: f64,
}

/// Weights combining the four risk sub-scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct RiskWeightConfig {
    pub current: f64,
    pub historical: f64,
    pub progression: f64,
    pub lifestyle: f64,
}

/// Overall risk classification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct RiskScoringConfig {
    /// Weighted score at or above which overall risk is high
    pub high_threshold: f64,
    /// Weighted score at or above which overall risk is moderate
    pub moderate_threshold: f64,
    /// Number of most recent readings forming the "current" batch
    pub current_window_readings: usize,
    /// Minimum readings for a progression estimate
    pub progression_min_readings: usize,
    /// Half-to-half systolic change below which progression is stable (mmHg)
    pub progression_stable_delta: f64,
}

/// Days until the next assessment per risk level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct AssessmentIntervalConfig {
    pub low_days: u32,
    pub moderate_days: u32,
    pub high_days: u32,
    pub critical_days: u32,
}

/// Lifestyle correlation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct LifestyleConfig {
    /// Systolic difference (mmHg) at which smoking impact is significant
    pub smoking_significant_delta: f64,
    /// Smoking-day readings needed (exclusive) for high confidence
    pub smoking_high_confidence_readings: usize,
    /// Drinks per day for the light tier
    pub alcohol_light_drinks: u32,
    /// Drinks per day for the moderate tier
    pub alcohol_moderate_drinks: u32,
    /// Drinks per day for the heavy tier
    pub alcohol_heavy_drinks: u32,
    /// Drinking-day readings needed (exclusive) for high confidence
    pub alcohol_high_confidence_readings: usize,
    /// Combined BP benefit (mmHg) beyond which cardio impact is not neutral
    pub cardio_impact_threshold: f64,
    /// Combined readings needed (exclusive) for medium cardio confidence
    pub cardio_confidence_readings: usize,
    /// Look-back window for the lifestyle risk sub-score
    pub risk_window_days: i64,
}

/// Body measurements and weight matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct BodyConfig {
    /// Height used for BMI, in metres
    pub height_m: f64,
    /// Maximum distance between a reading and its matched weight entry
    pub weight_match_window_days: i64,
    /// Weight change rate (lb/day) at or below which weight is stable
    pub stable_weight_rate: f64,
}

/// Medical alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct AlertConfig {
    /// Only readings this many days before "now" are scanned
    pub lookback_days: i64,
    /// Heart rate above which a warning is raised (bpm)
    pub max_heart_rate: u16,
    /// Heart rate below which a warning is raised (bpm)
    pub min_heart_rate: u16,
}

impl Default for RiskBandConfig {
    fn default() -> Self {
        Self {
            crisis_systolic: 180.0,
            crisis_diastolic: 120.0,
            high_systolic: 140.0,
            high_diastolic: 90.0,
            moderate_systolic: 130.0,
            moderate_diastolic: 80.0,
        }
    }
}

impl Default for RiskWeightConfig {
    fn default() -> Self {
        Self {
            current: 0.4,
            historical: 0.2,
            progression: 0.2,
            lifestyle: 0.2,
        }
    }
}

impl Default for RiskScoringConfig {
    fn default() -> Self {
        Self {
            high_threshold: 3.0,
            moderate_threshold: 2.5,
            current_window_readings: 7,
            progression_min_readings: 10,
            progression_stable_delta: 2.0,
        }
    }
}

impl Default for AssessmentIntervalConfig {
    fn default() -> Self {
        Self {
            low_days: 30,
            moderate_days: 14,
            high_days: 7,
            critical_days: 1,
        }
    }
}

impl Default for LifestyleConfig {
    fn default() -> Self {
        Self {
            smoking_significant_delta: 5.0,
            smoking_high_confidence_readings: 3,
            alcohol_light_drinks: 1,
            alcohol_moderate_drinks: 2,
            alcohol_heavy_drinks: 4,
            alcohol_high_confidence_readings: 2,
            cardio_impact_threshold: 3.0,
            cardio_confidence_readings: 6,
            risk_window_days: 30,
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            height_m: 1.83,
            weight_match_window_days: 7,
            stable_weight_rate: 0.1,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            lookback_days: 3,
            max_heart_rate: 100,
            min_heart_rate: 50,
        }
    }
}

impl AnalysisConfig {
    /// Defaults overlaid with values from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but not valid unicode or not a number,
    /// or if the resulting configuration fails [`AnalysisConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(height) = read_env::<f64>(HEIGHT_ENV_VAR)? {
            config.body.height_m = height;
        }
        if let Some(offset) = read_env::<i32>(UTC_OFFSET_ENV_VAR)? {
            config.utc_offset_minutes = offset;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.risk_weights;
        if [w.current, w.historical, w.progression, w.lifestyle].iter().any(|v| *v < 0.0) {
            return Err(ConfigError::InvalidWeights("risk weights must not be negative"));
        }
        let total = w.current + w.historical + w.progression + w.lifestyle;
        if (total - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidWeights("risk weights must sum to 1.0"));
        }

        let b = &self.bands;
        if !(b.moderate_systolic < b.high_systolic && b.high_systolic < b.crisis_systolic) {
            return Err(ConfigError::InvalidRange("systolic bands must be strictly increasing"));
        }
        if !(b.moderate_diastolic < b.high_diastolic && b.high_diastolic < b.crisis_diastolic) {
            return Err(ConfigError::InvalidRange("diastolic bands must be strictly increasing"));
        }
        if self.risk_scoring.moderate_threshold > self.risk_scoring.high_threshold {
            return Err(ConfigError::InvalidRange("moderate risk threshold exceeds high threshold"));
        }

        let l = &self.lifestyle;
        if !(l.alcohol_light_drinks <= l.alcohol_moderate_drinks && l.alcohol_moderate_drinks <= l.alcohol_heavy_drinks)
            || l.alcohol_light_drinks == 0
        {
            return Err(ConfigError::InvalidRange("alcohol tiers must be positive and non-decreasing"));
        }

        if !(self.body.height_m > 0.0 && self.body.height_m < 3.0) {
            return Err(ConfigError::ValueOutOfRange("height must be between 0 and 3 metres"));
        }
        if self.body.weight_match_window_days < 0 || self.alerts.lookback_days < 0 {
            return Err(ConfigError::ValueOutOfRange("day windows must not be negative"));
        }
        if self.alerts.min_heart_rate >= self.alerts.max_heart_rate {
            return Err(ConfigError::InvalidRange("heart rate alert bounds are inverted"));
        }
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::ValueOutOfRange("UTC offset must be within ±14 hours"));
        }
        Ok(())
    }

    /// The user's local offset; UTC when the configured offset is unrepresentable
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

fn read_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("{key}={raw}: {e}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
