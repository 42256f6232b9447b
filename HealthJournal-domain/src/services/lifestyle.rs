//! Lifestyle correlation: how blood pressure differs on days with and without
//! smoking, drinking or cardio.
//!
//! Readings are bucketed by the local calendar day they were taken on. A day is
//! "exposed" when the relevant lifestyle entry was logged on the same day.
//! Whenever either bucket is empty the analysis reports a sentinel status
//! instead of numbers.

use std::collections::{HashMap, HashSet};

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::config::{AnalysisConfig, LifestyleConfig, RiskBandConfig};
use crate::entities::blood_pressure::BloodPressureReading;
use crate::entities::input::AnalysisInput;
use crate::entities::lifestyle::{CardioEntry, CigarEntry, DrinkEntry};
use crate::entities::report::{AnalysisStatus, ConfidenceLevel};
use super::statistics::{local_date, mean, safe_ratio};
use super::weight::{analyze_weight, WeightCorrelation};

/// Mean blood pressure over a bucket of readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BpAverage {
    pub systolic: f64,
    pub diastolic: f64,
    pub reading_count: usize,
}

impl BpAverage {
    /// Mean of the bucket, or `None` when it is empty
    pub fn from_readings(readings: &[&BloodPressureReading]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }
        let systolic: Vec<f64> = readings.iter().map(|r| f64::from(r.systolic)).collect();
        let diastolic: Vec<f64> = readings.iter().map(|r| f64::from(r.diastolic)).collect();
        Some(Self {
            systolic: mean(&systolic),
            diastolic: mean(&diastolic),
            reading_count: readings.len(),
        })
    }
}

/// Magnitude of a lifestyle factor's effect on blood pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Significant,
    Moderate,
    Minimal,
}

/// Smoking-day vs smoke-free-day comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SmokingCorrelation {
    pub status: AnalysisStatus,
    /// Distinct days with at least one cigar
    pub smoking_day_count: usize,
    pub smoking_days: Option<BpAverage>,
    pub non_smoking_days: Option<BpAverage>,
    /// Smoking-day mean minus smoke-free-day mean
    pub systolic_difference: Option<f64>,
    pub diastolic_difference: Option<f64>,
    pub impact: Option<ImpactLevel>,
    pub confidence: Option<ConfidenceLevel>,
}

/// Daily drink thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlcoholTier {
    Light,
    Moderate,
    Heavy,
}

/// Comparison of days at or above one drink tier against all other days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AlcoholTierCorrelation {
    pub tier: AlcoholTier,
    /// Drinks per day at which a day belongs to this tier
    pub min_drinks: u32,
    pub status: AnalysisStatus,
    /// Distinct days at or above the tier
    pub drinking_day_count: usize,
    pub drinking_days: Option<BpAverage>,
    pub other_days: Option<BpAverage>,
    /// Drinking-day mean minus other-day mean
    pub systolic_difference: Option<f64>,
    pub diastolic_difference: Option<f64>,
    /// Judged on the absolute drinking-day mean
    pub impact: Option<ImpactLevel>,
    pub confidence: Option<ConfidenceLevel>,
}

/// Alcohol impact per drinking tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AlcoholCorrelation {
    pub status: AnalysisStatus,
    pub light: AlcoholTierCorrelation,
    pub moderate: AlcoholTierCorrelation,
    pub heavy: AlcoholTierCorrelation,
}

/// Direction of the cardio effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CardioImpact {
    Beneficial,
    Neutral,
    PotentiallyNegative,
}

/// Cardio-day vs rest-day comparison; positive benefit means lower pressure on cardio days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CardioCorrelation {
    pub status: AnalysisStatus,
    pub cardio_day_count: usize,
    pub cardio_days: Option<BpAverage>,
    pub non_cardio_days: Option<BpAverage>,
    /// Rest-day mean minus cardio-day mean
    pub systolic_benefit: Option<f64>,
    pub diastolic_benefit: Option<f64>,
    /// Average of the systolic and diastolic benefit
    pub combined_benefit: Option<f64>,
    pub impact: Option<CardioImpact>,
    pub confidence: Option<ConfidenceLevel>,
    pub total_minutes: u32,
    pub avg_minutes_per_cardio_day: f64,
}

/// Every lifestyle dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LifestyleCorrelation {
    pub smoking: SmokingCorrelation,
    pub alcohol: AlcoholCorrelation,
    pub cardio: CardioCorrelation,
    pub weight: WeightCorrelation,
}

/// Run all lifestyle analyses against the same reading batch
pub fn analyze_lifestyle(
    readings: &[&BloodPressureReading],
    input: &AnalysisInput,
    config: &AnalysisConfig,
) -> LifestyleCorrelation {
    let offset = config.local_offset();
    LifestyleCorrelation {
        smoking: analyze_smoking(readings, &input.cigar_entries, &config.lifestyle, offset),
        alcohol: analyze_alcohol(readings, &input.drink_entries, config, offset),
        cardio: analyze_cardio(readings, &input.cardio_entries, &config.lifestyle, offset),
        weight: analyze_weight(readings, &input.weight_entries, config),
    }
}

/// Readings taken on an exposed day, and the rest
fn partition_by_day<'a>(
    readings: &[&'a BloodPressureReading],
    exposed_days: &HashSet<NaiveDate>,
    offset: FixedOffset,
) -> (Vec<&'a BloodPressureReading>, Vec<&'a BloodPressureReading>) {
    readings
        .iter()
        .partition(|reading| exposed_days.contains(&local_date(reading.timestamp, offset)))
}

/// Compare smoking days against smoke-free days
pub fn analyze_smoking(
    readings: &[&BloodPressureReading],
    entries: &[CigarEntry],
    lifestyle: &LifestyleConfig,
    offset: FixedOffset,
) -> SmokingCorrelation {
    let smoking_days: HashSet<NaiveDate> = entries
        .iter()
        .filter(|entry| entry.count > 0)
        .map(|entry| local_date(entry.timestamp, offset))
        .collect();

    let mut result = SmokingCorrelation {
        status: AnalysisStatus::NoData,
        smoking_day_count: smoking_days.len(),
        smoking_days: None,
        non_smoking_days: None,
        systolic_difference: None,
        diastolic_difference: None,
        impact: None,
        confidence: None,
    };
    if smoking_days.is_empty() {
        return result;
    }

    let (exposed, unexposed) = partition_by_day(readings, &smoking_days, offset);
    let (Some(smoking), Some(non_smoking)) = (BpAverage::from_readings(&exposed), BpAverage::from_readings(&unexposed))
    else {
        result.status = AnalysisStatus::InsufficientData;
        return result;
    };

    let systolic_difference = smoking.systolic - non_smoking.systolic;
    let diastolic_difference = smoking.diastolic - non_smoking.diastolic;
    result.status = AnalysisStatus::Analyzed;
    result.impact = Some(if systolic_difference.abs() >= lifestyle.smoking_significant_delta {
        ImpactLevel::Significant
    } else {
        ImpactLevel::Moderate
    });
    result.confidence = Some(if smoking.reading_count > lifestyle.smoking_high_confidence_readings {
        ConfidenceLevel::High
    } else {
        ConfidenceLevel::Medium
    });
    result.systolic_difference = Some(systolic_difference);
    result.diastolic_difference = Some(diastolic_difference);
    result.smoking_days = Some(smoking);
    result.non_smoking_days = Some(non_smoking);

    debug!(systolic_difference, impact = ?result.impact, "Analyzed smoking correlation");
    result
}

/// Compare drinking days against other days for every tier
pub fn analyze_alcohol(
    readings: &[&BloodPressureReading],
    entries: &[DrinkEntry],
    config: &AnalysisConfig,
    offset: FixedOffset,
) -> AlcoholCorrelation {
    let mut drinks_per_day: HashMap<NaiveDate, u32> = HashMap::new();
    for entry in entries {
        *drinks_per_day.entry(local_date(entry.timestamp, offset)).or_insert(0) += entry.count;
    }

    let lifestyle = &config.lifestyle;
    let tier = |tier, min_drinks| analyze_alcohol_tier(readings, &drinks_per_day, tier, min_drinks, config, offset);
    let light = tier(AlcoholTier::Light, lifestyle.alcohol_light_drinks);
    let moderate = tier(AlcoholTier::Moderate, lifestyle.alcohol_moderate_drinks);
    let heavy = tier(AlcoholTier::Heavy, lifestyle.alcohol_heavy_drinks);

    let status = if entries.is_empty() {
        AnalysisStatus::NoData
    } else if [&light, &moderate, &heavy].iter().any(|t| t.status == AnalysisStatus::Analyzed) {
        AnalysisStatus::Analyzed
    } else {
        AnalysisStatus::InsufficientData
    };

    AlcoholCorrelation {
        status,
        light,
        moderate,
        heavy,
    }
}

fn analyze_alcohol_tier(
    readings: &[&BloodPressureReading],
    drinks_per_day: &HashMap<NaiveDate, u32>,
    tier: AlcoholTier,
    min_drinks: u32,
    config: &AnalysisConfig,
    offset: FixedOffset,
) -> AlcoholTierCorrelation {
    let drinking_days: HashSet<NaiveDate> = drinks_per_day
        .iter()
        .filter(|(_, drinks)| **drinks >= min_drinks)
        .map(|(day, _)| *day)
        .collect();

    let mut result = AlcoholTierCorrelation {
        tier,
        min_drinks,
        status: AnalysisStatus::NoData,
        drinking_day_count: drinking_days.len(),
        drinking_days: None,
        other_days: None,
        systolic_difference: None,
        diastolic_difference: None,
        impact: None,
        confidence: None,
    };
    if drinking_days.is_empty() {
        return result;
    }

    let (exposed, unexposed) = partition_by_day(readings, &drinking_days, offset);
    let (Some(drinking), Some(other)) = (BpAverage::from_readings(&exposed), BpAverage::from_readings(&unexposed))
    else {
        result.status = AnalysisStatus::InsufficientData;
        return result;
    };

    result.status = AnalysisStatus::Analyzed;
    result.systolic_difference = Some(drinking.systolic - other.systolic);
    result.diastolic_difference = Some(drinking.diastolic - other.diastolic);
    result.impact = Some(alcohol_impact(&drinking, &config.bands));
    result.confidence = Some(if drinking.reading_count > config.lifestyle.alcohol_high_confidence_readings {
        ConfidenceLevel::High
    } else {
        ConfidenceLevel::Low
    });
    result.drinking_days = Some(drinking);
    result.other_days = Some(other);
    result
}

fn alcohol_impact(drinking: &BpAverage, bands: &RiskBandConfig) -> ImpactLevel {
    if drinking.systolic >= bands.high_systolic || drinking.diastolic >= bands.high_diastolic {
        ImpactLevel::Significant
    } else if drinking.systolic >= bands.moderate_systolic || drinking.diastolic >= bands.moderate_diastolic {
        ImpactLevel::Moderate
    } else {
        ImpactLevel::Minimal
    }
}

/// Compare rest days against cardio days
pub fn analyze_cardio(
    readings: &[&BloodPressureReading],
    entries: &[CardioEntry],
    lifestyle: &LifestyleConfig,
    offset: FixedOffset,
) -> CardioCorrelation {
    let cardio_days: HashSet<NaiveDate> = entries
        .iter()
        .filter(|entry| entry.minutes > 0)
        .map(|entry| local_date(entry.timestamp, offset))
        .collect();
    let total_minutes: u32 = entries.iter().map(|entry| entry.minutes).sum();

    let mut result = CardioCorrelation {
        status: AnalysisStatus::NoData,
        cardio_day_count: cardio_days.len(),
        cardio_days: None,
        non_cardio_days: None,
        systolic_benefit: None,
        diastolic_benefit: None,
        combined_benefit: None,
        impact: None,
        confidence: None,
        total_minutes,
        avg_minutes_per_cardio_day: safe_ratio(f64::from(total_minutes), cardio_days.len() as f64),
    };
    if cardio_days.is_empty() {
        return result;
    }

    let (exposed, unexposed) = partition_by_day(readings, &cardio_days, offset);
    let (Some(cardio), Some(rest)) = (BpAverage::from_readings(&exposed), BpAverage::from_readings(&unexposed))
    else {
        result.status = AnalysisStatus::InsufficientData;
        return result;
    };

    let systolic_benefit = rest.systolic - cardio.systolic;
    let diastolic_benefit = rest.diastolic - cardio.diastolic;
    let combined_benefit = (systolic_benefit + diastolic_benefit) / 2.0;

    result.status = AnalysisStatus::Analyzed;
    result.impact = Some(if combined_benefit > lifestyle.cardio_impact_threshold {
        CardioImpact::Beneficial
    } else if combined_benefit < -lifestyle.cardio_impact_threshold {
        CardioImpact::PotentiallyNegative
    } else {
        CardioImpact::Neutral
    });
    result.confidence = Some(if cardio.reading_count + rest.reading_count > lifestyle.cardio_confidence_readings {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    });
    result.systolic_benefit = Some(systolic_benefit);
    result.diastolic_benefit = Some(diastolic_benefit);
    result.combined_benefit = Some(combined_benefit);
    result.cardio_days = Some(cardio);
    result.non_cardio_days = Some(rest);

    debug!(combined_benefit, impact = ?result.impact, "Analyzed cardio correlation");
    result
}
