//! Short- and long-term blood pressure projections from the fitted trend.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::blood_pressure::BloodPressureReading;
use crate::entities::report::{AnalysisStatus, ConfidenceLevel, TrendDirection};
use super::trend::calculate_trend;

/// Readings needed before any prediction is attempted
pub const MIN_PREDICTION_READINGS: usize = 10;

/// Most recent readings used for the short-term outlook
pub const SHORT_TERM_WINDOW: usize = 7;

const MIN_SHORT_TERM_READINGS: usize = 3;

pub const MIN_LONG_TERM_READINGS: usize = 15;

/// Index steps beyond the series end for the long-term projection
pub const LONG_TERM_HORIZON: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PredictedValue {
    pub value: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ShortTermPrediction {
    pub status: AnalysisStatus,
    pub readings_used: usize,
    pub systolic: Option<PredictedValue>,
    pub diastolic: Option<PredictedValue>,
    /// Heuristic weight, not a probability
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LongTermProjection {
    pub status: AnalysisStatus,
    pub horizon_steps: usize,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    /// Mean R² of the two fits
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PredictiveInsights {
    pub status: AnalysisStatus,
    pub short_term: ShortTermPrediction,
    pub long_term: LongTermProjection,
}

fn systolic_series(readings: &[&BloodPressureReading]) -> Vec<f64> {
    readings.iter().map(|r| f64::from(r.systolic)).collect()
}

fn diastolic_series(readings: &[&BloodPressureReading]) -> Vec<f64> {
    readings.iter().map(|r| f64::from(r.diastolic)).collect()
}

/// Outlook from the last seven readings
pub fn short_term_prediction(chronological: &[&BloodPressureReading]) -> ShortTermPrediction {
    let start = chronological.len().saturating_sub(SHORT_TERM_WINDOW);
    let recent = &chronological[start..];
    if recent.len() < MIN_SHORT_TERM_READINGS {
        return ShortTermPrediction {
            status: AnalysisStatus::InsufficientData,
            readings_used: recent.len(),
            systolic: None,
            diastolic: None,
            confidence: 0.0,
        };
    }

    let systolic = calculate_trend(&systolic_series(recent));
    let diastolic = calculate_trend(&diastolic_series(recent));
    let confidence: f64 = if systolic.confidence == ConfidenceLevel::High { 0.8 } else { 0.6 };

    ShortTermPrediction {
        status: AnalysisStatus::Analyzed,
        readings_used: recent.len(),
        systolic: Some(PredictedValue {
            value: systolic.predicted_value,
            direction: systolic.direction,
        }),
        diastolic: Some(PredictedValue {
            value: diastolic.predicted_value,
            direction: diastolic.direction,
        }),
        confidence: confidence.min(1.0),
    }
}

/// Linear extrapolation of the whole history thirty steps ahead
pub fn long_term_projection(chronological: &[&BloodPressureReading]) -> LongTermProjection {
    if chronological.len() < MIN_LONG_TERM_READINGS {
        return LongTermProjection {
            status: AnalysisStatus::InsufficientData,
            horizon_steps: LONG_TERM_HORIZON,
            systolic: None,
            diastolic: None,
            confidence: 0.0,
        };
    }

    let target = (chronological.len() + LONG_TERM_HORIZON) as f64;
    let systolic = calculate_trend(&systolic_series(chronological));
    let diastolic = calculate_trend(&diastolic_series(chronological));

    LongTermProjection {
        status: AnalysisStatus::Analyzed,
        horizon_steps: LONG_TERM_HORIZON,
        systolic: Some(systolic.value_at(target)),
        diastolic: Some(diastolic.value_at(target)),
        confidence: ((systolic.r_squared + diastolic.r_squared) / 2.0).min(1.0),
    }
}

pub fn predict(chronological: &[&BloodPressureReading]) -> PredictiveInsights {
    if chronological.len() < MIN_PREDICTION_READINGS {
        debug!(readings = chronological.len(), "Too few readings for predictions");
        return PredictiveInsights {
            status: AnalysisStatus::InsufficientData,
            short_term: ShortTermPrediction {
                status: AnalysisStatus::InsufficientData,
                readings_used: 0,
                systolic: None,
                diastolic: None,
                confidence: 0.0,
            },
            long_term: LongTermProjection {
                status: AnalysisStatus::InsufficientData,
                horizon_steps: LONG_TERM_HORIZON,
                systolic: None,
                diastolic: None,
                confidence: 0.0,
            },
        };
    }

    PredictiveInsights {
        status: AnalysisStatus::Analyzed,
        short_term: short_term_prediction(chronological),
        long_term: long_term_projection(chronological),
    }
}
