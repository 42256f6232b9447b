use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::services::alerts::MedicalAlert;
use crate::services::circadian::CircadianAnalysis;
use crate::services::lifestyle::LifestyleCorrelation;
use crate::services::predictive::PredictiveInsights;
use crate::services::recommendations::Recommendation;
use crate::services::risk::RiskAssessment;
use crate::services::summary::{DataQuality, ReadingSummary};
use crate::services::trend::TrendAnalysis;

/// Whether a sub-analysis produced numbers, and if not, why
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Enough data; numeric fields are populated
    Analyzed,
    /// Nothing of this kind was logged
    NoData,
    /// Some data, but not enough for a comparison
    InsufficientData,
}

/// Qualitative confidence label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Categorical risk label with an explicit ordinal scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
    /// No readings to classify
    Unknown,
}

impl RiskLevel {
    /// Ordinal used by the weighted overall score; unknown counts as low
    pub const fn ordinal(self) -> f64 {
        match self {
            Self::Low | Self::Unknown => 1.0,
            Self::Moderate => 2.0,
            Self::High => 3.0,
            Self::Critical => 4.0,
        }
    }

    /// The more urgent of two levels
    pub fn more_urgent(self, other: Self) -> Self {
        if other.ordinal() > self.ordinal() {
            other
        } else {
            self
        }
    }
}

/// Full analysis of one journal snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AnalysisReport {
    /// When the report was computed
    pub generated_at: DateTime<Utc>,
    pub summary: ReadingSummary,
    pub data_quality: DataQuality,
    pub risk_assessment: RiskAssessment,
    pub trend_analysis: TrendAnalysis,
    pub lifestyle_correlation: LifestyleCorrelation,
    pub circadian_analysis: CircadianAnalysis,
    pub predictive_insights: PredictiveInsights,
    pub medical_alerts: Vec<MedicalAlert>,
    pub personalized_recommendations: Vec<Recommendation>,
    /// Overall confidence in the report, 0-1
    pub confidence_score: f64,
}

/// Result of an analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// No readings were supplied; nothing was computed
    InsufficientData {
        message: String,
        recommendations: Vec<String>,
    },
    /// Every sub-analysis ran
    Complete { report: Box<AnalysisReport> },
}

impl AnalysisOutcome {
    /// The report, if one was computed
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Complete { report } => Some(report.as_ref()),
            Self::InsufficientData { .. } => None,
        }
    }
}
