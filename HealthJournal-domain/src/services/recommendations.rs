//! Rule-based recommendations drawn from a finished analysis.

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::report::{RiskLevel, TrendDirection};
use super::lifestyle::{ImpactLevel, LifestyleCorrelation};
use super::risk::RiskAssessment;
use super::summary::{DataQuality, DataQualityLevel};
use super::trend::TrendAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    Urgent,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Medical,
    Trend,
    Lifestyle,
    Monitoring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Recommendation {
    pub priority: RecommendationPriority,
    pub category: RecommendationCategory,
    pub title: String,
    pub message: String,
}

impl Recommendation {
    fn new(priority: RecommendationPriority, category: RecommendationCategory, title: &str, message: &str) -> Self {
        Self {
            priority,
            category,
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

/// Recommendations in rule order; the monitoring reminder appears only when no rule fires
pub fn generate_recommendations(
    risk: &RiskAssessment,
    trends: &TrendAnalysis,
    lifestyle: &LifestyleCorrelation,
    quality: &DataQuality,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if matches!(risk.overall, RiskLevel::High | RiskLevel::Critical) {
        recs.push(Recommendation::new(
            RecommendationPriority::Urgent,
            RecommendationCategory::Medical,
            "Consult your healthcare provider",
            "Your overall blood pressure risk is high. Schedule an appointment with your doctor soon.",
        ));
    }

    if trends.systolic.as_ref().map(|t| t.direction) == Some(TrendDirection::Increasing) {
        recs.push(Recommendation::new(
            RecommendationPriority::High,
            RecommendationCategory::Trend,
            "Rising blood pressure",
            "Your systolic pressure is trending upward. Review recent changes in diet, stress, sleep and activity.",
        ));
    }

    if lifestyle.smoking.impact == Some(ImpactLevel::Significant) {
        recs.push(Recommendation::new(
            RecommendationPriority::High,
            RecommendationCategory::Lifestyle,
            "Smoking raises your blood pressure",
            "Your readings are noticeably higher on days you smoke. Cutting back should lower them.",
        ));
    }

    if quality.quality == DataQualityLevel::NeedsImprovement {
        recs.push(Recommendation::new(
            RecommendationPriority::Medium,
            RecommendationCategory::Monitoring,
            "Measure more often",
            "Daily readings at consistent times make these insights more reliable.",
        ));
    }

    if recs.is_empty() {
        recs.push(Recommendation::new(
            RecommendationPriority::Low,
            RecommendationCategory::Monitoring,
            "Continue monitoring",
            "Your readings look steady. Keep logging regularly to track your progress.",
        ));
    }

    recs
}
