use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use health_journal_domain::config::{
    AlertConfig, AnalysisConfig, AssessmentIntervalConfig, BodyConfig, LifestyleConfig, RiskBandConfig,
    RiskScoringConfig, RiskWeightConfig,
};
use health_journal_domain::entities::lifestyle::{CardioEntry, CigarEntry, DrinkEntry, EventEntry, WeightEntry};
use health_journal_domain::entities::{
    AnalysisInput, AnalysisOutcome, AnalysisReport, AnalysisStatus, BloodPressureCategory, BloodPressureReading,
    ConfidenceLevel, RiskLevel, TrendDirection,
};
use health_journal_domain::services::alerts::{AlertKind, AlertSeverity, MedicalAlert};
use health_journal_domain::services::circadian::{CircadianAnalysis, TimeWindow, WindowStats};
use health_journal_domain::services::lifestyle::{
    AlcoholCorrelation, AlcoholTier, AlcoholTierCorrelation, BpAverage, CardioCorrelation, CardioImpact, ImpactLevel,
    LifestyleCorrelation, SmokingCorrelation,
};
use health_journal_domain::services::predictive::{
    LongTermProjection, PredictedValue, PredictiveInsights, ShortTermPrediction,
};
use health_journal_domain::services::recommendations::{
    Recommendation, RecommendationCategory, RecommendationPriority,
};
use health_journal_domain::services::risk::{NextAssessment, ProgressionTrend, RiskAssessment};
use health_journal_domain::services::summary::{DataQuality, DataQualityLevel, MeasurementStats, ReadingSummary};
use health_journal_domain::services::trend::{ComparisonPeriod, PeriodComparison, TrendAnalysis, TrendResult};
use health_journal_domain::services::weight::{
    BmiCategory, CorrelationStrength, HealthRisk, WeightCorrelation, WeightSensitivity, WeightTrend,
};

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::analysis::analyze,
        crate::api::handlers::analysis::get_analysis_config,
    ),
    components(
        schemas(
            // Request
            AnalysisInput, BloodPressureReading, CigarEntry, DrinkEntry, CardioEntry, WeightEntry, EventEntry,

            // Report
            AnalysisOutcome, AnalysisReport, AnalysisStatus, BloodPressureCategory, ConfidenceLevel, RiskLevel,
            TrendDirection, ReadingSummary, MeasurementStats, DataQuality, DataQualityLevel,
            RiskAssessment, ProgressionTrend, NextAssessment,
            TrendAnalysis, TrendResult, PeriodComparison, ComparisonPeriod,
            LifestyleCorrelation, BpAverage, ImpactLevel, SmokingCorrelation, AlcoholCorrelation, AlcoholTier,
            AlcoholTierCorrelation, CardioCorrelation, CardioImpact,
            WeightCorrelation, WeightTrend, WeightSensitivity, BmiCategory, CorrelationStrength, HealthRisk,
            CircadianAnalysis, WindowStats, TimeWindow,
            PredictiveInsights, ShortTermPrediction, LongTermProjection, PredictedValue,
            MedicalAlert, AlertSeverity, AlertKind,
            Recommendation, RecommendationPriority, RecommendationCategory,

            // Configuration
            AnalysisConfig, RiskBandConfig, RiskWeightConfig, RiskScoringConfig, AssessmentIntervalConfig,
            LifestyleConfig, BodyConfig, AlertConfig,

            // API
            crate::entities::common::ErrorResponse,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "analysis", description = "Blood pressure and lifestyle analysis")
    ),
    info(
        title = "HealthJournal Analysis API",
        version = "0.1.0",
        description = "Trend, risk and lifestyle insights over a blood pressure journal",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
