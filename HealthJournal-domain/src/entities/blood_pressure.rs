use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Domain model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodPressureReading {
    /// Unique identifier for the reading
    pub id: String,

    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    pub diastolic: u16,

    /// Heart rate in beats per minute
    #[validate(range(min = 20, max = 250, message = "Heart rate must be between 20 and 250"))]
    pub heart_rate: u16,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// Optional notes about the reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

impl BloodPressureReading {
    /// Clinical category of this single reading
    pub fn category(&self) -> BloodPressureCategory {
        BloodPressureCategory::from_measurements(f64::from(self.systolic), f64::from(self.diastolic))
    }
}

/// Blood pressure category based on measurements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BloodPressureCategory {
    /// Normal blood pressure (systolic < 120 and diastolic < 80)
    Normal,

    /// Elevated blood pressure (systolic 120-129 and diastolic < 80)
    Elevated,

    /// Stage 1 Hypertension (systolic 130-139 or diastolic 80-89)
    Hypertension1,

    /// Stage 2 Hypertension (systolic ≥ 140 or diastolic ≥ 90)
    Hypertension2,

    /// Hypertensive crisis (systolic ≥ 180 and/or diastolic ≥ 120)
    HypertensiveCrisis,
}

impl BloodPressureCategory {
    /// Categorize a (possibly averaged) systolic/diastolic pair
    pub fn from_measurements(systolic: f64, diastolic: f64) -> Self {
        if systolic >= 180.0 || diastolic >= 120.0 {
            Self::HypertensiveCrisis
        } else if systolic >= 140.0 || diastolic >= 90.0 {
            Self::Hypertension2
        } else if systolic >= 130.0 || diastolic >= 80.0 {
            Self::Hypertension1
        } else if systolic >= 120.0 {
            Self::Elevated
        } else {
            Self::Normal
        }
    }
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::Hypertension1 => "Hypertension Stage 1",
            Self::Hypertension2 => "Hypertension Stage 2",
            Self::HypertensiveCrisis => "Hypertensive Crisis",
        };
        f.write_str(label)
    }
}
