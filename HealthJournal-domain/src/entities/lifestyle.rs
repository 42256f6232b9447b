use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Cigars smoked at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CigarEntry {
    /// Number of cigars
    #[validate(range(min = 1, max = 100, message = "Cigar count must be between 1 and 100"))]
    pub count: u32,

    /// When the cigars were smoked
    pub timestamp: DateTime<Utc>,

    /// Optional brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

/// Alcoholic drinks consumed at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DrinkEntry {
    /// Number of standard drinks
    #[validate(range(min = 1, max = 100, message = "Drink count must be between 1 and 100"))]
    pub count: u32,

    /// When the drinks were consumed
    pub timestamp: DateTime<Utc>,

    /// Optional drink type (beer, wine, spirits, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drink_type: Option<String>,

    /// Optional alcohol by volume, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0, message = "Alcohol content must be between 0 and 100%"))]
    pub alcohol_content: Option<f64>,
}

/// A cardio session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CardioEntry {
    /// Activity name (running, cycling, ...)
    #[validate(length(min = 1, max = 100, message = "Activity must be between 1 and 100 characters"))]
    pub activity: String,

    /// Session length in minutes
    #[validate(range(min = 1, max = 1440, message = "Minutes must be between 1 and 1440"))]
    pub minutes: u32,

    /// When the session took place
    pub timestamp: DateTime<Utc>,
}

/// A body weight measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct WeightEntry {
    /// Weight in pounds
    #[validate(range(min = 40.0, max = 1000.0, message = "Weight must be between 40 and 1000 lb"))]
    pub weight: f64,

    /// When the weight was measured
    pub timestamp: DateTime<Utc>,
}

/// A free-form journal event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct EventEntry {
    /// Short title
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,

    /// When the event happened
    pub timestamp: DateTime<Utc>,
}

/// Any timestamped lifestyle log entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifestyleEntry<'a> {
    Cigar(&'a CigarEntry),
    Drink(&'a DrinkEntry),
    Cardio(&'a CardioEntry),
    Weight(&'a WeightEntry),
    Event(&'a EventEntry),
}

impl LifestyleEntry<'_> {
    /// When the entry was logged
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Cigar(entry) => entry.timestamp,
            Self::Drink(entry) => entry.timestamp,
            Self::Cardio(entry) => entry.timestamp,
            Self::Weight(entry) => entry.timestamp,
            Self::Event(entry) => entry.timestamp,
        }
    }

    /// Short machine-readable kind label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cigar(_) => "cigar",
            Self::Drink(_) => "drink",
            Self::Cardio(_) => "cardio",
            Self::Weight(_) => "weight",
            Self::Event(_) => "event",
        }
    }
}
