use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::blood_pressure::BloodPressureReading;
use super::lifestyle::{CardioEntry, CigarEntry, DrinkEntry, EventEntry, LifestyleEntry, WeightEntry};

/// Snapshot of a user's journal handed to the analysis engine
///
/// Batches may arrive in any order; the engine sorts wherever chronology matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AnalysisInput {
    /// Blood pressure readings
    #[serde(default)]
    #[validate]
    pub readings: Vec<BloodPressureReading>,

    /// Cigar log
    #[serde(default)]
    #[validate]
    pub cigar_entries: Vec<CigarEntry>,

    /// Drink log
    #[serde(default)]
    #[validate]
    pub drink_entries: Vec<DrinkEntry>,

    /// Cardio log
    #[serde(default)]
    #[validate]
    pub cardio_entries: Vec<CardioEntry>,

    /// Weight log
    #[serde(default)]
    #[validate]
    pub weight_entries: Vec<WeightEntry>,

    /// Free-form events
    #[serde(default)]
    #[validate]
    pub event_entries: Vec<EventEntry>,
}

impl AnalysisInput {
    /// Input with readings only
    pub fn from_readings(readings: Vec<BloodPressureReading>) -> Self {
        Self {
            readings,
            ..Self::default()
        }
    }

    /// Readings sorted oldest first
    pub fn chronological_readings(&self) -> Vec<&BloodPressureReading> {
        let mut readings: Vec<&BloodPressureReading> = self.readings.iter().collect();
        readings.sort_by_key(|reading| reading.timestamp);
        readings
    }

    /// All lifestyle entries merged into one timeline, oldest first
    pub fn lifestyle_timeline(&self) -> Vec<LifestyleEntry<'_>> {
        let mut timeline: Vec<LifestyleEntry<'_>> = self
            .cigar_entries
            .iter()
            .map(LifestyleEntry::Cigar)
            .chain(self.drink_entries.iter().map(LifestyleEntry::Drink))
            .chain(self.cardio_entries.iter().map(LifestyleEntry::Cardio))
            .chain(self.weight_entries.iter().map(LifestyleEntry::Weight))
            .chain(self.event_entries.iter().map(LifestyleEntry::Event))
            .collect();
        timeline.sort_by_key(LifestyleEntry::timestamp);
        timeline
    }
}
