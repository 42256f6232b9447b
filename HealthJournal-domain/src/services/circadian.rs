//! Time-of-day patterns in blood pressure.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::config::RiskBandConfig;
use crate::entities::blood_pressure::BloodPressureReading;
use crate::entities::report::RiskLevel;
use super::risk::classify_means;
use super::statistics::{local_hour, mean};

/// Readings a window needs before it can be called optimal or a concern
const MIN_WINDOW_READINGS: usize = 2;

/// Fixed local-hour windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    /// 06:00-11:59
    Morning,
    /// 12:00-17:59
    Afternoon,
    /// 18:00-23:59
    Evening,
    /// 00:00-05:59
    Night,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [Self::Morning, Self::Afternoon, Self::Evening, Self::Night];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=23 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// Averages for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct WindowStats {
    pub window: TimeWindow,
    pub reading_count: usize,
    pub avg_systolic: f64,
    pub avg_diastolic: f64,
    pub avg_heart_rate: f64,
    pub risk: RiskLevel,
}

impl WindowStats {
    fn pressure_load(&self) -> f64 {
        self.avg_systolic + self.avg_diastolic
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CircadianAnalysis {
    /// Non-empty windows in morning, afternoon, evening, night order
    pub windows: Vec<WindowStats>,
    /// Lowest-pressure window among those with at least two readings
    pub optimal_time: Option<TimeWindow>,
    /// Highest-pressure window, only when it is elevated
    pub concern_time: Option<TimeWindow>,
}

pub fn analyze_circadian(
    readings: &[&BloodPressureReading],
    bands: &RiskBandConfig,
    offset: FixedOffset,
) -> CircadianAnalysis {
    let windows: Vec<WindowStats> = TimeWindow::ALL
        .iter()
        .filter_map(|window| {
            let in_window: Vec<&BloodPressureReading> = readings
                .iter()
                .copied()
                .filter(|r| TimeWindow::from_hour(local_hour(r.timestamp, offset)) == *window)
                .collect();
            if in_window.is_empty() {
                return None;
            }
            let systolic: Vec<f64> = in_window.iter().map(|r| f64::from(r.systolic)).collect();
            let diastolic: Vec<f64> = in_window.iter().map(|r| f64::from(r.diastolic)).collect();
            let heart_rate: Vec<f64> = in_window.iter().map(|r| f64::from(r.heart_rate)).collect();
            let avg_systolic = mean(&systolic);
            let avg_diastolic = mean(&diastolic);
            Some(WindowStats {
                window: *window,
                reading_count: in_window.len(),
                avg_systolic,
                avg_diastolic,
                avg_heart_rate: mean(&heart_rate),
                risk: classify_means(avg_systolic, avg_diastolic, bands),
            })
        })
        .collect();

    let eligible = || windows.iter().filter(|w| w.reading_count >= MIN_WINDOW_READINGS);
    let optimal_time = eligible()
        .min_by(|a, b| a.pressure_load().total_cmp(&b.pressure_load()))
        .map(|w| w.window);
    let concern_time = eligible()
        .max_by(|a, b| a.pressure_load().total_cmp(&b.pressure_load()))
        .filter(|w| w.avg_systolic >= bands.moderate_systolic || w.avg_diastolic >= bands.moderate_diastolic)
        .map(|w| w.window);

    debug!(?optimal_time, ?concern_time, windows = windows.len(), "Analyzed circadian pattern");

    CircadianAnalysis {
        windows,
        optimal_time,
        concern_time,
    }
}
