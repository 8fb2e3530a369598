//! Disparity signal and occupancy context — the two inputs to classification.

use serde::{Deserialize, Serialize};

/// Occupancy state of the zone at evaluation time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyStatus {
    Occupied,
    Unoccupied,
    /// Sensors offline or ambiguous. Treated as "maybe occupied": the
    /// classifier requires stricter evidence before flagging waste, and the
    /// confidence scorer caps the occupancy contribution at 0.5.
    Unknown,
}

impl std::fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OccupancyStatus::Occupied => write!(f, "occupied"),
            OccupancyStatus::Unoccupied => write!(f, "unoccupied"),
            OccupancyStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl Default for OccupancyStatus {
    fn default() -> Self {
        OccupancyStatus::Unknown
    }
}

/// Calendar season, derived from month when not supplied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
    Unknown,
}

impl Season {
    /// Meteorological season for a 1-12 month.
    pub fn from_month(month: u8) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Unknown,
        }
    }
}

impl Default for Season {
    fn default() -> Self {
        Season::Unknown
    }
}

/// Normalized power-disparity measurement from the upstream regression model.
///
/// Created once per evaluation and owned by that evaluation; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisparitySignal {
    /// Deviation magnitude in watts, floored at zero.
    pub magnitude_w: f64,
    /// Model confidence in the prediction (0-1).
    pub confidence: f64,
    /// Expected normal draw in watts.
    pub baseline_w: f64,
    /// Observed draw in watts, when metered.
    pub actual_w: Option<f64>,
    /// (actual - baseline) / baseline * 100, when both sides are known
    /// and the baseline is positive.
    pub variance_pct: Option<f64>,
}

/// Time and occupancy facts needed to interpret a disparity signal.
///
/// Derived deterministically from raw fields by the context builder;
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyContext {
    pub status: OccupancyStatus,
    /// Effective occupancy confidence (0-1). Already capped at 0.5 when
    /// status is `Unknown`.
    pub status_confidence: f64,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Day of week, 0-6 (0 = Monday).
    pub day_of_week: u8,
    pub is_weekend: bool,
    /// Month, 1-12.
    pub month: u8,
    pub season: Season,
}

impl OccupancyContext {
    /// 10 PM - 6 AM, typical off-hours.
    pub fn is_night_hours(&self) -> bool {
        self.hour >= 22 || self.hour < 6
    }

    /// Occupied weekday 9 AM - 6 PM.
    pub fn is_working_hours(&self) -> bool {
        self.status == OccupancyStatus::Occupied
            && (9..18).contains(&self.hour)
            && !self.is_weekend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(status: OccupancyStatus, hour: u8, weekend: bool) -> OccupancyContext {
        OccupancyContext {
            status,
            status_confidence: 0.9,
            hour,
            day_of_week: 2,
            is_weekend: weekend,
            month: 6,
            season: Season::Summer,
        }
    }

    #[test]
    fn test_night_hours_window() {
        assert!(ctx(OccupancyStatus::Unoccupied, 23, false).is_night_hours());
        assert!(ctx(OccupancyStatus::Unoccupied, 2, false).is_night_hours());
        assert!(ctx(OccupancyStatus::Unoccupied, 5, false).is_night_hours());
        assert!(!ctx(OccupancyStatus::Unoccupied, 6, false).is_night_hours());
        assert!(!ctx(OccupancyStatus::Unoccupied, 21, false).is_night_hours());
    }

    #[test]
    fn test_working_hours_requires_occupied_weekday() {
        assert!(ctx(OccupancyStatus::Occupied, 14, false).is_working_hours());
        assert!(!ctx(OccupancyStatus::Occupied, 18, false).is_working_hours());
        assert!(!ctx(OccupancyStatus::Occupied, 14, true).is_working_hours());
        assert!(!ctx(OccupancyStatus::Unoccupied, 14, false).is_working_hours());
        assert!(!ctx(OccupancyStatus::Unknown, 14, false).is_working_hours());
    }

    #[test]
    fn test_season_from_month() {
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(4), Season::Spring);
        assert_eq!(Season::from_month(7), Season::Summer);
        assert_eq!(Season::from_month(10), Season::Fall);
        assert_eq!(Season::from_month(12), Season::Winter);
    }
}
