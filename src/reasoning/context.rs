//! Context builder — raw time/occupancy fields into an `OccupancyContext`.

use crate::error::AnalysisError;
use crate::types::{OccupancyContext, OccupancyStatus, Season};

/// Raw context fields as they arrive at the boundary, before validation.
#[derive(Debug, Clone, Default)]
pub struct ContextFields {
    pub hour: i64,
    pub day_of_week: i64,
    pub is_weekend: bool,
    pub month: i64,
    pub season: Option<Season>,
    pub occupancy_status: Option<OccupancyStatus>,
    pub occupancy_confidence: Option<f64>,
}

/// Build a validated context.
///
/// Missing occupancy status defaults to `Unknown`. An unknown status caps
/// the effective confidence at 0.5 and ignores any supplied value; a known
/// status without a supplied confidence falls back to `default_confidence`.
/// Out-of-range hour/day/month are rejected before any computation.
pub fn build(
    fields: &ContextFields,
    default_confidence: f64,
) -> Result<OccupancyContext, AnalysisError> {
    if !(0..=23).contains(&fields.hour) {
        return Err(AnalysisError::InvalidRange {
            field: "hour",
            value: fields.hour,
            expected: "0-23",
        });
    }
    if !(0..=6).contains(&fields.day_of_week) {
        return Err(AnalysisError::InvalidRange {
            field: "day_of_week",
            value: fields.day_of_week,
            expected: "0-6",
        });
    }
    if !(1..=12).contains(&fields.month) {
        return Err(AnalysisError::InvalidRange {
            field: "month",
            value: fields.month,
            expected: "1-12",
        });
    }

    let status = fields.occupancy_status.unwrap_or_default();
    let status_confidence = match status {
        OccupancyStatus::Unknown => 0.5,
        _ => fields
            .occupancy_confidence
            .unwrap_or(default_confidence)
            .clamp(0.0, 1.0),
    };

    let month = fields.month as u8;
    Ok(OccupancyContext {
        status,
        status_confidence,
        hour: fields.hour as u8,
        day_of_week: fields.day_of_week as u8,
        is_weekend: fields.is_weekend,
        month,
        season: fields.season.unwrap_or_else(|| Season::from_month(month)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ContextFields {
        ContextFields {
            hour: 14,
            day_of_week: 2,
            is_weekend: false,
            month: 6,
            season: None,
            occupancy_status: Some(OccupancyStatus::Occupied),
            occupancy_confidence: Some(0.92),
        }
    }

    #[test]
    fn test_builds_with_derived_season() {
        let ctx = build(&fields(), 0.8).unwrap();
        assert_eq!(ctx.season, Season::Summer);
        assert_eq!(ctx.status, OccupancyStatus::Occupied);
        assert!((ctx.status_confidence - 0.92).abs() < 1e-9);
    }

    #[test]
    fn test_missing_status_defaults_to_unknown() {
        let mut f = fields();
        f.occupancy_status = None;
        let ctx = build(&f, 0.8).unwrap();
        assert_eq!(ctx.status, OccupancyStatus::Unknown);
    }

    #[test]
    fn test_unknown_status_caps_confidence() {
        let mut f = fields();
        f.occupancy_status = Some(OccupancyStatus::Unknown);
        f.occupancy_confidence = Some(0.99);
        let ctx = build(&f, 0.8).unwrap();
        assert!((ctx.status_confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_known_status_missing_confidence_uses_default() {
        let mut f = fields();
        f.occupancy_confidence = None;
        let ctx = build(&f, 0.8).unwrap();
        assert!((ctx.status_confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_supplied_confidence_clamped() {
        let mut f = fields();
        f.occupancy_confidence = Some(1.7);
        let ctx = build(&f, 0.8).unwrap();
        assert!((ctx.status_confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut f = fields();
        f.hour = 24;
        assert!(build(&f, 0.8).is_err());

        let mut f = fields();
        f.day_of_week = 7;
        assert!(build(&f, 0.8).is_err());

        let mut f = fields();
        f.month = 0;
        assert!(build(&f, 0.8).is_err());
    }
}
