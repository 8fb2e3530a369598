//! Cost calculator — wasted watts into currency.
//!
//! Daily loss is always normalized to a full 24-hour day regardless of the
//! observed duration: recurring daily waste is the unit of comparison across
//! alerts. Monthly and annual figures are exact 30x / 365x multiples.

use crate::types::{CostImpact, WasteCategory};

/// Watts of the disparity attributable to waste.
///
/// Phantom and post-occupancy draw is pure waste; occupied-time inefficiency
/// only partially (the attribution fraction covers legitimate load mixed
/// into the deviation); normal operation wastes nothing.
pub fn estimated_waste_power_w(
    category: WasteCategory,
    magnitude_w: f64,
    inefficient_fraction: f64,
) -> f64 {
    match category {
        WasteCategory::PhantomLoad | WasteCategory::PostOccupancy => magnitude_w,
        WasteCategory::InefficientUsage => magnitude_w * inefficient_fraction,
        WasteCategory::Normal => 0.0,
    }
}

/// Energy actually wasted over the observed window.
pub fn total_wasted_kwh(waste_power_w: f64, duration_hours: f64) -> f64 {
    waste_power_w / 1000.0 * duration_hours
}

/// Daily/monthly/annual loss at the given tariff.
pub fn cost_impact(waste_power_w: f64, cost_per_kwh: f64) -> CostImpact {
    let daily = waste_power_w / 1000.0 * 24.0 * cost_per_kwh;
    CostImpact::from_daily(daily)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phantom_uses_full_magnitude() {
        assert_eq!(
            estimated_waste_power_w(WasteCategory::PhantomLoad, 2800.0, 0.6),
            2800.0
        );
        assert_eq!(
            estimated_waste_power_w(WasteCategory::PostOccupancy, 400.0, 0.6),
            400.0
        );
    }

    #[test]
    fn test_inefficient_attribution_fraction() {
        let w = estimated_waste_power_w(WasteCategory::InefficientUsage, 450.0, 0.6);
        assert!((w - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_normal_wastes_nothing() {
        assert_eq!(estimated_waste_power_w(WasteCategory::Normal, 500.0, 0.6), 0.0);
    }

    #[test]
    fn test_daily_cost_full_day_extrapolation() {
        // 2800 W at 8.0/kWh: 2.8 kW * 24 h * 8.0 = 537.6/day
        let cost = cost_impact(2800.0, 8.0);
        assert!((cost.daily - 537.6).abs() < 1e-9);
        assert!((cost.monthly - 537.6 * 30.0).abs() < 1e-9);
        assert!((cost.annual - 537.6 * 365.0).abs() < 1e-9);
    }

    #[test]
    fn test_wasted_kwh_uses_observed_duration() {
        let kwh = total_wasted_kwh(2800.0, 8.0);
        assert!((kwh - 22.4).abs() < 1e-9);
    }
}
