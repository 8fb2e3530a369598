//! Waste-detection walkthrough: canonical scenarios plus a randomized fleet.
//!
//! Runs the reasoning pipeline offline (no HTTP, no persistence), prints
//! human-readable insights, and finishes with the building report the
//! aggregator produces from the resulting alerts.
//!
//! ```bash
//! cargo run --bin demo
//! cargo run --bin demo -- --fleet-size 40 --seed 7
//! ```

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use enerlens::alerts::AlertFilter;
use enerlens::reasoning::ContextFields;
use enerlens::types::{Location, OccupancyStatus, ThresholdConfig};
use enerlens::{AlertManager, EvaluationInput, ThresholdStore, WasteAnalyzer};

#[derive(Parser, Debug)]
#[command(name = "demo")]
#[command(about = "Enerlens waste-detection walkthrough")]
struct DemoArgs {
    /// Number of synthetic devices in the random fleet
    #[arg(long, default_value = "25")]
    fleet_size: usize,

    /// RNG seed for a reproducible fleet
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Tariff in currency units per kWh
    #[arg(long, default_value = "8.0")]
    cost_per_kwh: f64,
}

struct Scenario {
    title: &'static str,
    device_id: &'static str,
    device_category: &'static str,
    floor: &'static str,
    zone: &'static str,
    disparity_w: f64,
    confidence: f64,
    status: OccupancyStatus,
    hour: i64,
    duration_hours: f64,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        title: "Phantom load: server room drawing 2.8 kW overnight, unoccupied",
        device_id: "SERVER_ROOM_4",
        device_category: "server",
        floor: "4",
        zone: "Server Room",
        disparity_w: 2800.0,
        confidence: 0.95,
        status: OccupancyStatus::Unoccupied,
        hour: 2,
        duration_hours: 8.0,
    },
    Scenario {
        title: "Inefficient usage: HVAC running high during occupancy",
        device_id: "HVAC_ZONE_A",
        device_category: "hvac",
        floor: "2",
        zone: "Office Zone A",
        disparity_w: 450.0,
        confidence: 0.88,
        status: OccupancyStatus::Occupied,
        hour: 14,
        duration_hours: 6.0,
    },
    Scenario {
        title: "Normal operation: conference room lighting, low variance",
        device_id: "LIGHT_CONF_B",
        device_category: "lighting",
        floor: "1",
        zone: "Conference Room B",
        disparity_w: 80.0,
        confidence: 0.92,
        status: OccupancyStatus::Occupied,
        hour: 11,
        duration_hours: 3.0,
    },
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = DemoArgs::parse();

    let thresholds = Arc::new(ThresholdStore::new(ThresholdConfig::default()));
    let analyzer = WasteAnalyzer::new(thresholds);
    let manager = AlertManager::new(24.0, 3);

    println!("=== Enerlens waste-detection walkthrough ===\n");

    for scenario in SCENARIOS {
        println!("--- {} ---", scenario.title);
        let insight = analyze_scenario(&analyzer, scenario, args.cost_per_kwh);
        let location = format!("Floor {} / {}", scenario.floor, scenario.zone);
        println!("{}\n", insight.render_text(scenario.device_id, &location));

        manager.ingest(
            scenario.device_id,
            scenario.device_category,
            Location {
                floor: Some(scenario.floor.to_string()),
                zone: Some(scenario.zone.to_string()),
            },
            &insight,
        );
    }

    println!("--- Randomized fleet ({} devices) ---", args.fleet_size);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut flagged = 0usize;
    for i in 0..args.fleet_size {
        let device_id = format!("DEV_{i:03}");
        let category = ["hvac", "lighting", "server", "kitchen"][rng.gen_range(0..4)];
        let scenario = Scenario {
            title: "",
            device_id: "",
            device_category: category,
            floor: "",
            zone: "",
            disparity_w: rng.gen_range(0.0..1500.0),
            confidence: rng.gen_range(0.5..1.0),
            status: match rng.gen_range(0..3) {
                0 => OccupancyStatus::Occupied,
                1 => OccupancyStatus::Unoccupied,
                _ => OccupancyStatus::Unknown,
            },
            hour: rng.gen_range(0..24),
            duration_hours: rng.gen_range(0.5..30.0),
        };
        let insight = analyze_scenario(&analyzer, &scenario, args.cost_per_kwh);
        if insight.category.is_waste() {
            flagged += 1;
            println!(
                "  {} ({}): {} [{}] {:.0}/year",
                device_id, category, insight.category, insight.severity, insight.cost.annual
            );
        }
        manager.ingest(
            &device_id,
            category,
            Location {
                floor: Some(format!("{}", 1 + i % 5)),
                zone: None,
            },
            &insight,
        );
    }
    println!("  flagged {flagged} of {} devices\n", args.fleet_size);

    let alerts = manager.query(&AlertFilter::default());
    let recommendations = manager.recommendations();
    let report = enerlens::report::build_report("BLDG01", &alerts, &recommendations, 3);

    println!("--- Building report ---");
    println!(
        "  alerts: {} total, {} open",
        report.summary.total_alerts, report.summary.open_alerts
    );
    println!(
        "  waste cost: {:.0}/day  {:.0}/month  {:.0}/year",
        report.cost.daily, report.cost.monthly, report.cost.annual
    );
    println!(
        "  potential savings: {:.0}/year across {} recommendations",
        report.cost.potential_savings_annual, report.recommendations.total
    );
    for (i, leak) in report.top_leaks.iter().enumerate() {
        println!(
            "  top leak {}: {} ({}) {:.0}/year [{}]",
            i + 1,
            leak.device_id,
            leak.category,
            leak.cost.annual,
            leak.severity
        );
    }
}

fn analyze_scenario(
    analyzer: &WasteAnalyzer,
    scenario: &Scenario,
    cost_per_kwh: f64,
) -> enerlens::WasteInsight {
    let signal = enerlens::reasoning::signal::normalize(
        scenario.disparity_w,
        scenario.confidence,
        Some(500.0),
        None,
    )
    .unwrap_or_else(|e| {
        eprintln!("bad scenario signal: {e}");
        std::process::exit(1);
    });
    let context = enerlens::reasoning::context::build(
        &ContextFields {
            hour: scenario.hour,
            day_of_week: 2,
            is_weekend: false,
            month: 2,
            season: None,
            occupancy_status: Some(scenario.status),
            occupancy_confidence: Some(0.95),
        },
        0.8,
    )
    .unwrap_or_else(|e| {
        eprintln!("bad scenario context: {e}");
        std::process::exit(1);
    });

    analyzer.analyze(&EvaluationInput {
        signal,
        context,
        device_category: scenario.device_category.to_string(),
        duration_hours: scenario.duration_hours,
        cost_per_kwh: Some(cost_per_kwh),
    })
}
