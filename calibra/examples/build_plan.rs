//! Example: Build a calibration plan from indexer output
//!
//! Reads a light index and a master index (JSON or YAML, `{ "items": [...] }`),
//! matches every light to a bias, dark and flat, writes the plan and prints the
//! cosmetic and integration batches derived from it.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example build_plan -- <lights.json> <masters.json> [config.yaml]
//! ```
//!
//! Without arguments the fixtures in `test_resources/` are used and the plan
//! is written to `test_output/calibration_plan.json`.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use calibra::{
    cosmetic_plan, integration_plan, Config, FrameCollection, PlanBuilder, PlanStore,
};
use common::test_utils::{test_output_path, test_resource_path};

fn main() -> anyhow::Result<()> {
    common::setup_logging("info", &test_output_path("logs"), "build_plan")?;

    let mut args = env::args().skip(1).map(PathBuf::from);
    let lights_path = args
        .next()
        .unwrap_or_else(|| test_resource_path("lights.json"));
    let masters_path = args
        .next()
        .unwrap_or_else(|| test_resource_path("masters.json"));
    let config = match args.next() {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Loading config {}", path.display()))?,
        None => Config {
            plan_file: test_output_path("calibration_plan.json"),
            ..Config::default()
        },
    };

    let lights = FrameCollection::from_file(&lights_path).context("Loading light index")?;
    let masters = FrameCollection::from_file(&masters_path).context("Loading master index")?;
    tracing::info!(
        lights = lights.len(),
        masters = masters.len(),
        "Loaded frame indexes"
    );

    let plan = PlanBuilder::from_config(&config).build(&lights.items, &masters.items);
    let store = PlanStore::from_config(&config);
    let plan = store.publish(plan);

    println!("Plan written to {}", store.path().display());
    println!(
        "{} groups, {} lights planned, {} skipped",
        plan.groups.len(),
        plan.planned_light_count(),
        plan.skipped.len()
    );
    for group in plan.groups() {
        println!(
            "  {} {} {}s ({}): {} lights",
            group.object,
            group.filter,
            group.exposure_sec,
            group.setup,
            group.lights.len()
        );
    }
    for skipped in &plan.skipped {
        println!("  skipped {}: {}", skipped.path, skipped.reason);
    }

    let cosmetic = cosmetic_plan(&plan, &config.calibration_output);
    println!("{} cosmetic batches", cosmetic.batches.len());

    let integration = integration_plan(
        &plan,
        &[&config.calibration_output, &config.cosmetic_output],
    );
    for group in integration.groups.iter() {
        println!(
            "  stack {} {} {}s: {} frames",
            group.object,
            group.filter,
            group.exposure_sec,
            group.lights.len()
        );
    }

    Ok(())
}
