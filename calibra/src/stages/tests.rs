use chrono::{TimeZone, Utc};

use super::*;
use crate::plan::CalibrationGroup;
use common::FileFormat;

fn group(object: &str, filter: &str, setup: &str, dark: &str, lights: &[&str]) -> CalibrationGroup {
    CalibrationGroup {
        key: format!("{setup}|{object}|{filter}|{dark}"),
        setup: setup.into(),
        object: object.into(),
        filter: filter.into(),
        readout: "Normal".into(),
        gain: 100,
        offset: 10,
        usb: 40,
        binning: "1x1".into(),
        temp_c: -10,
        exposure_sec: 300.0,
        bias: "/masters/bias.xisf".into(),
        dark: dark.into(),
        flat: format!("/masters/flat_{filter}.xisf"),
        lights: lights.iter().map(|l| l.to_string()).collect(),
    }
}

fn plan(groups: Vec<CalibrationGroup>) -> CalibrationPlan {
    let mut plan = CalibrationPlan::empty(Utc.with_ymd_and_hms(2024, 9, 11, 0, 0, 0).unwrap());
    for g in groups {
        plan.groups.push(g);
    }
    plan
}

#[test]
fn output_path_uses_input_directory_by_default() {
    let naming = OutputNaming::calibrated();
    assert_eq!(
        naming.output_path("/data/lights/M31_001.fits"),
        "/data/lights/M31_001_c.xisf"
    );
    assert_eq!(naming.output_path("M31_001.fit"), "M31_001_c.xisf");
}

#[test]
fn output_path_honors_directory() {
    let naming = OutputNaming::cosmetic().in_directory("/work/cc");
    assert_eq!(
        naming.output_path("/data/lights/M31_001_c.xisf"),
        "/work/cc/M31_001_c_cc.xisf"
    );
}

#[test]
fn cosmetic_batches_follow_darks_in_first_use_order() {
    let plan = plan(vec![
        group("M31", "L", "T1", "/masters/dark_b.xisf", &["/l/a.fits", "/l/b.fits"]),
        group("M31", "R", "T1", "/masters/dark_a.xisf", &["/l/c.fits"]),
        group("M33", "L", "T1", "/masters/dark_b.xisf", &["/l/d.fits"]),
    ]);

    let cosmetic = cosmetic_plan(&plan, &OutputNaming::calibrated());

    let darks: Vec<&String> = cosmetic.batches.keys().collect();
    assert_eq!(darks, ["/masters/dark_b.xisf", "/masters/dark_a.xisf"]);
    assert_eq!(
        cosmetic.batch("/masters/dark_b.xisf").unwrap().lights,
        ["/l/a_c.xisf", "/l/b_c.xisf", "/l/d_c.xisf"]
    );
    assert_eq!(
        cosmetic.batch("/masters/dark_a.xisf").unwrap().lights,
        ["/l/c_c.xisf"]
    );
}

#[test]
fn integration_ignores_setup_and_chains_namings() {
    let plan = plan(vec![
        group("M31", "L", "T1", "/masters/dark_t1.xisf", &["/l/t1_a.fits"]),
        group("M31", "L", "T2", "/masters/dark_t2.xisf", &["/l/t2_a.fits"]),
        group("M31", "Ha", "T1", "/masters/dark_t1.xisf", &["/l/t1_ha.fits"]),
    ]);
    let calibration = OutputNaming::calibrated();
    let cosmetic = OutputNaming::cosmetic();

    let integration = integration_plan(&plan, &[&calibration, &cosmetic]);

    assert_eq!(integration.groups.len(), 2);
    let luminance = integration.group("M31", "L", 300.0).unwrap();
    assert_eq!(luminance.lights, ["/l/t1_a_c_cc.xisf", "/l/t2_a_c_cc.xisf"]);
    assert_eq!(
        integration.group("M31", "Ha", 300.0).unwrap().lights,
        ["/l/t1_ha_c_cc.xisf"]
    );
    assert!(integration.group("M31", "L", 120.0).is_none());
}

#[test]
fn integration_without_namings_keeps_light_paths() {
    let plan = plan(vec![group("M31", "L", "T1", "/m/d.xisf", &["/l/a.fits"])]);
    let integration = integration_plan(&plan, &[]);
    assert_eq!(integration.groups[0].lights, ["/l/a.fits"]);
}

#[test]
fn stage_plans_roundtrip() {
    let plan = plan(vec![
        group("M31", "L", "T1", "/m/d1.xisf", &["/l/a.fits"]),
        group("M33", "L", "T1", "/m/d2.xisf", &["/l/b.fits"]),
    ]);
    let naming = OutputNaming::calibrated();
    let cosmetic = cosmetic_plan(&plan, &naming);
    let integration = integration_plan(&plan, &[&naming]);

    for format in FileFormat::all_formats_for_testing() {
        let bytes = common::serde::serialize(&cosmetic, format).unwrap();
        let back: CosmeticPlan = common::serde::deserialize(&bytes, format).unwrap();
        assert_eq!(back, cosmetic);

        let bytes = common::serde::serialize(&integration, format).unwrap();
        let back: IntegrationPlan = common::serde::deserialize(&bytes, format).unwrap();
        assert_eq!(back, integration);
        assert_eq!(back.groups[1].key, "M33|L|300");
    }
}

#[test]
fn empty_plan_gives_empty_stages() {
    let plan = plan(Vec::new());
    assert!(cosmetic_plan(&plan, &OutputNaming::calibrated()).batches.is_empty());
    assert!(integration_plan(&plan, &[]).groups.is_empty());
}
