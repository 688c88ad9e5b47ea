//! Calibration plan construction.
//!
//! Every valid light gets one bias, dark and flat; lights that share their
//! acquisition parameters *and* their three masters form one calibration
//! group. Lights that cannot be fully matched are listed as skipped with the
//! reason, never partially calibrated.


use chrono::{DateTime, Utc};
use common::{KeyIndexKey, KeyIndexRestore, KeyIndexVec};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::config::Config;
use crate::frame::FrameRecord;
use crate::select::{CompleteSelection, MasterPools, Selection, DEFAULT_FLAT_WINDOW_DAYS};
use crate::validate::is_valid_light;

/// Why a light was left out of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum SkipReason {
    #[strum(to_string = "missing required light fields")]
    #[serde(rename = "missing required light fields")]
    MissingLightFields,
    #[strum(to_string = "missing master match")]
    #[serde(rename = "missing master match")]
    MissingMasterMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLight {
    pub path: String,
    pub reason: SkipReason,
}

/// Lights calibrated together with the same three masters.
///
/// Scalar fields are kept verbatim so later stages can regroup on any subset
/// of them without parsing the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationGroup {
    #[serde(skip)]
    pub key: String,
    pub setup: String,
    pub object: String,
    pub filter: String,
    pub readout: String,
    pub gain: i64,
    pub offset: i64,
    pub usb: i64,
    pub binning: String,
    pub temp_c: i64,
    pub exposure_sec: f64,
    /// Path of the selected master bias
    pub bias: String,
    /// Path of the selected master dark
    pub dark: String,
    /// Path of the selected master flat
    pub flat: String,
    /// Light paths, in input order
    pub lights: Vec<String>,
}

impl KeyIndexKey<String> for CalibrationGroup {
    fn key(&self) -> &String {
        &self.key
    }
}

impl KeyIndexRestore<String> for CalibrationGroup {
    fn restore_key(&mut self, key: String) {
        self.key = key;
    }
}

/// Scalar acquisition parameters of a light that passed validation.
struct LightParams<'a> {
    setup: &'a str,
    object: &'a str,
    filter: &'a str,
    readout: &'a str,
    gain: i64,
    offset: i64,
    usb: i64,
    binning: &'a str,
    temp_c: i64,
    exposure_sec: f64,
}

impl<'a> LightParams<'a> {
    fn of(light: &'a FrameRecord) -> Option<Self> {
        Some(Self {
            setup: light.setup.as_deref()?,
            object: light.object.as_deref()?,
            filter: light.filter.as_deref()?,
            readout: light.readout.as_deref()?,
            gain: light.gain?,
            offset: light.offset?,
            usb: light.usb?,
            binning: light.binning.as_deref()?,
            temp_c: light.temp_c?,
            exposure_sec: light.exposure_sec?,
        })
    }

    /// Pipe-joined key: setup, object, filter, readout, gain, offset, usb,
    /// binning, tempC, exposureSec, bias path, dark path, flat path.
    fn group_key(&self, masters: &CompleteSelection<'_>) -> String {
        [
            self.setup.to_string(),
            self.object.to_string(),
            self.filter.to_string(),
            self.readout.to_string(),
            self.gain.to_string(),
            self.offset.to_string(),
            self.usb.to_string(),
            self.binning.to_string(),
            self.temp_c.to_string(),
            self.exposure_sec.to_string(),
            masters.bias.path.clone(),
            masters.dark.path.clone(),
            masters.flat.path.clone(),
        ]
        .join("|")
    }

    fn new_group(&self, key: String, masters: &CompleteSelection<'_>) -> CalibrationGroup {
        CalibrationGroup {
            key,
            setup: self.setup.to_string(),
            object: self.object.to_string(),
            filter: self.filter.to_string(),
            readout: self.readout.to_string(),
            gain: self.gain,
            offset: self.offset,
            usb: self.usb,
            binning: self.binning.to_string(),
            temp_c: self.temp_c,
            exposure_sec: self.exposure_sec,
            bias: masters.bias.path.clone(),
            dark: masters.dark.path.clone(),
            flat: masters.flat.path.clone(),
            lights: Vec::new(),
        }
    }
}

/// Result of one plan build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPlan {
    #[serde(rename = "generatedUTC")]
    pub generated_utc: DateTime<Utc>,
    /// Groups keyed by their composite key, in order of first appearance
    pub groups: KeyIndexVec<String, CalibrationGroup>,
    pub skipped: Vec<SkippedLight>,
}

impl CalibrationPlan {
    pub fn empty(generated_utc: DateTime<Utc>) -> Self {
        Self {
            generated_utc,
            groups: KeyIndexVec::default(),
            skipped: Vec::new(),
        }
    }

    pub fn group(&self, key: &str) -> Option<&CalibrationGroup> {
        self.groups.by_key(&key.to_string())
    }

    pub fn groups(&self) -> std::slice::Iter<'_, CalibrationGroup> {
        self.groups.iter()
    }

    /// Number of lights placed in a group.
    pub fn planned_light_count(&self) -> usize {
        self.groups.iter().map(|g| g.lights.len()).sum()
    }

    pub fn skipped_with(&self, reason: SkipReason) -> impl Iterator<Item = &SkippedLight> {
        self.skipped.iter().filter(move |s| s.reason == reason)
    }
}

/// Builds calibration plans from light and master indexes.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    flat_window_days: i64,
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self {
            flat_window_days: DEFAULT_FLAT_WINDOW_DAYS,
        }
    }
}

impl PlanBuilder {
    pub fn new(flat_window_days: i64) -> Self {
        Self { flat_window_days }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.flat_window_days)
    }

    pub fn flat_window_days(&self) -> i64 {
        self.flat_window_days
    }

    /// Builds a plan stamped with the current time.
    pub fn build(&self, lights: &[FrameRecord], masters: &[FrameRecord]) -> CalibrationPlan {
        self.build_at(lights, masters, Utc::now())
    }

    /// Builds a plan with an explicit timestamp; equal inputs give equal plans.
    pub fn build_at(
        &self,
        lights: &[FrameRecord],
        masters: &[FrameRecord],
        generated_utc: DateTime<Utc>,
    ) -> CalibrationPlan {
        let pools = MasterPools::partition(masters);
        tracing::debug!(
            bias = pools.bias.len(),
            dark = pools.dark.len(),
            flat = pools.flat.len(),
            "Partitioned master pools"
        );

        let mut plan = CalibrationPlan::empty(generated_utc);

        for light in lights {
            let params = match LightParams::of(light) {
                Some(params) if is_valid_light(light) => params,
                _ => {
                    skip(&mut plan, light, SkipReason::MissingLightFields);
                    continue;
                }
            };

            let selection = pools.select(light, self.flat_window_days);
            let Some(masters) = selection.complete() else {
                log_missing_masters(light, &selection);
                skip(&mut plan, light, SkipReason::MissingMasterMatch);
                continue;
            };

            let key = params.group_key(&masters);
            plan.groups
                .get_or_insert_with(&key, || params.new_group(key.clone(), &masters))
                .lights
                .push(light.path.clone());
        }

        tracing::info!(
            lights = lights.len(),
            groups = plan.groups.len(),
            planned = plan.planned_light_count(),
            skipped = plan.skipped.len(),
            "Built calibration plan"
        );

        plan
    }
}

/// Builds a plan with the default flat window.
pub fn build_plan(lights: &[FrameRecord], masters: &[FrameRecord]) -> CalibrationPlan {
    PlanBuilder::default().build(lights, masters)
}

fn skip(plan: &mut CalibrationPlan, light: &FrameRecord, reason: SkipReason) {
    tracing::warn!(path = %light.path, %reason, "Skipping light");
    plan.skipped.push(SkippedLight {
        path: light.path.clone(),
        reason,
    });
}

fn log_missing_masters(light: &FrameRecord, selection: &Selection<'_>) {
    tracing::debug!(
        path = %light.path,
        bias = selection.bias.is_some(),
        dark = selection.dark.is_some(),
        flat = selection.flat.is_some(),
        "Incomplete master selection"
    );
}
