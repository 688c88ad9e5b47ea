//! Follow-up batches derived from a calibration plan.
//!
//! A plan only says which masters calibrate which lights. The planners here
//! regroup the same lights for the stages that run after calibration:
//! cosmetic correction (one batch per dark) and integration (one stack per
//! target, filter and exposure).

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use common::{KeyIndexKey, KeyIndexRestore, KeyIndexVec};
use serde::{Deserialize, Serialize};

use crate::plan::CalibrationPlan;

/// How a stage names the file it writes for an input file.
///
/// The output is `<directory>/<input stem><postfix><extension>`; without a
/// directory the input's own directory is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputNaming {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    pub postfix: String,
    /// Including the leading dot
    pub extension: String,
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self::calibrated()
    }
}

impl OutputNaming {
    pub fn new(postfix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            directory: None,
            postfix: postfix.into(),
            extension: extension.into(),
        }
    }

    /// `_c.xisf` next to the input.
    pub fn calibrated() -> Self {
        Self::new("_c", ".xisf")
    }

    /// `_cc.xisf` next to the input.
    pub fn cosmetic() -> Self {
        Self::new("_cc", ".xisf")
    }

    pub fn in_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn output_path(&self, input: &str) -> String {
        let input = Path::new(input);
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        let file_name = format!("{stem}{}{}", self.postfix, self.extension);

        let directory = self
            .directory
            .as_deref()
            .or_else(|| input.parent())
            .unwrap_or_else(|| Path::new(""));
        directory.join(file_name).to_string_lossy().into_owned()
    }
}

/// Calibrated lights that share a master dark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmeticBatch {
    #[serde(skip)]
    pub dark: String,
    pub lights: Vec<String>,
}

impl KeyIndexKey<String> for CosmeticBatch {
    fn key(&self) -> &String {
        &self.dark
    }
}

impl KeyIndexRestore<String> for CosmeticBatch {
    fn restore_key(&mut self, key: String) {
        self.dark = key;
    }
}

/// Cosmetic-correction batches keyed by master dark path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosmeticPlan {
    pub batches: KeyIndexVec<String, CosmeticBatch>,
}

impl CosmeticPlan {
    pub fn batch(&self, dark: &str) -> Option<&CosmeticBatch> {
        self.batches.by_key(&dark.to_string())
    }
}

/// Groups the calibrated outputs of every planned light by the dark that
/// calibrated them. Batches appear in order of first use.
pub fn cosmetic_plan(plan: &CalibrationPlan, calibration: &OutputNaming) -> CosmeticPlan {
    let mut cosmetic = CosmeticPlan::default();

    for group in plan.groups() {
        let batch = cosmetic.batches.get_or_insert_with(&group.dark, || CosmeticBatch {
            dark: group.dark.clone(),
            lights: Vec::new(),
        });
        batch
            .lights
            .extend(group.lights.iter().map(|l| calibration.output_path(l)));
    }

    tracing::debug!(batches = cosmetic.batches.len(), "Built cosmetic plan");
    cosmetic
}

/// One stack: lights of the same target through the same filter at the same
/// exposure, whatever setup or binning they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationGroup {
    #[serde(skip)]
    pub key: String,
    pub object: String,
    pub filter: String,
    pub exposure_sec: f64,
    pub lights: Vec<String>,
}

impl KeyIndexKey<String> for IntegrationGroup {
    fn key(&self) -> &String {
        &self.key
    }
}

impl KeyIndexRestore<String> for IntegrationGroup {
    fn restore_key(&mut self, key: String) {
        self.key = key;
    }
}

/// Integration stacks keyed by `object|filter|exposureSec`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationPlan {
    pub groups: KeyIndexVec<String, IntegrationGroup>,
}

impl IntegrationPlan {
    pub fn group(&self, object: &str, filter: &str, exposure_sec: f64) -> Option<&IntegrationGroup> {
        self.groups.by_key(&integration_key(object, filter, exposure_sec))
    }
}

fn integration_key(object: &str, filter: &str, exposure_sec: f64) -> String {
    format!("{object}|{filter}|{exposure_sec}")
}

/// Regroups planned lights for integration.
///
/// Each light path is passed through `namings` in order, so
/// `[calibration, cosmetic]` yields the cosmetic-corrected file names.
pub fn integration_plan(plan: &CalibrationPlan, namings: &[&OutputNaming]) -> IntegrationPlan {
    let mut integration = IntegrationPlan::default();

    for group in plan.groups() {
        let key = integration_key(&group.object, &group.filter, group.exposure_sec);
        let target = integration.groups.get_or_insert_with(&key, || IntegrationGroup {
            key: key.clone(),
            object: group.object.clone(),
            filter: group.filter.clone(),
            exposure_sec: group.exposure_sec,
            lights: Vec::new(),
        });
        target.lights.extend(group.lights.iter().map(|light| {
            namings
                .iter()
                .fold(light.clone(), |path, naming| naming.output_path(&path))
        }));
    }

    tracing::debug!(groups = integration.groups.len(), "Built integration plan");
    integration
}
