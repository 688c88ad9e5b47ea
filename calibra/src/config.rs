//! Planner settings, loadable from YAML or JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::{read_document, write_document};
use crate::error::{Error, Result};
use crate::select::DEFAULT_FLAT_WINDOW_DAYS;
use crate::stages::OutputNaming;

/// Settings for plan construction and the stages that follow it.
///
/// Missing keys in a config file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Half-width of the flat session window in days, inclusive.
    pub flat_window_days: i64,
    /// Where published plans are written. JSON or YAML by extension.
    pub plan_file: PathBuf,
    pub calibration_output: OutputNaming,
    pub cosmetic_output: OutputNaming,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flat_window_days: DEFAULT_FLAT_WINDOW_DAYS,
            plan_file: PathBuf::from("calibration_plan.json"),
            calibration_output: OutputNaming::calibrated(),
            cosmetic_output: OutputNaming::cosmetic(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Config = read_document(path)?;
        config.validate(path)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_document(self, path.as_ref())
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.flat_window_days < 0 {
            return Err(Error::InvalidConfig {
                path: path.to_path_buf(),
                reason: format!(
                    "flat_window_days must not be negative, got {}",
                    self.flat_window_days
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::test_utils::{test_output_path, test_resource_path};

    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.flat_window_days, 3);
        assert_eq!(config.plan_file, PathBuf::from("calibration_plan.json"));
        assert_eq!(config.calibration_output.postfix, "_c");
        assert_eq!(config.cosmetic_output.postfix, "_cc");
        assert_eq!(config.cosmetic_output.extension, ".xisf");
    }

    #[test]
    fn loads_partial_yaml() {
        let config = Config::from_file(test_resource_path("config.yaml")).unwrap();
        assert_eq!(config.flat_window_days, 5);
        assert_eq!(config.plan_file, PathBuf::from("plans/calibration_plan.yaml"));
        assert_eq!(
            config.calibration_output,
            OutputNaming::calibrated().in_directory("/work/calibrated")
        );
        assert_eq!(config.cosmetic_output, OutputNaming::cosmetic());
    }

    #[test]
    fn save_and_reload() {
        let config = Config {
            flat_window_days: 1,
            plan_file: PathBuf::from("out/plan.yaml"),
            ..Config::default()
        };
        for name in ["config/config.json", "config/config.yaml"] {
            let path = test_output_path(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn negative_window_is_rejected() {
        let path = test_output_path("config/negative_window.json");
        std::fs::write(&path, br#"{ "flat_window_days": -1 }"#).unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn unsupported_extension() {
        let err = Config::from_file("settings.toml").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}
