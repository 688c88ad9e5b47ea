//! Persistence and publication of built plans.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::Slot;

use crate::config::Config;
use crate::document::{read_document, write_document};
use crate::error::Result;
use crate::plan::CalibrationPlan;

/// Writes each published plan to a file and keeps the latest one in memory.
///
/// Readers on other threads see a published plan through [`PlanStore::latest`]
/// without blocking the publisher.
#[derive(Debug)]
pub struct PlanStore {
    path: PathBuf,
    latest: Slot<CalibrationPlan>,
}

impl PlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            latest: Slot::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.plan_file.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists `plan` and makes it the latest plan.
    ///
    /// A failed write is logged and does not stop publication.
    pub fn publish(&self, plan: CalibrationPlan) -> Arc<CalibrationPlan> {
        match save(&plan, &self.path) {
            Ok(()) => tracing::info!(
                path = %self.path.display(),
                groups = plan.groups.len(),
                "Saved calibration plan"
            ),
            Err(err) => tracing::error!(
                path = %self.path.display(),
                "Failed to save calibration plan: {err}"
            ),
        }
        self.latest.publish(plan)
    }

    pub fn latest(&self) -> Option<Arc<CalibrationPlan>> {
        self.latest.latest()
    }
}

pub fn save(plan: &CalibrationPlan, path: impl AsRef<Path>) -> Result<()> {
    write_document(plan, path.as_ref())
}

pub fn load(path: impl AsRef<Path>) -> Result<CalibrationPlan> {
    let path = path.as_ref();
    let plan: CalibrationPlan = read_document(path)?;
    tracing::debug!(path = %path.display(), groups = plan.groups.len(), "Loaded calibration plan");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use common::test_utils::{test_output_path, test_resource_path};

    use super::*;
    use crate::error::Error;
    use crate::frame::FrameCollection;
    use crate::plan::{PlanBuilder, SkipReason};

    fn fixture_plan() -> CalibrationPlan {
        let lights = FrameCollection::from_file(test_resource_path("lights.json")).unwrap();
        let masters = FrameCollection::from_file(test_resource_path("masters.json")).unwrap();
        PlanBuilder::default().build_at(
            &lights.items,
            &masters.items,
            Utc.with_ymd_and_hms(2024, 9, 11, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn fixture_plan_contents() {
        let plan = fixture_plan();
        assert_eq!(plan.groups.len(), 2);
        assert_eq!(plan.planned_light_count(), 3);
        assert_eq!(plan.skipped_with(SkipReason::MissingLightFields).count(), 1);
        assert_eq!(plan.skipped_with(SkipReason::MissingMasterMatch).count(), 1);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let plan = fixture_plan();
        for name in ["store/plan.json", "store/plan.yaml"] {
            let path = test_output_path(name);
            save(&plan, &path).unwrap();
            assert_eq!(load(&path).unwrap(), plan);
        }
    }

    #[test]
    fn publish_writes_file_and_updates_latest() {
        let path = test_output_path("store/published.json");
        let _ = std::fs::remove_file(&path);
        let store = PlanStore::new(&path);
        assert!(store.latest().is_none());

        let published = store.publish(fixture_plan());

        assert!(path.exists());
        assert_eq!(load(&path).unwrap(), *published);
        let latest = store.latest().unwrap();
        assert!(Arc::ptr_eq(&latest, &published));
        assert!(store.latest().is_some());
    }

    #[test]
    fn publish_survives_unwritable_path() {
        let store = PlanStore::new(test_output_path("store/plan.unsupported"));
        let plan = fixture_plan();

        let published = store.publish(plan.clone());

        assert_eq!(*published, plan);
        assert_eq!(*store.latest().unwrap(), plan);
    }

    #[test]
    fn newer_publish_replaces_latest() {
        let store = PlanStore::new(test_output_path("store/replaced.yaml"));
        let first = store.publish(fixture_plan());
        let second = store.publish(CalibrationPlan::empty(Utc::now()));

        assert!(Arc::ptr_eq(&store.latest().unwrap(), &second));
        assert_eq!(first.groups.len(), 2);
        assert!(store.latest().unwrap().groups.is_empty());
    }

    #[test]
    fn load_missing_plan_fails() {
        let err = load(test_output_path("store/missing.json")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn store_path_from_config() {
        let config = Config::default();
        assert_eq!(PlanStore::from_config(&config).path(), Path::new("calibration_plan.json"));
    }
}
