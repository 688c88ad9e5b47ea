//! Calibra - calibration planning for astrophotography sessions.
//!
//! Given an index of light frames and an index of calibration masters, the
//! crate picks a master bias, dark and flat for every light and groups lights
//! that can be calibrated together:
//! - Frame metadata ingestion with loose numeric typing
//! - Per-type validation of lights and masters
//! - Date-aware bias, dark and flat selection
//! - Deterministic calibration plans, persisted as JSON or YAML
//! - Cosmetic and integration batches derived from a plan
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use calibra::{FrameCollection, PlanBuilder};
//!
//! let lights = FrameCollection::from_file("lights.json")?;
//! let masters = FrameCollection::from_file("masters.json")?;
//!
//! let plan = PlanBuilder::default().build(&lights.items, &masters.items);
//! println!("{} groups, {} skipped", plan.groups.len(), plan.skipped.len());
//! ```

pub mod config;
pub mod date;
mod document;
pub mod error;
pub mod frame;
pub mod plan;
pub mod select;
pub mod stages;
pub mod store;
pub mod validate;

// ============================================================================
// Frames
// ============================================================================

pub use frame::{FrameCollection, FrameRecord, FrameType};
pub use validate::{is_valid, is_valid_bias, is_valid_dark, is_valid_flat, is_valid_light};

// ============================================================================
// Selection
// ============================================================================

pub use select::{
    select_bias, select_dark, select_flat, MasterPools, Selection, DEFAULT_FLAT_WINDOW_DAYS,
};

// ============================================================================
// Plans
// ============================================================================

pub use plan::{
    build_plan, CalibrationGroup, CalibrationPlan, PlanBuilder, SkipReason, SkippedLight,
};
pub use store::PlanStore;

// ============================================================================
// Stages
// ============================================================================

pub use stages::{
    cosmetic_plan, integration_plan, CosmeticPlan, IntegrationPlan, OutputNaming,
};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::Config;
pub use error::{Error, Result};
