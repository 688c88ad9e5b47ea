//! Normalized frame metadata shared by lights and calibration masters.

mod loose;


use std::path::Path;

use chrono::NaiveDate;
use common::FileFormat;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::date::parse_date;
use crate::document::read_document;
use crate::error::{Error, Result};

/// Type tag of an indexed frame.
///
/// Tags are matched exactly in their upper-case form (`"LIGHT"`, `"BIAS"`,
/// `"DARK"`, `"FLAT"`); any other tag leaves the record untyped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum FrameType {
    /// Science exposure to be calibrated
    Light,
    /// Master bias - readout offset
    Bias,
    /// Master dark - thermal signal at a given exposure
    Dark,
    /// Master flat - optical response of the setup
    Flat,
}

/// Metadata of one light or master frame, already normalized.
///
/// Absent fields are `None`; empty strings and nulls from the indexer are
/// absent too. Integer fields hold parsed integers regardless of how the
/// indexer typed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "loose::RawFrameRecord")]
pub struct FrameRecord {
    pub path: String,
    pub filename: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub frame_type: Option<FrameType>,
    /// Telescope + instrument identity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Camera readout mode label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// USB traffic limit setting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb: Option<i64>,
    /// "NxM"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binning: Option<String>,
    /// Sensor temperature, whole degrees Celsius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_sec: Option<f64>,
    /// "YYYY-MM-DD", possibly followed by a time of day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl FrameRecord {
    /// Observation day, if the date is present and parses.
    pub fn observation_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date)
    }

    /// Exposure as compared between lights and darks: whole seconds.
    pub fn exposure_key(&self) -> Option<i64> {
        self.exposure_sec.map(|e| e.trunc() as i64)
    }
}

/// An indexer document: `{ "items": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameCollection {
    #[serde(default)]
    pub items: Vec<FrameRecord>,
}

impl FrameCollection {
    pub fn new(items: Vec<FrameRecord>) -> Self {
        Self { items }
    }

    /// Loads a JSON or YAML index, chosen by file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let collection: FrameCollection = read_document(path)?;
        tracing::debug!(
            path = %path.display(),
            frames = collection.items.len(),
            "Loaded frame index"
        );
        Ok(collection)
    }

    pub fn from_slice(bytes: &[u8], format: FileFormat) -> Result<Self> {
        common::serde::deserialize(bytes, format).map_err(|source| Error::Parse {
            path: "<memory>".into(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrameRecord> {
        self.items.iter()
    }
}

impl From<Vec<FrameRecord>> for FrameCollection {
    fn from(items: Vec<FrameRecord>) -> Self {
        Self::new(items)
    }
}
