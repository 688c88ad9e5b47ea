//! Loose-typed ingestion of indexer output.
//!
//! Metadata indexers emit numbers either as JSON numbers or as header strings
//! (`"100"`, `"-10.0"`). Everything is normalized here, once, so matching can
//! compare plain integers and strings.

use std::str::FromStr;

use serde::Deserialize;

use super::{FrameRecord, FrameType};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum LooseValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl LooseValue {
    /// Non-blank text form, kept verbatim. Booleans are not meaningful text.
    pub(crate) fn to_text(&self) -> Option<String> {
        match self {
            LooseValue::Text(s) if s.trim().is_empty() => None,
            LooseValue::Text(s) => Some(s.clone()),
            LooseValue::Int(i) => Some(i.to_string()),
            LooseValue::Float(f) if f.is_finite() => Some(f.to_string()),
            LooseValue::Float(_) | LooseValue::Bool(_) => None,
        }
    }

    /// Integer form; fractional values are truncated toward zero.
    pub(crate) fn to_int(&self) -> Option<i64> {
        match self {
            LooseValue::Int(i) => Some(*i),
            LooseValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            LooseValue::Text(s) => parse_leading_int(s),
            LooseValue::Float(_) | LooseValue::Bool(_) => None,
        }
    }

    pub(crate) fn to_float(&self) -> Option<f64> {
        match self {
            LooseValue::Int(i) => Some(*i as f64),
            LooseValue::Float(f) if f.is_finite() => Some(*f),
            LooseValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            LooseValue::Float(_) | LooseValue::Bool(_) => None,
        }
    }
}

/// Parses the leading integer of `text`: optional whitespace, an optional
/// sign, then decimal digits. Anything after the digits is ignored, so
/// `"-10.4"` is -10 and `"100e"` is 100; `"abc"` has no integer.
pub(crate) fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let value = rest[..digits_len].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Wire shape of one frame record as produced by an indexer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFrameRecord {
    path: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default, rename = "type")]
    frame_type: Option<LooseValue>,
    #[serde(default)]
    setup: Option<LooseValue>,
    #[serde(default)]
    object: Option<LooseValue>,
    #[serde(default)]
    filter: Option<LooseValue>,
    #[serde(default)]
    readout: Option<LooseValue>,
    #[serde(default)]
    gain: Option<LooseValue>,
    #[serde(default)]
    offset: Option<LooseValue>,
    #[serde(default)]
    usb: Option<LooseValue>,
    #[serde(default)]
    binning: Option<LooseValue>,
    #[serde(default)]
    temp_c: Option<LooseValue>,
    #[serde(default)]
    exposure_sec: Option<LooseValue>,
    #[serde(default)]
    date: Option<LooseValue>,
}

fn text(value: &Option<LooseValue>) -> Option<String> {
    value.as_ref().and_then(LooseValue::to_text)
}

fn int(value: &Option<LooseValue>) -> Option<i64> {
    value.as_ref().and_then(LooseValue::to_int)
}

impl From<RawFrameRecord> for FrameRecord {
    fn from(raw: RawFrameRecord) -> Self {
        let filename = raw
            .filename
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| file_name_of(&raw.path));

        FrameRecord {
            frame_type: text(&raw.frame_type).and_then(|t| FrameType::from_str(&t).ok()),
            setup: text(&raw.setup),
            object: text(&raw.object),
            filter: text(&raw.filter),
            readout: text(&raw.readout),
            gain: int(&raw.gain),
            offset: int(&raw.offset),
            usb: int(&raw.usb),
            binning: text(&raw.binning),
            temp_c: int(&raw.temp_c),
            exposure_sec: raw.exposure_sec.as_ref().and_then(LooseValue::to_float),
            date: text(&raw.date),
            path: raw.path,
            filename,
        }
    }
}

fn file_name_of(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}
