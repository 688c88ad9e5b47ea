use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::file_format::FileFormat;

#[derive(Debug, thiserror::Error)]
pub enum SerdeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SerdeError>;

pub fn serialize<T: Serialize>(value: &T, format: FileFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    serialize_into(value, format, &mut buffer)?;
    Ok(buffer)
}

/// Writes `value` as text, always terminated by a single newline.
pub fn serialize_into<T: Serialize, W: Write>(
    value: &T,
    format: FileFormat,
    writer: &mut W,
) -> Result<()> {
    let mut text = match format {
        FileFormat::Yaml => serde_yml::to_string(value)?,
        FileFormat::Json => serde_json::to_string_pretty(value)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    writer.write_all(text.as_bytes())?;
    Ok(())
}

pub fn deserialize<T: DeserializeOwned + 'static>(serialized: &[u8], format: FileFormat) -> Result<T> {
    let text = std::str::from_utf8(serialized)?;
    match format {
        FileFormat::Yaml => Ok(serde_yml::from_str(text)?),
        FileFormat::Json => Ok(serde_json::from_str(text)?),
    }
}
