//! Reading and writing serde documents whose format follows the file extension.

use std::path::Path;

use common::FileFormat;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

pub(crate) fn read_document<T: DeserializeOwned + 'static>(path: &Path) -> Result<T> {
    let format = FileFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    common::serde::deserialize(&bytes, format).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_document<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let format = FileFormat::from_path(path)?;
    let bytes = common::serde::serialize(value, format).map_err(Error::Serialize)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
