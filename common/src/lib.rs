pub mod file_format;
pub mod key_index_vec;
pub mod log_setup;
pub mod serde;
pub mod slot;
pub mod test_utils;

pub use file_format::{FileExtensionError, FileFormat};
pub use key_index_vec::{KeyIndexKey, KeyIndexRestore, KeyIndexVec};
pub use log_setup::{setup_logging, LogSetupError};
pub use crate::serde::SerdeError;
pub use slot::Slot;
