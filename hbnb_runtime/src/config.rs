//! Console configuration.
//!
//! Built by the binary and handed down; nothing is read from flags or
//! the environment. `RUST_LOG` only affects diagnostics on stderr.

use std::path::PathBuf;

use crate::file_storage::DEFAULT_STORAGE_PATH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// JSON artifact the identity map is persisted to.
    pub storage_path: PathBuf,
    /// Shown before each line when input is a terminal.
    pub prompt: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            prompt: "(hbnb) ".to_string(),
        }
    }
}
