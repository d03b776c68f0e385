//! Runtime error types.
//!
//! `CommandError` is operator input gone wrong: recovered, printed, loop
//! continues. `StorageError` means the artifact could not be read or
//! written and is never swallowed.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use hbnb_engine::EngineError;

/// Validation failures. `Display` is the exact line shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("** class name missing **")]
    MissingKind,
    #[error("** class doesn't exist **")]
    UnknownKind,
    #[error("** instance id missing **")]
    MissingId,
    #[error("** no instance found **")]
    NoInstance,
    #[error("** attribute name missing **")]
    MissingAttribute,
    #[error("** value missing **")]
    MissingValue,
    #[error("** invalid dictionary **")]
    InvalidDictionary,
}

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Not valid JSON, or not a JSON object at the top level.
    #[error("malformed storage file: {0}")]
    Deserialization(String),

    /// Structurally wrong entry: missing fields, key mismatch.
    #[error("invalid entry {key:?}: {reason}")]
    InvalidEntry { key: String, reason: String },

    /// The engine refused to rebuild an entry (unknown kind, bad timestamp).
    #[error("invalid entry {key:?}: {source}")]
    Engine {
        key: String,
        #[source]
        source: EngineError,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> StorageError {
        let path = path.into();
        move |source| StorageError::Io { path, source }
    }
}

/// Fatal errors out of the console loop.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reading input or writing output failed.
    #[error("console I/O error: {0}")]
    Terminal(#[from] io::Error),
}
