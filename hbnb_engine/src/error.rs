/// HBnB Engine: Errors
///
/// Failures raised while building or restoring records. The engine never
/// touches the filesystem, so none of these are I/O errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// The kind tag is not in the registry.
    #[error("unknown record kind {0:?}")]
    UnknownKind(String),

    /// A timestamp string could not be parsed.
    #[error("invalid {field} timestamp {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },

    /// `updated_at` precedes `created_at`.
    #[error("updated_at {updated_at} precedes created_at {created_at}")]
    TimestampOrder {
        created_at: String,
        updated_at: String,
    },

    /// A JSON value has no attribute representation (only `null` today).
    #[error("unsupported attribute value for {name:?}: {reason}")]
    UnsupportedValue { name: String, reason: String },
}
