#![forbid(unsafe_code)]

//! HBnB Runtime
//!
//! Persists the engine's identity map to a JSON file and drives it from
//! a line-oriented command interpreter.
//!
//! No record semantics live here; kinds, records and the identity map
//! come from `hbnb_engine`.

pub mod error;
pub mod storage_codec;
pub mod file_storage;
pub mod shared;
pub mod command;
pub mod interpreter;
pub mod console;
pub mod config;
pub mod logging;

pub use config::ConsoleConfig;
pub use console::run_console;
pub use error::{CommandError, ConsoleError, StorageError};
pub use file_storage::FileStorage;
pub use interpreter::{Interpreter, Outcome};
pub use shared::SharedStorage;
