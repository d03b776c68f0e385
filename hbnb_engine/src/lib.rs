#![forbid(unsafe_code)]

//! HBnB Engine
//!
//! Typed records, the kind registry and the identity map. Pure in-memory
//! state; persistence and the command interpreter live in `hbnb_runtime`.

pub mod error;
pub mod value;
pub mod kinds;
pub mod record;
pub mod identity_map;

pub use error::EngineError;
pub use identity_map::IdentityMap;
pub use kinds::{KindRegistry, KindSchema};
pub use record::{Record, RecordKey};
pub use value::{coerce, AttrValue, Attributes};
