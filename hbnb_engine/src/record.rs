/// HBnB Engine: Records
///
/// A record is a kind tag, an id, two timestamps and an open attribute
/// map. `kind` and `id` are fixed at construction; `created_at` never
/// moves; `updated_at` only moves forward.

use std::fmt;

use chrono::{Local, NaiveDateTime, SubsecRound};
use uuid::Uuid;

use crate::error::EngineError;
use crate::kinds::KindSchema;
use crate::value::{quote_text, AttrValue, Attributes};

/// Encoding for `created_at` / `updated_at`: ISO-8601, microseconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Attribute names `set` refuses to write.
pub const PROTECTED_FIELDS: [&str; 5] = ["id", "created_at", "updated_at", "__class__", "kind"];

pub fn is_protected(name: &str) -> bool {
    PROTECTED_FIELDS.contains(&name)
}

/// Current local time, truncated to what the encoding keeps.
fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse an ISO-8601 timestamp with any (or no) fractional precision.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, EngineError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|_| EngineError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Composite key
// ---------------------------------------------------------------------------

/// Identity map key, rendered `<kind>.<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub kind: String,
    pub id: String,
}

impl RecordKey {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.id)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: String,
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    attributes: Attributes,
}

impl Record {
    /// A fresh record: new UUID v4, both timestamps now, kind defaults seeded.
    pub fn new(schema: &KindSchema) -> Self {
        let ts = now();
        Self {
            kind: schema.name().to_string(),
            id: Uuid::new_v4().to_string(),
            created_at: ts,
            updated_at: ts,
            attributes: schema.defaults().clone(),
        }
    }

    /// Rebuild a stored record verbatim. Defaults are seeded first so
    /// stored attributes win; nothing is generated.
    pub fn restore(
        schema: &KindSchema,
        id: impl Into<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
        stored: Attributes,
    ) -> Result<Self, EngineError> {
        if updated_at < created_at {
            return Err(EngineError::TimestampOrder {
                created_at: format_timestamp(&created_at),
                updated_at: format_timestamp(&updated_at),
            });
        }

        let mut attributes = schema.defaults().clone();
        for (name, value) in stored.iter() {
            attributes.insert(name, value.clone());
        }

        Ok(Self {
            kind: schema.name().to_string(),
            id: id.into(),
            created_at,
            updated_at,
            attributes,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.kind.clone(), self.id.clone())
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Store an attribute. Protected names are refused and `false` is
    /// returned. Does not bump `updated_at`; call `touch` once per mutation.
    pub fn set(&mut self, name: &str, value: AttrValue) -> bool {
        if is_protected(name) {
            return false;
        }
        self.attributes.insert(name, value);
        true
    }

    /// Bump `updated_at` to now, never backwards.
    pub fn touch(&mut self) {
        self.updated_at = now().max(self.updated_at);
    }
}

/// `[<kind>] (<id>) {'id': ..., 'created_at': ..., 'updated_at': ..., ...}`
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {{'id': {}, 'created_at': {}, 'updated_at': {}",
            self.kind,
            self.id,
            quote_text(&self.id),
            quote_text(&format_timestamp(&self.created_at)),
            quote_text(&format_timestamp(&self.updated_at)),
        )?;
        for (name, value) in self.attributes.iter() {
            write!(f, ", {}: {}", quote_text(name), value.repr())?;
        }
        write!(f, "}}")
    }
}
