//! Storage codec: identity map ⇄ JSON text.
//!
//! Pure codec layer. No file I/O here.
//!
//! - `encode_storage`:  IdentityMap → JSON object keyed by `<kind>.<id>`
//! - `decode_storage`:  JSON text → records (strict, all-or-nothing)
//! - `restore_storage`: decode + register into an identity map
//!
//! Each entry carries `id`, `created_at`, `updated_at`, every attribute,
//! then `__class__`. There is no schema version field.

use serde_json::{Map, Value};

use hbnb_engine::record::{format_timestamp, parse_timestamp};
use hbnb_engine::{AttrValue, Attributes, IdentityMap, KindRegistry, Record};

use crate::error::StorageError;

/// Field holding the kind tag in each stored entry.
pub const CLASS_FIELD: &str = "__class__";

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Encode one record as a JSON object.
pub fn encode_record(record: &Record) -> Result<Map<String, Value>, StorageError> {
    let mut obj = Map::new();
    obj.insert("id".to_string(), Value::String(record.id().to_string()));
    obj.insert(
        "created_at".to_string(),
        Value::String(format_timestamp(&record.created_at())),
    );
    obj.insert(
        "updated_at".to_string(),
        Value::String(format_timestamp(&record.updated_at())),
    );
    for (name, value) in record.attributes().iter() {
        let encoded = serde_json::to_value(value).map_err(StorageError::Serialization)?;
        obj.insert(name.to_string(), encoded);
    }
    obj.insert(
        CLASS_FIELD.to_string(),
        Value::String(record.kind().to_string()),
    );
    Ok(obj)
}

/// Encode the whole identity map, in listing order. No whitespace.
pub fn encode_storage(map: &IdentityMap) -> Result<String, StorageError> {
    let mut root = Map::new();
    for record in map.iter() {
        root.insert(record.key().to_string(), Value::Object(encode_record(record)?));
    }
    serde_json::to_string(&Value::Object(root)).map_err(StorageError::Serialization)
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Rebuild one record from its stored entry.
///
/// The stored id and timestamps are used verbatim. The key must equal
/// `<__class__>.<id>`.
pub fn decode_record(
    key: &str,
    entry: &Value,
    registry: &KindRegistry,
) -> Result<Record, StorageError> {
    let obj = entry.as_object().ok_or_else(|| invalid(key, "entry is not an object"))?;

    let kind = required_str(key, obj, CLASS_FIELD)?;
    let id = required_str(key, obj, "id")?;
    let created_raw = required_str(key, obj, "created_at")?;
    let updated_raw = required_str(key, obj, "updated_at")?;

    let expected_key = format!("{}.{}", kind, id);
    if key != expected_key {
        return Err(invalid(key, &format!("key does not match {:?}", expected_key)));
    }

    let schema = registry.require(kind).map_err(|source| engine(key, source))?;
    let created_at = parse_timestamp("created_at", created_raw).map_err(|source| engine(key, source))?;
    let updated_at = parse_timestamp("updated_at", updated_raw).map_err(|source| engine(key, source))?;

    let mut attributes = Attributes::new();
    for (name, value) in obj {
        if matches!(name.as_str(), "id" | "created_at" | "updated_at" | CLASS_FIELD) {
            continue;
        }
        let value = AttrValue::from_json(name, value).map_err(|source| engine(key, source))?;
        attributes.insert(name.clone(), value);
    }

    Record::restore(schema, id, created_at, updated_at, attributes)
        .map_err(|source| engine(key, source))
}

/// Decode every entry. Fails on the first bad entry; nothing is partial.
pub fn decode_storage(json: &str, registry: &KindRegistry) -> Result<Vec<Record>, StorageError> {
    let root: Value = serde_json::from_str(json)
        .map_err(|e| StorageError::Deserialization(e.to_string()))?;
    let entries = root.as_object().ok_or_else(|| {
        StorageError::Deserialization("top level is not a JSON object".to_string())
    })?;

    entries
        .iter()
        .map(|(key, entry)| decode_record(key, entry, registry))
        .collect()
}

/// Decode and register into `map`. Returns the number of records loaded.
///
/// `map` is untouched when decoding fails.
pub fn restore_storage(
    json: &str,
    registry: &KindRegistry,
    map: &mut IdentityMap,
) -> Result<usize, StorageError> {
    let records = decode_storage(json, registry)?;
    let loaded = records.len();
    for record in records {
        map.register(record);
    }
    Ok(loaded)
}

fn required_str<'a>(
    key: &str,
    obj: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, StorageError> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(invalid(key, &format!("{} is not a string", field))),
        None => Err(invalid(key, &format!("missing {}", field))),
    }
}

fn invalid(key: &str, reason: &str) -> StorageError {
    StorageError::InvalidEntry {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn engine(key: &str, source: hbnb_engine::EngineError) -> StorageError {
    StorageError::Engine {
        key: key.to_string(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
