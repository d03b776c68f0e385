/// HBnB Engine: Record Kinds
///
/// The registry is the injection point for record schemas. A kind is a
/// name plus seed defaults; defaults never close the attribute set.

use crate::error::EngineError;
use crate::value::{AttrValue, Attributes};

/// Name and declared default attributes of one record kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindSchema {
    name: String,
    defaults: Attributes,
}

impl KindSchema {
    pub fn new(name: impl Into<String>, defaults: Attributes) -> Self {
        Self {
            name: name.into(),
            defaults,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &Attributes {
        &self.defaults
    }
}

/// Lookup from kind name to schema. Registration order is kept.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: Vec<KindSchema>,
}

impl KindRegistry {
    /// An empty registry; every kind is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven HBnB kinds with their stock defaults.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(KindSchema::new("BaseModel", Attributes::new()));
        registry.register(KindSchema::new(
            "User",
            text_defaults(&["email", "password", "first_name", "last_name"]),
        ));
        registry.register(KindSchema::new("State", text_defaults(&["name"])));
        registry.register(KindSchema::new(
            "City",
            text_defaults(&["state_id", "name"]),
        ));
        registry.register(KindSchema::new("Amenity", text_defaults(&["name"])));

        let mut place = text_defaults(&["city_id", "user_id", "name", "description"]);
        for field in ["number_rooms", "number_bathrooms", "max_guest", "price_by_night"] {
            place.insert(field, AttrValue::Int(0));
        }
        place.insert("latitude", AttrValue::Float(0.0));
        place.insert("longitude", AttrValue::Float(0.0));
        place.insert("amenity_ids", AttrValue::List(Vec::new()));
        registry.register(KindSchema::new("Place", place));

        registry.register(KindSchema::new(
            "Review",
            text_defaults(&["place_id", "user_id", "text"]),
        ));
        registry
    }

    /// Add or replace a kind.
    pub fn register(&mut self, schema: KindSchema) {
        match self.kinds.iter_mut().find(|k| k.name == schema.name) {
            Some(slot) => *slot = schema,
            None => self.kinds.push(schema),
        }
    }

    pub fn get(&self, name: &str) -> Option<&KindSchema> {
        self.kinds.iter().find(|k| k.name == name)
    }

    /// Like `get`, but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<&KindSchema, EngineError> {
        self.get(name)
            .ok_or_else(|| EngineError::UnknownKind(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(|k| k.name.as_str())
    }
}

fn text_defaults(fields: &[&str]) -> Attributes {
    fields
        .iter()
        .map(|f| (f.to_string(), AttrValue::Text(String::new())))
        .collect()
}
