/// HBnB Engine: Attribute Values
///
/// Records carry an open, ordered attribute map. Values are a closed
/// tagged union; text typed at the console is converted by `coerce`
/// and nowhere else.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::EngineError;

/// A dynamically typed attribute value.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AttrValue>),
    Map(Attributes),
}

impl AttrValue {
    /// Convert a decoded JSON value. `null` has no representation.
    pub fn from_json(name: &str, value: &Value) -> Result<Self, EngineError> {
        match value {
            Value::Null => Err(EngineError::UnsupportedValue {
                name: name.to_string(),
                reason: "null".to_string(),
            }),
            Value::Bool(b) => Ok(AttrValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(AttrValue::Int(i)),
                None => n.as_f64().map(AttrValue::Float).ok_or_else(|| {
                    EngineError::UnsupportedValue {
                        name: name.to_string(),
                        reason: format!("number {} out of range", n),
                    }
                }),
            },
            Value::String(s) => Ok(AttrValue::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| AttrValue::from_json(name, item))
                .collect::<Result<Vec<_>, _>>()
                .map(AttrValue::List),
            Value::Object(obj) => {
                let mut nested = Attributes::new();
                for (key, item) in obj {
                    nested.insert(key.clone(), AttrValue::from_json(key, item)?);
                }
                Ok(AttrValue::Map(nested))
            }
        }
    }

    /// Dictionary-literal rendering used in record strings.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) {
        match self {
            AttrValue::Bool(true) => out.push_str("True"),
            AttrValue::Bool(false) => out.push_str("False"),
            AttrValue::Int(i) => out.push_str(&i.to_string()),
            AttrValue::Float(f) => out.push_str(&float_repr(*f)),
            AttrValue::Text(s) => out.push_str(&quote_text(s)),
            AttrValue::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_repr(out);
                }
                out.push(']');
            }
            AttrValue::Map(map) => out.push_str(&map.repr()),
        }
    }
}

/// Float literal as a dictionary shows it: `3.0`, `1e+20`, `1.5e-05`.
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    // Debug keeps the fractional part (3.0, not 3) and switches to
    // exponent form at the same magnitudes; only the exponent differs.
    let debug = format!("{:?}", f);
    match debug.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => debug,
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

/// Infer a typed value from console text.
///
///   - digits only                         → Int (Float if it overflows i64)
///   - optional sign + digits, at most one `.` → Float
///   - anything else                       → Text, verbatim
///
/// A signed whole number such as `-3` is not "digits only" and lands in
/// the Float branch.
pub fn coerce(text: &str) -> AttrValue {
    if is_digits(text) {
        if let Ok(i) = text.parse::<i64>() {
            return AttrValue::Int(i);
        }
    }

    if is_decimal(text) {
        if let Some(f) = text.parse::<f64>().ok().filter(|f| f.is_finite()) {
            return AttrValue::Float(f);
        }
    }

    AttrValue::Text(text.to_string())
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Plain decimal notation; no exponent, no `inf`/`nan`.
fn is_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    (!whole.is_empty() || !frac.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

/// Quote text the way a dictionary literal shows it: single quotes,
/// unless the text holds a single quote and no double quote.
pub fn quote_text(s: &str) -> String {
    let delim = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

// ---------------------------------------------------------------------------
// Ordered attribute map
// ---------------------------------------------------------------------------

/// Insertion-ordered map from attribute name to value.
///
/// Overwriting a key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) -> Option<AttrValue> {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `{'name': value, ...}`
    pub fn repr(&self) -> String {
        let mut out = String::from("{");
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&quote_text(k));
            out.push_str(": ");
            v.write_repr(&mut out);
        }
        out.push('}');
        out
    }
}

impl FromIterator<(String, AttrValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
