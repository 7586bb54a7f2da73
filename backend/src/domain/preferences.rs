//! Preference documents and their wire shapes.
//!
//! A preference document is an arbitrary JSON object owned by one user. It
//! arrives either flat (`{"one":"two"}`) or wrapped under a `preferences` key
//! (`{"preferences":{"one":"two"}}`); both normalise to the same document at
//! the input boundary. The store only ever sees the flat canonical text.
//!
//! Keys serialise in `serde_json`'s map order, which is lexical.

use std::fmt;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::UserId;

/// Key under which the wrapped representation nests the document.
pub const WRAPPER_KEY: &str = "preferences";

/// Failure to interpret text as a preference document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreferenceParseError {
    /// The text is not valid JSON.
    #[error("preferences are not valid JSON: {message}")]
    Malformed { message: String },
    /// The text is valid JSON but not an object.
    #[error("preferences must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

impl From<serde_json::Error> for PreferenceParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed {
            message: err.to_string(),
        }
    }
}

/// Representation used when serialising a document for a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PreferenceShape {
    /// The document itself with no enclosing key.
    #[default]
    Flat,
    /// The document nested under [`WRAPPER_KEY`].
    Wrapped,
}

/// HTTP method that carried a write. Both methods insert or update based on
/// whether a document already exists; the method is kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteMethod {
    /// `PUT /{username}`.
    Put,
    /// `POST /{username}`.
    Post,
}

impl fmt::Display for WriteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put => f.write_str("PUT"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// One stored preference row.
///
/// At most one record exists per user; `preferences` is opaque text that the
/// store never interprets and may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceRecord {
    /// Storage identifier assigned on insert.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// JSON-encoded document text.
    pub preferences: Option<String>,
}

/// A user's preference document: a JSON object of arbitrary settings.
///
/// # Examples
/// ```
/// use user_preferences::domain::{PreferenceDocument, PreferenceShape};
///
/// let doc = PreferenceDocument::from_payload(br#"{"preferences":{"one":"two"}}"#)
///     .expect("valid payload");
/// assert_eq!(doc.clone().render(PreferenceShape::Flat), r#"{"one":"two"}"#);
/// assert_eq!(
///     doc.render(PreferenceShape::Wrapped),
///     r#"{"preferences":{"one":"two"}}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceDocument(Map<String, Value>);

impl PreferenceDocument {
    /// Parse a request body. Arrays, scalars, `null` and malformed JSON are
    /// rejected; a sole `preferences` object is unwrapped.
    pub fn from_payload(raw: &[u8]) -> Result<Self, PreferenceParseError> {
        match serde_json::from_slice::<Value>(raw)? {
            Value::Object(entries) => Ok(Self::unwrap_envelope(entries)),
            other => Err(PreferenceParseError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Interpret text read back from the store.
    ///
    /// Missing, blank and `null` text all yield an empty document.
    pub fn from_stored(text: Option<&str>) -> Result<Self, PreferenceParseError> {
        let Some(text) = text.filter(|value| !value.trim().is_empty()) else {
            return Ok(Self::default());
        };
        match serde_json::from_str::<Value>(text)? {
            Value::Null => Ok(Self::default()),
            Value::Object(entries) => Ok(Self::unwrap_envelope(entries)),
            other => Err(PreferenceParseError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    fn unwrap_envelope(mut entries: Map<String, Value>) -> Self {
        if entries.len() == 1 {
            match entries.remove(WRAPPER_KEY) {
                Some(Value::Object(inner)) => return Self(inner),
                Some(other) => {
                    entries.insert(WRAPPER_KEY.to_owned(), other);
                }
                None => {}
            }
        }
        Self(entries)
    }

    /// Number of top-level settings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document holds no settings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a top-level setting.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Flat JSON text persisted by the store.
    pub fn to_canonical_text(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Serialise in the requested shape, without a trailing newline.
    pub fn render(self, shape: PreferenceShape) -> String {
        self.into_value(shape).to_string()
    }

    /// Convert into a JSON value in the requested shape.
    pub fn into_value(self, shape: PreferenceShape) -> Value {
        match shape {
            PreferenceShape::Flat => Value::Object(self.0),
            PreferenceShape::Wrapped => {
                let mut envelope = Map::with_capacity(1);
                envelope.insert(WRAPPER_KEY.to_owned(), Value::Object(self.0));
                Value::Object(envelope)
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
