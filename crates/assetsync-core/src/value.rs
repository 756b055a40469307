//! Retrieved item values and their on-disk byte representation.

use anyhow::Result;
use serde_json::Value;

/// Shape of a value fetched from a store, resolved once per item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue {
    /// Raw bytes, written unchanged.
    Blob(Vec<u8>),
    /// A JSON mapping or sequence, written as two-space indented JSON.
    Structured(Value),
    /// A string or scalar, written as its plain string form.
    Primitive(String),
}

impl ItemValue {
    /// Classify a decoded JSON value. `null` counts as absent.
    pub fn from_json(value: Value) -> Option<ItemValue> {
        match value {
            Value::Null => None,
            Value::Object(_) | Value::Array(_) => Some(ItemValue::Structured(value)),
            Value::String(s) => Some(ItemValue::Primitive(s)),
            Value::Bool(b) => Some(ItemValue::Primitive(b.to_string())),
            Value::Number(n) => Some(ItemValue::Primitive(n.to_string())),
        }
    }

    /// Bytes to write for this value.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        Ok(match self {
            ItemValue::Blob(bytes) => bytes,
            ItemValue::Structured(value) => serde_json::to_vec_pretty(&value)?,
            ItemValue::Primitive(text) => text.into_bytes(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ItemValue::Blob(_) => "blob",
            ItemValue::Structured(_) => "structured",
            ItemValue::Primitive(_) => "primitive",
        }
    }
}

impl From<Vec<u8>> for ItemValue {
    fn from(bytes: Vec<u8>) -> Self {
        ItemValue::Blob(bytes)
    }
}

impl From<String> for ItemValue {
    fn from(text: String) -> Self {
        ItemValue::Primitive(text)
    }
}

impl From<&str> for ItemValue {
    fn from(text: &str) -> Self {
        ItemValue::Primitive(text.to_string())
    }
}
