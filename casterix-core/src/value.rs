//! Decoded output model.
//!
//! Decoding emits plain data: a [`Record`](crate::Record) holds
//! [`ItemValue`]s, which bottom out in [`DecodedField`]s. Field and item
//! names are interned [`Arc<str>`]s cloned out of the catalog, so emission
//! never allocates key strings. All types derive [`serde::Serialize`] so a
//! caller can feed any serializer; rendering beyond that is out of scope.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// A single extracted field value, already interpreted per its encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Zero-extended unsigned integer (scale 1).
    Unsigned(u64),
    /// Sign-extended two's-complement integer (scale 1).
    Signed(i64),
    /// Scaled numeric value.
    Float(f64),
    /// Six-bit IA-5 or ASCII text.
    Text(String),
    /// Unsigned value rendered in base 8 (Mode-3/A codes and friends).
    Octal(String),
    /// Unsigned value rendered in base 16, zero-padded to the field width.
    Hex(String),
    /// Raw bytes of a byte-aligned field.
    Bytes(Vec<u8>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unsigned(v) => write!(f, "{v}"),
            FieldValue::Signed(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(s) | FieldValue::Octal(s) | FieldValue::Hex(s) => f.write_str(s),
            FieldValue::Bytes(b) => f.write_str(&hex::encode(b)),
        }
    }
}

/// One decoded leaf field: interned name, interpreted value, and the raw
/// integer behind it when the encoding has one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedField {
    pub name: Arc<str>,
    pub value: FieldValue,
    /// Unscaled integer as read off the wire; `None` for byte/text fields
    /// wider than 64 bits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Arc<str>>,
    /// Enumeration label from the field's value table (verbose decode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<Arc<str>>,
}

/// The decoded value of one data item, shaped by its format node.
///
/// - `Fields` -- a fixed part, a merged multi-part variable item, or a BDS
///   register: one flat object of named fields.
/// - `List` -- a repetitive item or a single-part variable item: one entry
///   per repetition/extension, in wire order.
/// - `Object` -- a compound item: present children merged into one object,
///   keyed by child name in indicator order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemValue {
    Fields(Vec<DecodedField>),
    List(Vec<ItemValue>),
    Object(Vec<(Arc<str>, ItemValue)>),
}

impl ItemValue {
    /// Looks a field up by short name, descending into compound children
    /// and list entries in order.
    pub fn field(&self, name: &str) -> Option<&DecodedField> {
        match self {
            ItemValue::Fields(fields) => fields.iter().find(|f| f.name.as_ref() == name),
            ItemValue::List(entries) => entries.iter().find_map(|e| e.field(name)),
            ItemValue::Object(children) => children.iter().find_map(|(_, v)| v.field(name)),
        }
    }

    /// Returns the named child of a compound item.
    pub fn child(&self, name: &str) -> Option<&ItemValue> {
        match self {
            ItemValue::Object(children) => children
                .iter()
                .find(|(n, _)| n.as_ref() == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Number of entries of a list-shaped value; 0 otherwise.
    pub fn repetitions(&self) -> usize {
        match self {
            ItemValue::List(entries) => entries.len(),
            _ => 0,
        }
    }
}
