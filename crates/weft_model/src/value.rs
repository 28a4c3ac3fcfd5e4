//! Raw field values and link stubs.

use serde::{Deserialize, Serialize};

/// The kind of resource a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// Link to an asset.
    Asset,
    /// Link to an entry.
    Entry,
}

/// An unresolved pointer to another resource.
///
/// A link stub carries only the target's declared kind and id. Whether
/// the target is actually reachable is decided at resolution time: the
/// graph resolver prunes links whose targets are absent from the batch,
/// so every link that survives resolution can be followed through the
/// owning snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Target resource kind.
    pub kind: LinkKind,
    /// Target resource id.
    pub id: String,
}

impl Link {
    /// Creates a link to an entry.
    pub fn to_entry(id: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::Entry,
            id: id.into(),
        }
    }

    /// Creates a link to an asset.
    pub fn to_asset(id: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::Asset,
            id: id.into(),
        }
    }
}

/// A raw per-locale field value.
///
/// The wire format stores every field as `fieldId → locale → value`,
/// where a value is a scalar, a list, or a link stub. Representing the
/// three shapes as an enum (rather than an untyped JSON blob) keeps the
/// resolver's pruning logic type-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A list of values (homogeneous in practice: all scalars or all
    /// links, per the field's schema).
    List(Vec<FieldValue>),
    /// A reference to another resource.
    Link(Link),
    /// Any scalar payload (string, number, bool, structured text, ...).
    Scalar(serde_json::Value),
}

impl FieldValue {
    /// Creates a scalar text value.
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Scalar(serde_json::Value::String(value.into()))
    }

    /// Creates a scalar integer value.
    pub fn integer(value: i64) -> Self {
        FieldValue::Scalar(serde_json::Value::from(value))
    }

    /// Returns the scalar payload, if this value is a scalar.
    pub fn as_scalar(&self) -> Option<&serde_json::Value> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the string payload, if this value is a scalar string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(serde_json::Value::as_str)
    }

    /// Returns the integer payload, if this value is a scalar integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(serde_json::Value::as_i64)
    }

    /// Returns the link, if this value is a link stub.
    pub fn as_link(&self) -> Option<&Link> {
        match self {
            FieldValue::Link(link) => Some(link),
            _ => None,
        }
    }

    /// Returns the element list, if this value is a list.
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Link> for FieldValue {
    fn from(link: Link) -> Self {
        FieldValue::Link(link)
    }
}
