//! Content-type schemas.

use crate::value::LinkKind;
use serde::{Deserialize, Serialize};

/// The type tag of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Short text.
    Symbol,
    /// Long text.
    Text,
    /// Integer number.
    Integer,
    /// Floating-point number.
    Number,
    /// Boolean.
    Boolean,
    /// ISO-8601 date.
    Date,
    /// Arbitrary structured payload.
    Object,
    /// Single reference to another resource.
    Link,
    /// Ordered list; elements are scalars or references depending on
    /// the item declaration.
    Array,
}

/// A single field definition within a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field id, the key into an entry's field table.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Type tag.
    pub field_type: FieldType,
    /// Declared target kind, when `field_type` is `Link`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_kind: Option<LinkKind>,
    /// Declared element target kind, when `field_type` is `Array` and
    /// the elements are references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_link_kind: Option<LinkKind>,
    /// Whether the field is disabled for delivery.
    #[serde(default)]
    pub disabled: bool,
    /// Whether the field carries per-locale values.
    #[serde(default)]
    pub localized: bool,
}

impl FieldDef {
    /// Creates a scalar field definition.
    pub fn scalar(id: impl Into<String>, field_type: FieldType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            field_type,
            link_kind: None,
            item_link_kind: None,
            disabled: false,
            localized: false,
        }
    }

    /// Creates a single-link field definition.
    pub fn link(id: impl Into<String>, target: LinkKind) -> Self {
        let mut def = Self::scalar(id, FieldType::Link);
        def.link_kind = Some(target);
        def
    }

    /// Creates a list-of-links field definition.
    pub fn link_list(id: impl Into<String>, target: LinkKind) -> Self {
        let mut def = Self::scalar(id, FieldType::Array);
        def.item_link_kind = Some(target);
        def
    }

    /// The reference target of a single-link field.
    pub fn single_link_target(&self) -> Option<LinkKind> {
        if self.field_type == FieldType::Link {
            self.link_kind
        } else {
            None
        }
    }

    /// The element reference target of a list-of-links field.
    pub fn link_list_target(&self) -> Option<LinkKind> {
        if self.field_type == FieldType::Array {
            self.item_link_kind
        } else {
            None
        }
    }
}

/// A content-type schema: the field definitions governing one class of
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeSchema {
    /// Content-type id, referenced from entries' system attributes.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// The field whose value represents an entry in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    /// Ordered field definitions.
    pub fields: Vec<FieldDef>,
}

impl ContentTypeSchema {
    /// Creates a schema with no fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_field: None,
            fields: Vec::new(),
        }
    }

    /// Appends a field definition.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks up a field definition by id.
    pub fn field(&self, id: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.id == id)
    }
}
