//! Resource record shapes.

use crate::space::LocaleChain;
use crate::value::{FieldValue, LinkKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-resource raw field storage: `fieldId → localeCode → value`.
pub type FieldTable = BTreeMap<String, BTreeMap<String, FieldValue>>;

/// The kind of a resource, as carried in its system attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A file-backed resource.
    Asset,
    /// A content record with schema-typed fields.
    Entry,
    /// A content-type schema.
    ContentType,
    /// Space metadata.
    Space,
    /// A locale definition.
    Locale,
    /// Deletion marker for an asset.
    DeletedAsset,
    /// Deletion marker for an entry.
    DeletedEntry,
    /// Any kind this client does not model. Tolerated and ignored.
    Other,
}

impl ResourceKind {
    /// Whether this kind is a deletion marker.
    pub fn is_deletion(&self) -> bool {
        matches!(self, ResourceKind::DeletedAsset | ResourceKind::DeletedEntry)
    }

    /// The link kind a deletion marker or live resource of this kind
    /// corresponds to, if any.
    pub fn link_kind(&self) -> Option<LinkKind> {
        match self {
            ResourceKind::Asset | ResourceKind::DeletedAsset => Some(LinkKind::Asset),
            ResourceKind::Entry | ResourceKind::DeletedEntry => Some(LinkKind::Entry),
            _ => None,
        }
    }
}

/// System attributes common to every resource.
///
/// Identity equality is `(kind, id)`; everything the client does not
/// model explicitly stays in the opaque attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysInfo {
    /// Resource id, unique within a space for its kind.
    pub id: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Declared content-type id (entries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Remaining system attributes, kept opaque.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attrs: serde_json::Map<String, serde_json::Value>,
}

impl SysInfo {
    /// Creates system attributes for a resource.
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content_type: None,
            attrs: serde_json::Map::new(),
        }
    }

    /// Identity key: `(kind, id)`.
    pub fn identity(&self) -> (ResourceKind, &str) {
        (self.kind, &self.id)
    }
}

/// A content record with schema-typed, locale-variant fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// System attributes.
    pub sys: SysInfo,
    /// Raw field table, pre-locale-filter. Never touched by
    /// resolution: link stubs stay visible here.
    pub fields: FieldTable,
    /// Working copy of the field table that resolution prunes.
    /// Effective reads go through this once it exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resolved: Option<FieldTable>,
    /// Active locale cursor.
    #[serde(default)]
    locale: String,
    #[serde(skip)]
    chain: Option<Arc<LocaleChain>>,
}

impl Entry {
    /// Creates an entry with the given id and content-type id.
    pub fn new(id: impl Into<String>, content_type: impl Into<String>) -> Self {
        let mut sys = SysInfo::new(ResourceKind::Entry, id);
        sys.content_type = Some(content_type.into());
        Self {
            sys,
            fields: FieldTable::new(),
            resolved: None,
            locale: String::new(),
            chain: None,
        }
    }

    /// Adds a raw field value for a locale.
    pub fn with_field(
        mut self,
        field: impl Into<String>,
        locale: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.fields
            .entry(field.into())
            .or_default()
            .insert(locale.into(), value.into());
        self
    }

    /// Resource id.
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    /// Declared content-type id, if present.
    pub fn content_type_id(&self) -> Option<&str> {
        self.sys.content_type.as_deref()
    }

    /// The raw, unresolved, pre-locale-filter field table.
    pub fn raw_fields(&self) -> &FieldTable {
        &self.fields
    }

    /// The active locale code.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Switches the active locale. O(1), never re-fetches.
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    /// Attaches the space's locale chain and resets the active locale
    /// to the space default. Called by the engine at snapshot build.
    pub fn attach_locales(&mut self, chain: Arc<LocaleChain>) {
        self.locale = chain.default_code().to_owned();
        self.chain = Some(chain);
    }

    /// The field table effective reads go through: the pruned working
    /// copy once resolution has run, the raw table before that.
    pub fn effective_fields(&self) -> &FieldTable {
        self.resolved.as_ref().unwrap_or(&self.fields)
    }

    /// Mutable access to the working copy, creating it from the raw
    /// table on first use. The resolver prunes through this so raw
    /// fields stay pristine.
    pub fn resolved_fields_mut(&mut self) -> &mut FieldTable {
        self.resolved.get_or_insert_with(|| self.fields.clone())
    }

    /// Effective value of `field` under the active locale, walking the
    /// fallback chain. Absent (never an error) when the chain is
    /// exhausted or no chain has been attached and the exact locale has
    /// no value.
    pub fn field(&self, field: &str) -> Option<&FieldValue> {
        let fields = self.effective_fields();
        match &self.chain {
            Some(chain) => chain.resolve(fields, field, &self.locale),
            None => fields.get(field)?.get(&self.locale),
        }
    }

    /// Effective value of `field` under an explicit locale, walking the
    /// fallback chain from there.
    pub fn field_in(&self, field: &str, locale: &str) -> Option<&FieldValue> {
        let fields = self.effective_fields();
        match &self.chain {
            Some(chain) => chain.resolve(fields, field, locale),
            None => fields.get(field)?.get(locale),
        }
    }
}

/// A file-backed resource with locale-variant title/description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// System attributes.
    pub sys: SysInfo,
    /// Raw field table (title, description, file).
    pub fields: FieldTable,
    /// Active locale cursor.
    #[serde(default)]
    locale: String,
    #[serde(skip)]
    chain: Option<Arc<LocaleChain>>,
}

impl Asset {
    /// Creates an asset with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            sys: SysInfo::new(ResourceKind::Asset, id),
            fields: FieldTable::new(),
            locale: String::new(),
            chain: None,
        }
    }

    /// Adds a raw field value for a locale.
    pub fn with_field(
        mut self,
        field: impl Into<String>,
        locale: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.fields
            .entry(field.into())
            .or_default()
            .insert(locale.into(), value.into());
        self
    }

    /// Sets the file payload (url and mime type) for a locale.
    pub fn with_file(self, locale: impl Into<String>, url: &str, mime_type: &str) -> Self {
        let file = serde_json::json!({ "url": url, "contentType": mime_type });
        self.with_field("file", locale, FieldValue::Scalar(file))
    }

    /// Resource id.
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    /// The raw, unresolved, pre-locale-filter field table.
    pub fn raw_fields(&self) -> &FieldTable {
        &self.fields
    }

    /// The active locale code.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Switches the active locale. O(1), never re-fetches.
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    /// Attaches the space's locale chain and resets the active locale
    /// to the space default. Called by the engine at snapshot build.
    pub fn attach_locales(&mut self, chain: Arc<LocaleChain>) {
        self.locale = chain.default_code().to_owned();
        self.chain = Some(chain);
    }

    /// Effective value of `field` under the active locale.
    pub fn field(&self, field: &str) -> Option<&FieldValue> {
        match &self.chain {
            Some(chain) => chain.resolve(&self.fields, field, &self.locale),
            None => self.fields.get(field)?.get(&self.locale),
        }
    }

    /// Effective title under the active locale.
    pub fn title(&self) -> Option<&str> {
        self.field("title")?.as_str()
    }

    /// File url under the active locale.
    pub fn url(&self) -> Option<&str> {
        self.field("file")?.as_scalar()?.get("url")?.as_str()
    }

    /// File mime type under the active locale.
    pub fn mime_type(&self) -> Option<&str> {
        self.field("file")?.as_scalar()?.get("contentType")?.as_str()
    }
}

/// A deletion marker: per-id, per-kind record that a resource was
/// removed since the last delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedResource {
    /// System attributes; kind is `DeletedAsset` or `DeletedEntry`.
    pub sys: SysInfo,
}

impl DeletedResource {
    /// Creates a deleted-asset marker.
    pub fn asset(id: impl Into<String>) -> Self {
        Self {
            sys: SysInfo::new(ResourceKind::DeletedAsset, id),
        }
    }

    /// Creates a deleted-entry marker.
    pub fn entry(id: impl Into<String>) -> Self {
        Self {
            sys: SysInfo::new(ResourceKind::DeletedEntry, id),
        }
    }

    /// Resource id.
    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

/// Anything a page's item list may contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resource {
    /// A live asset.
    Asset(Asset),
    /// A live entry.
    Entry(Entry),
    /// A deletion marker.
    Deleted(DeletedResource),
    /// A kind this client does not model (skipped by snapshot maps).
    Other(SysInfo),
}

impl Resource {
    /// System attributes.
    pub fn sys(&self) -> &SysInfo {
        match self {
            Resource::Asset(asset) => &asset.sys,
            Resource::Entry(entry) => &entry.sys,
            Resource::Deleted(deleted) => &deleted.sys,
            Resource::Other(sys) => sys,
        }
    }

    /// Resource id.
    pub fn id(&self) -> &str {
        &self.sys().id
    }

    /// Resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.sys().kind
    }
}

impl From<Asset> for Resource {
    fn from(asset: Asset) -> Self {
        Resource::Asset(asset)
    }
}

impl From<Entry> for Resource {
    fn from(entry: Entry) -> Self {
        Resource::Entry(entry)
    }
}

impl From<DeletedResource> for Resource {
    fn from(deleted: DeletedResource) -> Self {
        Resource::Deleted(deleted)
    }
}
