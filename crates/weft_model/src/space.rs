//! Space metadata and the locale fallback chain.

use crate::resource::FieldTable;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single locale defined by a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleDef {
    /// Locale code (`"en-US"` or similar).
    pub code: String,
    /// Human readable name.
    pub name: String,
    /// Code of the locale to fall back to when a field has no value
    /// under this one. `None` terminates the fallback chain.
    pub fallback_code: Option<String>,
    /// Whether this is the space's default locale.
    pub default: bool,
}

impl LocaleDef {
    /// Creates a locale with no fallback.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            fallback_code: None,
            default: false,
        }
    }

    /// Sets the fallback locale code.
    pub fn with_fallback(mut self, code: impl Into<String>) -> Self {
        self.fallback_code = Some(code.into());
        self
    }

    /// Marks this locale as the space default.
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// Space metadata: identity plus the ordered locale list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceMeta {
    /// Space id.
    pub id: String,
    /// Space name.
    pub name: String,
    /// Ordered locale list as returned by the space.
    pub locales: Vec<LocaleDef>,
}

impl SpaceMeta {
    /// Creates space metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>, locales: Vec<LocaleDef>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            locales,
        }
    }

    /// Returns the default locale, or the first listed locale if none
    /// is flagged.
    pub fn default_locale(&self) -> Option<&LocaleDef> {
        self.locales
            .iter()
            .find(|locale| locale.default)
            .or_else(|| self.locales.first())
    }
}

/// The locale fallback walk, derived once from space metadata.
///
/// Shared (via `Arc`) by every localized resource in a snapshot so that
/// field reads can follow the fallback chain without a handle back to
/// the space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleChain {
    default_code: String,
    fallbacks: HashMap<String, Option<String>>,
}

impl LocaleChain {
    /// Builds the chain from space metadata.
    pub fn from_space(space: &SpaceMeta) -> Self {
        let default_code = space
            .default_locale()
            .map(|locale| locale.code.clone())
            .unwrap_or_default();
        let fallbacks = space
            .locales
            .iter()
            .map(|locale| (locale.code.clone(), locale.fallback_code.clone()))
            .collect();
        Self {
            default_code,
            fallbacks,
        }
    }

    /// The space's default locale code.
    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    /// Whether the space defines the given locale.
    pub fn contains(&self, code: &str) -> bool {
        self.fallbacks.contains_key(code)
    }

    /// The fallback code for a locale. A locale unknown to the space
    /// has no fallback.
    pub fn fallback_of(&self, code: &str) -> Option<&str> {
        self.fallbacks.get(code)?.as_deref()
    }

    /// Resolves the effective value of `field` under `locale`, walking
    /// the fallback chain until a value is found or the chain ends.
    ///
    /// An exhausted chain is not an error: the field is simply absent.
    /// The walk is bounded by the number of known locales, so a
    /// malformed cyclic chain terminates instead of spinning.
    pub fn resolve<'a>(
        &self,
        fields: &'a FieldTable,
        field: &str,
        locale: &str,
    ) -> Option<&'a FieldValue> {
        let by_locale = fields.get(field)?;
        let mut current = locale;
        for _ in 0..=self.fallbacks.len() {
            if let Some(value) = by_locale.get(current) {
                return Some(value);
            }
            current = self.fallback_of(current)?;
        }
        None
    }
}
