//! Error types for the engine.

use thiserror::Error;
use weft_model::ResourceKind;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during fetch, resolution or sync.
///
/// Unresolvable links and exhausted locale fallback chains are not
/// errors: both read as an absent field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A single-resource fetch found nothing remotely.
    #[error("{kind:?} '{id}' does not exist")]
    NotFound {
        /// Requested resource kind.
        kind: ResourceKind,
        /// Requested resource id.
        id: String,
    },

    /// An entry's declared content type could not be fetched during
    /// resolution. Fails the whole batch.
    #[error("entry '{entry_id}' ({entry_kind:?}) references missing content type '{content_type_id}'")]
    ContentTypeNotFound {
        /// The entry whose schema was required.
        entry_id: String,
        /// That entry's kind.
        entry_kind: ResourceKind,
        /// The content-type id that could not be found.
        content_type_id: String,
    },

    /// A delta sync was requested from a snapshot that never completed
    /// its own sync (no continuation token surfaced yet).
    #[error("snapshot carries no sync token; complete the current sync first")]
    MissingSyncToken,

    /// Transport or decoding failure, forwarded from the source
    /// unchanged. The engine does not interpret its contents.
    #[error("source error: {message}")]
    Source {
        /// The collaborator's error description.
        message: String,
    },
}

impl EngineError {
    /// Creates a forwarded source error.
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Whether this error is a not-found of either flavor.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::NotFound { .. } | EngineError::ContentTypeNotFound { .. }
        )
    }
}
