//! Page envelopes, requests and cursor stepping.

use crate::resource::{Asset, Entry, Resource};
use serde::{Deserialize, Serialize};

/// Side-loaded resources returned alongside primary items to satisfy
/// link resolution without separate fetches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Includes {
    /// Side-loaded assets.
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Side-loaded entries.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Includes {
    /// Merges another include set into this one.
    pub fn extend(&mut self, other: Includes) {
        self.assets.extend(other.assets);
        self.entries.extend(other.entries);
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.entries.is_empty()
    }
}

/// One page of results as returned by a source.
///
/// Carries either classic pagination (`skip`/`limit`/`total`) or
/// continuation pagination. `next_page_url` and `next_sync_url` are
/// mutually exclusive: the former means more pages remain in the
/// current sync, the latter means the sync is complete and the token it
/// carries seeds the next delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope {
    /// Ordered items as returned.
    pub items: Vec<Resource>,
    /// Optional side-load set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Includes>,
    /// Classic paging: offset of this page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    /// Classic paging: page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Classic paging: total matching items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Continuation: more pages remain in the current sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_url: Option<String>,
    /// Continuation: sync complete, token for the next delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_sync_url: Option<String>,
}

impl PageEnvelope {
    /// Creates an envelope holding only items.
    pub fn new(items: Vec<Resource>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Sets classic paging counters.
    pub fn with_paging(mut self, skip: u64, limit: u64, total: u64) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self.total = Some(total);
        self
    }

    /// Sets the side-load set.
    pub fn with_includes(mut self, includes: Includes) -> Self {
        self.includes = Some(includes);
        self
    }

    /// Marks more pages as remaining in the current sync.
    pub fn with_next_page_url(mut self, url: impl Into<String>) -> Self {
        self.next_page_url = Some(url.into());
        self
    }

    /// Marks the sync as complete with the next delta's url.
    pub fn with_next_sync_url(mut self, url: impl Into<String>) -> Self {
        self.next_sync_url = Some(url.into());
        self
    }

    /// Decides how the walk proceeds after this page.
    pub fn next_cursor(&self) -> PageOutcome {
        if let Some(url) = &self.next_page_url {
            return PageOutcome::More(Cursor::Page(url.clone()));
        }
        if let Some(url) = &self.next_sync_url {
            return PageOutcome::SyncComplete {
                next_sync_url: url.clone(),
            };
        }
        if let (Some(skip), Some(limit), Some(total)) = (self.skip, self.limit, self.total) {
            if limit > 0 && skip + limit < total {
                return PageOutcome::More(Cursor::Offset(skip + limit));
            }
        }
        PageOutcome::Done
    }
}

/// Where the walk goes after a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Fetch the next page at this cursor.
    More(Cursor),
    /// Sync complete; this url carries the next delta's token.
    SyncComplete {
        /// Url whose `sync_token` parameter seeds the next delta.
        next_sync_url: String,
    },
    /// No further pages.
    Done,
}

/// Continuation state for the next page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    /// Classic paging: fetch from this offset.
    Offset(u64),
    /// Continuation paging: fetch this page url.
    Page(String),
}

/// A page fetch request: resource path, filter parameters and an
/// optional continuation cursor. Query-string encoding is the source's
/// concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Resource kind or path being listed (e.g. `"entries"`).
    pub path: String,
    /// Filter parameters, passed through to the source verbatim.
    pub params: Vec<(String, String)>,
    /// Continuation cursor, absent on the first fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl PageRequest {
    /// Creates a request for a resource path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            cursor: None,
        }
    }

    /// Lists entries.
    pub fn entries() -> Self {
        Self::new("entries")
    }

    /// Lists assets.
    pub fn assets() -> Self {
        Self::new("assets")
    }

    /// Starts an initial sync.
    pub fn sync_initial() -> Self {
        Self::new("sync").with_param("initial", "true")
    }

    /// Continues a sync from a previously surfaced token.
    pub fn sync_token(token: impl Into<String>) -> Self {
        Self::new("sync").with_param("sync_token", token)
    }

    /// Adds a filter parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Sets the continuation cursor.
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Extracts a query parameter from a url, without a full url parser.
pub(crate) fn query_param<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then_some(v)
    })
}

/// Extracts the sync token from a `next_sync_url`.
pub fn sync_token_from_url(url: &str) -> Option<&str> {
    query_param(url, "sync_token")
}
