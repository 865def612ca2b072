//! Credential type definitions

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::SecretString;
use crate::error::PawsError;

/// Timestamp text format, identical to SQLite's `datetime('now')`
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Credential metadata (safe to display, never carries the secret)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSummary {
    /// Row id, assigned by the store
    pub id: i64,

    /// Service name (e.g., "github"), not unique
    pub service: String,

    /// Login name, empty when not set
    pub username: String,

    /// Free-form notes, empty when not set
    pub notes: String,

    /// `None` for rows written before the column existed
    pub created_at: Option<DateTime<Utc>>,

    /// `None` for rows written before the column existed
    pub updated_at: Option<DateTime<Utc>>,
}

/// A single credential with its secret decrypted
#[derive(Debug)]
pub struct Credential {
    pub id: i64,
    pub service: String,
    pub username: String,
    pub secret: SecretString,
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Metadata view of this credential, without the secret
    pub fn summary(&self) -> CredentialSummary {
        CredentialSummary {
            id: self.id,
            service: self.service.clone(),
            username: self.username.clone(),
            notes: self.notes.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Column a listing is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Id,
    Service,
    Username,
    Notes,
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    /// All keys, in display order
    pub const ALL: [SortKey; 6] = [
        SortKey::Id,
        SortKey::Service,
        SortKey::Username,
        SortKey::Notes,
        SortKey::CreatedAt,
        SortKey::UpdatedAt,
    ];

    /// Column name as stored in the table
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Service => "service",
            SortKey::Username => "username",
            SortKey::Notes => "notes",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        }
    }

    /// Order two rows by this key.
    ///
    /// Text columns compare by their Unicode lowercase form, the same folding
    /// the list filter uses. Missing timestamps sort before any timestamp.
    pub(crate) fn compare(self, a: &CredentialSummary, b: &CredentialSummary) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Service => cmp_folded(&a.service, &b.service),
            SortKey::Username => cmp_folded(&a.username, &b.username),
            SortKey::Notes => cmp_folded(&a.notes, &b.notes),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

fn cmp_folded(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = PawsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| PawsError::InvalidInput(format!("unknown sort column: {}", s)))
    }
}

/// Filter and ordering for [`crate::CredentialStore::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring of service or username; blank means all
    pub filter: Option<String>,
    pub sort_by: SortKey,
    pub ascending: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: None,
            sort_by: SortKey::Id,
            ascending: true,
        }
    }
}

impl ListQuery {
    /// All rows, ordered by `sort_by`
    pub fn sorted(sort_by: SortKey, ascending: bool) -> Self {
        Self {
            filter: None,
            sort_by,
            ascending,
        }
    }

    /// Set the search text
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Lowercased needle, or `None` when the filter is absent or blank
    pub(crate) fn needle(&self) -> Option<String> {
        self.filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase)
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp; empty or unreadable text is `None`
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}
