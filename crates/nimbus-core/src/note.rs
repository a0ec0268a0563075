//! Note data model and inbound-payload normalization.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;

/// A stored note. `owner_id` scopes every read and write and is never
/// serialized back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    /// Server-assigned identity, immutable after first insert.
    pub id: Uuid,
    /// External identity subject owning the record, immutable.
    #[serde(skip_serializing)]
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub folder: String,
    /// Client-assigned idempotency key, unique per owner when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    /// Client-reported ISO-8601 timestamp, kept verbatim.
    pub updated_at: String,
    /// Authoritative ordering key, epoch milliseconds.
    pub last_modified: i64,
    pub links: Vec<String>,
}

impl NoteRecord {
    /// Content length in characters, the unit the char quota is
    /// expressed in.
    pub fn char_count(&self) -> i64 {
        self.content.chars().count() as i64
    }

    /// Estimated serialized size: summed UTF-8 byte length of the text
    /// fields. A storage-accounting estimate, not an on-disk footprint.
    pub fn approx_size_bytes(&self) -> i64 {
        let links: usize = self.links.iter().map(|l| l.len()).sum();
        (self.title.len()
            + self.content.len()
            + self.folder.len()
            + self.updated_at.len()
            + self.last_modified.to_string().len()
            + self.local_id.as_deref().map_or(0, str::len)
            + links) as i64
    }
}

/// Inbound note-save payload. Every field is optional; normalization
/// applies the documented defaults so handlers never see a partially
/// shaped note.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveNoteRequest {
    /// Server id of the record to update. Must resolve to an existing
    /// record owned by the caller; there is no silent fallback to create.
    pub id: Option<String>,
    pub local_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder: Option<String>,
    pub updated_at: Option<String>,
    pub last_modified: Option<i64>,
    pub links: Option<Vec<String>>,
}

impl SaveNoteRequest {
    /// Normalize the payload into a full record under the given identity.
    ///
    /// Defaults: empty-or-missing title becomes "Untitled Note", folder
    /// "General", content empty, links empty. `updated_at` falls back to
    /// the current time; `last_modified` is taken from the payload, else
    /// parsed out of `updated_at`, else the current time.
    pub fn normalize(&self, owner_id: &str, id: Uuid) -> NoteRecord {
        let now = Utc::now();
        let updated_at = self
            .updated_at
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));
        let last_modified = self
            .last_modified
            .or_else(|| parse_epoch_millis(&updated_at))
            .unwrap_or_else(|| now.timestamp_millis());

        NoteRecord {
            id,
            owner_id: owner_id.to_string(),
            title: self
                .title
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| defaults::NOTE_TITLE.to_string()),
            content: self.content.clone().unwrap_or_default(),
            folder: self
                .folder
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| defaults::NOTE_FOLDER.to_string()),
            local_id: self.local_id.clone().filter(|s| !s.is_empty()),
            updated_at,
            last_modified,
            links: self.links.clone().unwrap_or_default(),
        }
    }
}

fn parse_epoch_millis(iso: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Sort notes by `last_modified` descending, tie-broken by `updated_at`
/// descending. Repositories return rows pre-sorted; in-memory stores use
/// this to match.
pub fn sort_for_listing(notes: &mut [NoteRecord]) {
    notes.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
}
