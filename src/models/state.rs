//! Persistent record of downloaded plans.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{FileId, RemoteFile};

/// Everything the tracker remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default)]
    pub downloaded: BTreeMap<FileId, StateEntry>,
}

/// One downloaded plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub url: String,
    pub version: u32,

    #[serde(with = "timestamp")]
    pub downloaded_at: DateTime<Utc>,

    /// Output file name relative to the output directory
    #[serde(default)]
    pub output_path: String,

    /// False once the file vanished from the source page
    #[serde(default = "default_available")]
    pub available: bool,

    /// SHA-256 of the downloaded spreadsheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

fn default_available() -> bool {
    true
}

impl SyncState {
    /// Recorded version for a file, 0 when unknown.
    pub fn version_of(&self, file_id: &FileId) -> u32 {
        self.downloaded.get(file_id).map_or(0, |e| e.version)
    }

    pub fn get(&self, file_id: &FileId) -> Option<&StateEntry> {
        self.downloaded.get(file_id)
    }

    pub fn len(&self) -> usize {
        self.downloaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.downloaded.is_empty()
    }

    /// Insert or overwrite the entry for a freshly persisted file.
    pub fn record(
        &mut self,
        file: &RemoteFile,
        output_path: impl Into<String>,
        checksum: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.downloaded.insert(
            file.file_id.clone(),
            StateEntry {
                url: file.url.clone(),
                version: file.version,
                downloaded_at: at,
                output_path: output_path.into(),
                available: true,
                checksum,
            },
        );
    }

    /// Fill fields that older state files did not carry.
    ///
    /// Returns the number of entries touched.
    pub fn backfill(&mut self) -> usize {
        let mut touched = 0;
        for (file_id, entry) in &mut self.downloaded {
            if entry.output_path.is_empty() {
                entry.output_path = default_output_name(file_id);
                touched += 1;
            }
        }
        touched
    }

    /// Set availability, returning whether anything changed.
    pub fn set_available(&mut self, file_id: &FileId, available: bool) -> bool {
        match self.downloaded.get_mut(file_id) {
            Some(entry) if entry.available != available => {
                entry.available = available;
                true
            }
            _ => false,
        }
    }
}

/// `<file_id>.json`
pub fn default_output_name(file_id: &FileId) -> String {
    format!("{file_id}.json")
}

/// RFC 3339 on write; also accepts naive ISO-8601 timestamps (read as UTC).
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{raw}': {e}")))
    }
}
