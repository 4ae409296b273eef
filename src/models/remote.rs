//! Remote plan files discovered on the source page.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Canonical `YYYY-MM` key of one monthly plan.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Build from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Self {
        Self(format!("{year}-{month:02}"))
    }

    /// Key of the period containing `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// Key of the current local calendar month.
    pub fn current() -> Self {
        Self::for_date(chrono::Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An anchor found on the source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Trimmed display text
    pub text: String,
    /// Absolute target URL
    pub href: String,
}

/// A spreadsheet advertised on the source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub file_id: FileId,
    pub url: String,
    pub version: u32,
}
