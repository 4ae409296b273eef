//! Change detection between discovered plans and recorded state.
//!
//! A plan is fetched only when its advertised version is strictly greater
//! than the recorded one. A changed URL with the same version is not a
//! change.

use std::collections::HashMap;

use crate::models::{FileId, RemoteFile, SyncState};

/// What to do with one discovered plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// New or updated: download and extract
    Fetch(RemoteFile),
    /// Recorded version is the same or newer
    UpToDate(RemoteFile),
}

impl Decision {
    pub fn file(&self) -> &RemoteFile {
        match self {
            Decision::Fetch(file) | Decision::UpToDate(file) => file,
        }
    }
}

/// Whether `version` supersedes what the state recorded for `file_id`.
pub fn should_fetch(file_id: &FileId, version: u32, state: &SyncState) -> bool {
    version > state.version_of(file_id)
}

/// Plan a discovery pass.
///
/// Duplicate ids collapse to the highest version (the first one seen on
/// ties), keeping the position of the first occurrence.
pub fn plan(candidates: &[RemoteFile], state: &SyncState) -> Vec<Decision> {
    let mut order: Vec<FileId> = Vec::new();
    let mut best: HashMap<FileId, &RemoteFile> = HashMap::new();

    for file in candidates {
        match best.get(&file.file_id) {
            Some(current) if current.version >= file.version => {
                log::debug!(
                    "Ignoring duplicate link for {} (v{} <= v{})",
                    file.file_id,
                    file.version,
                    current.version
                );
            }
            Some(_) => {
                best.insert(file.file_id.clone(), file);
            }
            None => {
                order.push(file.file_id.clone());
                best.insert(file.file_id.clone(), file);
            }
        }
    }

    order
        .iter()
        .filter_map(|id| best.get(id))
        .map(|file| {
            let file = (*file).clone();
            if should_fetch(&file.file_id, file.version, state) {
                Decision::Fetch(file)
            } else {
                Decision::UpToDate(file)
            }
        })
        .collect()
}
