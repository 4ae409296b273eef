// src/pipeline/sync.rs

//! Plan synchronization pipeline.
//!
//! One run walks every discovered plan through
//! `DISCOVERED -> UP_TO_DATE | FETCHING -> EXTRACTING -> PERSISTED`, or to
//! `FAILED` without touching the recorded state of that plan. Before that,
//! plans whose output went missing are re-fetched, unless the page already
//! offers a newer version of them; afterwards plans that vanished from the
//! page are marked unavailable.
//!
//! At a month roll-over the previous month is moved from `latest.json` to
//! its dated name and `latest.json` is removed, so it only ever holds the
//! plan of the current month. It stays absent until that plan is published.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::models::{FileId, RemoteFile, SyncState, default_output_name, group_by_category};
use crate::pipeline::detect::{Decision, plan};
use crate::services::{TableDecoder, extract_bytes};
use crate::storage::{LATEST_OUTPUT, TrackerStorage};
use crate::utils::http::Fetcher;
use crate::utils::sha256_hex;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub discovered: usize,
    pub up_to_date: usize,
    pub fetched: usize,
    pub repaired: usize,
    pub failed: usize,
    pub marked_unavailable: usize,
}

impl SyncSummary {
    pub fn items(&self) -> [(&'static str, usize); 6] {
        [
            ("discovered", self.discovered),
            ("unchanged", self.up_to_date),
            ("fetched", self.fetched),
            ("repaired", self.repaired),
            ("failed", self.failed),
            ("marked unavailable", self.marked_unavailable),
        ]
    }
}

/// Drives fetch, extraction and persistence for discovered plans.
pub struct SyncRunner<'a> {
    fetcher: &'a dyn Fetcher,
    decoder: &'a dyn TableDecoder,
    storage: &'a dyn TrackerStorage,
    current: FileId,
    delay: Duration,
}

impl<'a> SyncRunner<'a> {
    /// `current` is the period whose plan is written as `latest.json`.
    pub fn new(
        fetcher: &'a dyn Fetcher,
        decoder: &'a dyn TableDecoder,
        storage: &'a dyn TrackerStorage,
        current: FileId,
    ) -> Self {
        Self {
            fetcher,
            decoder,
            storage,
            current,
            delay: Duration::ZERO,
        }
    }

    /// Pause between downloads.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Output name a plan should live under today.
    pub fn output_name(&self, file_id: &FileId) -> String {
        if *file_id == self.current {
            LATEST_OUTPUT.to_string()
        } else {
            default_output_name(file_id)
        }
    }

    /// Run a full sync over `candidates`, mutating `state` in place.
    ///
    /// Per-plan failures are logged and counted; only state persistence
    /// errors abort the run.
    pub async fn run(&self, candidates: &[RemoteFile], state: &mut SyncState) -> Result<SyncSummary> {
        let initial = state.clone();
        let mut summary = SyncSummary {
            discovered: candidates.len(),
            ..SyncSummary::default()
        };

        let decisions = plan(candidates, state);
        let superseded: HashSet<FileId> = decisions
            .iter()
            .filter(|d| matches!(d, Decision::Fetch(_)))
            .map(|d| d.file().file_id.clone())
            .collect();

        self.repair(state, &superseded, &mut summary).await?;

        for decision in decisions {
            match decision {
                Decision::UpToDate(file) => {
                    log::info!("{} is up to date (v{})", file.file_id, file.version);
                    summary.up_to_date += 1;
                }
                Decision::Fetch(file) => {
                    let previous = state.version_of(&file.file_id);
                    log::info!(
                        "Fetching {} v{} (recorded v{}) from {}",
                        file.file_id,
                        file.version,
                        previous,
                        file.url
                    );
                    if self.persist(&file, state).await? {
                        summary.fetched += 1;
                    } else {
                        summary.failed += 1;
                    }
                    self.pause().await;
                }
            }
        }

        let seen: HashSet<FileId> = candidates.iter().map(|f| f.file_id.clone()).collect();
        summary.marked_unavailable = self.reconcile(&seen, state);

        if *state != initial {
            self.storage.save_state(state).await?;
        }

        Ok(summary)
    }

    /// Like [`run`](Self::run), but stops early when `shutdown` resolves.
    ///
    /// On shutdown the state gathered so far is saved and `None` is
    /// returned. Plans already persisted stay recorded; the interrupted one
    /// is left as it was.
    pub async fn run_until<F: Future>(
        &self,
        candidates: &[RemoteFile],
        state: &mut SyncState,
        shutdown: F,
    ) -> Result<Option<SyncSummary>> {
        let outcome = tokio::select! {
            result = self.run(candidates, state) => Some(result),
            _ = shutdown => None,
        };

        match outcome {
            Some(result) => result.map(Some),
            None => {
                log::warn!("Interrupted, saving state for {} plans", state.len());
                self.storage.save_state(state).await?;
                Ok(None)
            }
        }
    }

    /// Re-fetch recorded plans whose output is missing.
    ///
    /// Plans in `superseded` are skipped; the fetch of their newer version
    /// rewrites the output anyway.
    pub async fn repair(
        &self,
        state: &mut SyncState,
        superseded: &HashSet<FileId>,
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let mut missing = Vec::new();
        for (file_id, entry) in &state.downloaded {
            let expected = self.output_name(file_id);
            if self.storage.output_exists(&expected).await {
                continue;
            }
            if superseded.contains(file_id) {
                log::info!(
                    "Output for {} is missing; a newer version replaces it this run",
                    file_id
                );
                continue;
            }
            missing.push(RemoteFile {
                file_id: file_id.clone(),
                url: entry.url.clone(),
                version: entry.version,
            });
        }

        for file in missing {
            log::warn!(
                "Output for {} is missing, re-fetching v{} from {}",
                file.file_id,
                file.version,
                file.url
            );
            if self.persist(&file, state).await? {
                summary.repaired += 1;
            } else {
                summary.failed += 1;
            }
            self.pause().await;
        }

        Ok(())
    }

    /// Fetch, extract and record one plan.
    ///
    /// Returns `Ok(false)` when the plan failed; state for it is untouched.
    async fn persist(&self, file: &RemoteFile, state: &mut SyncState) -> Result<bool> {
        let name = self.output_name(&file.file_id);
        let previous = state.get(&file.file_id).map(|e| e.output_path.clone());

        let checksum = match self.fetch_and_write(file, &name).await {
            Ok(checksum) => checksum,
            Err(e) => {
                log::error!("Failed to process {} ({}): {}", file.file_id, file.url, e);
                return Ok(false);
            }
        };

        state.record(file, name.as_str(), Some(checksum), Utc::now());
        self.storage.save_state(state).await?;
        log::info!("Saved {} v{} as {}", file.file_id, file.version, name);

        if previous.as_deref() == Some(LATEST_OUTPUT) && name != LATEST_OUTPUT {
            self.retire_latest(state).await;
        }
        Ok(true)
    }

    /// Drop a `latest.json` left over from an earlier month.
    async fn retire_latest(&self, state: &SyncState) {
        let owned = state
            .get(&self.current)
            .is_some_and(|e| e.output_path == LATEST_OUTPUT);
        if owned {
            return;
        }

        match self.storage.remove_output(LATEST_OUTPUT).await {
            Ok(()) => log::info!("Removed {} left over from an earlier month", LATEST_OUTPUT),
            Err(e) => log::warn!("Could not remove stale {}: {}", LATEST_OUTPUT, e),
        }
    }

    async fn fetch_and_write(&self, file: &RemoteFile, name: &str) -> Result<String> {
        let bytes = self.fetcher.fetch_bytes(&file.url).await?;
        let extraction = extract_bytes(self.decoder, &bytes)?;

        log::debug!("Extraction stats for {}: {:?}", file.file_id, extraction.stats);
        if extraction.items.is_empty() {
            log::warn!("{} produced no line items", file.file_id);
        }

        let groups = group_by_category(&extraction.items);
        self.storage.write_output(name, &groups).await?;

        Ok(sha256_hex(&bytes))
    }

    /// Flag recorded plans missing from this pass; the current period is exempt.
    fn reconcile(&self, seen: &HashSet<FileId>, state: &mut SyncState) -> usize {
        let ids: Vec<FileId> = state.downloaded.keys().cloned().collect();
        let mut marked = 0;

        for file_id in ids {
            if seen.contains(&file_id) {
                if state.set_available(&file_id, true) {
                    log::info!("{} is available again", file_id);
                }
            } else if file_id != self.current && state.set_available(&file_id, false) {
                log::info!("{} is no longer listed, marking unavailable", file_id);
                marked += 1;
            }
        }

        marked
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::error::AppError;
    use crate::models::{Cell, flatten_groups};
    use crate::storage::LocalStorage;

    const STATE: &str = ".procurement_tracker.json";

    /// Serves canned bodies and records every requested URL.
    #[derive(Default)]
    struct StubFetcher {
        bodies: HashMap<String, Vec<u8>>,
        stalled: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.as_bytes().to_vec());
            self
        }

        /// Requests for `url` never complete.
        fn stalling(mut self, url: &str) -> Self {
            self.stalled.push(url.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            Err(AppError::fetch(url, "not a page"))
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            if self.stalled.iter().any(|s| s == url) {
                std::future::pending::<()>().await;
            }
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "HTTP status 404 Not Found"))
        }
    }

    /// Pipe-separated lines; a body starting with `BROKEN` fails to decode.
    struct PipeDecoder;

    impl TableDecoder for PipeDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
            let text = std::str::from_utf8(bytes).map_err(AppError::decode)?;
            if text.starts_with("BROKEN") {
                return Err(AppError::decode("not a workbook"));
            }
            Ok(text
                .lines()
                .map(|line| line.split('|').map(Cell::text).collect())
                .collect())
        }
    }

    const PLAN_V1: &str = "Lp|CPV|Nazwa|PLN|EUR\n\
                           |45212140-1|Buildings||0\n\
                           1||Roof repair|500.50|120.00\n";

    const PLAN_V2: &str = "Lp|CPV|Nazwa|PLN|EUR\n\
                           |45212140-1|Buildings||0\n\
                           1||Roof repair|500.50|120.00\n\
                           2||Gutters|80|\n";

    fn remote(id: &str, version: u32, url: &str) -> RemoteFile {
        RemoteFile {
            file_id: FileId::from(id),
            url: url.to_string(),
            version,
        }
    }

    fn current() -> FileId {
        FileId::from("2025-01")
    }

    #[tokio::test]
    async fn test_first_run_fetches_everything() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default()
            .with("https://x/2024-12.xls", PLAN_V1)
            .with("https://x/2025-01.xls", PLAN_V2);
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());

        let candidates = vec![
            remote("2024-12", 3, "https://x/2024-12.xls"),
            remote("2025-01", 1, "https://x/2025-01.xls"),
        ];
        let mut state = SyncState::default();
        let summary = runner.run(&candidates, &mut state).await.unwrap();

        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(state.version_of(&FileId::from("2024-12")), 3);
        assert_eq!(
            state.get(&FileId::from("2025-01")).unwrap().output_path,
            "latest.json"
        );
        assert!(tmp.path().join("2024-12.json").exists());
        assert!(tmp.path().join("latest.json").exists());

        let groups = storage.load_output("2024-12.json").await.unwrap().unwrap();
        let items = flatten_groups(groups);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, "Buildings");
        assert_eq!(items[0].code, "45212140-1");

        let persisted = storage.load_state().await.unwrap();
        assert_eq!(persisted, state);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default().with("https://x/2024-12.xls", PLAN_V1);
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());
        let candidates = vec![remote("2024-12", 3, "https://x/2024-12.xls")];

        let mut state = SyncState::default();
        runner.run(&candidates, &mut state).await.unwrap();
        let state_bytes = std::fs::read(storage.state_path()).unwrap();

        let mut reloaded = storage.load_state().await.unwrap();
        let summary = runner.run(&candidates, &mut reloaded).await.unwrap();

        assert_eq!(summary.fetched, 0);
        assert_eq!(summary.up_to_date, 1);
        assert_eq!(fetcher.calls().len(), 1);
        assert_eq!(std::fs::read(storage.state_path()).unwrap(), state_bytes);
    }

    #[tokio::test]
    async fn test_version_bump_refetches_but_url_change_does_not() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default()
            .with("https://x/a.xls", PLAN_V1)
            .with("https://x/b.xls", PLAN_V2)
            .with("https://x/c.xls", PLAN_V2);
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());
        let mut state = SyncState::default();

        runner
            .run(&[remote("2024-12", 1, "https://x/a.xls")], &mut state)
            .await
            .unwrap();

        let summary = runner
            .run(&[remote("2024-12", 1, "https://x/b.xls")], &mut state)
            .await
            .unwrap();
        assert_eq!(summary.fetched, 0);
        assert_eq!(state.get(&FileId::from("2024-12")).unwrap().url, "https://x/a.xls");

        let summary = runner
            .run(&[remote("2024-12", 2, "https://x/c.xls")], &mut state)
            .await
            .unwrap();
        assert_eq!(summary.fetched, 1);
        assert_eq!(state.version_of(&FileId::from("2024-12")), 2);

        let items = flatten_groups(storage.load_output("2024-12.json").await.unwrap().unwrap());
        assert_eq!(items.len(), 2);
        assert_eq!(fetcher.calls(), vec!["https://x/a.xls", "https://x/c.xls"]);
    }

    #[tokio::test]
    async fn test_failures_leave_state_untouched_and_continue() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default()
            .with("https://x/broken.xls", "BROKEN")
            .with("https://x/good.xls", PLAN_V1);
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());

        let candidates = vec![
            remote("2024-10", 1, "https://x/missing.xls"),
            remote("2024-11", 1, "https://x/broken.xls"),
            remote("2024-12", 1, "https://x/good.xls"),
        ];
        let mut state = SyncState::default();
        let summary = runner.run(&candidates, &mut state).await.unwrap();

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.fetched, 1);
        assert!(state.get(&FileId::from("2024-10")).is_none());
        assert!(state.get(&FileId::from("2024-11")).is_none());
        assert!(!tmp.path().join("2024-10.json").exists());
        assert!(!tmp.path().join("2024-11.json").exists());
        assert!(tmp.path().join("2024-12.json").exists());
    }

    #[tokio::test]
    async fn test_missing_output_is_repaired() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default().with("https://x/a.xls", PLAN_V1);
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());
        let candidates = vec![remote("2024-12", 2, "https://x/a.xls")];

        let mut state = SyncState::default();
        runner.run(&candidates, &mut state).await.unwrap();
        std::fs::remove_file(tmp.path().join("2024-12.json")).unwrap();

        let summary = runner.run(&candidates, &mut state).await.unwrap();
        assert_eq!(summary.repaired, 1);
        assert_eq!(summary.up_to_date, 1);
        assert!(tmp.path().join("2024-12.json").exists());
        assert_eq!(state.version_of(&FileId::from("2024-12")), 2);
    }

    #[tokio::test]
    async fn test_month_rollover_moves_latest_to_dated_output() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default().with("https://x/dec.xls", PLAN_V1);
        let candidates = vec![remote("2024-12", 1, "https://x/dec.xls")];
        let mut state = SyncState::default();

        let december = SyncRunner::new(&fetcher, &PipeDecoder, &storage, FileId::from("2024-12"));
        december.run(&candidates, &mut state).await.unwrap();
        assert!(tmp.path().join("latest.json").exists());

        let january = SyncRunner::new(&fetcher, &PipeDecoder, &storage, FileId::from("2025-01"));
        let summary = january.run(&candidates, &mut state).await.unwrap();

        assert_eq!(summary.repaired, 1);
        assert!(tmp.path().join("2024-12.json").exists());
        assert!(!tmp.path().join("latest.json").exists());
        assert_eq!(
            state.get(&FileId::from("2024-12")).unwrap().output_path,
            "2024-12.json"
        );
    }

    #[tokio::test]
    async fn test_month_rollover_keeps_latest_of_new_month() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default()
            .with("https://x/dec.xls", PLAN_V1)
            .with("https://x/jan.xls", PLAN_V2);
        let mut state = SyncState::default();

        let december = SyncRunner::new(&fetcher, &PipeDecoder, &storage, FileId::from("2024-12"));
        december
            .run(&[remote("2024-12", 1, "https://x/dec.xls")], &mut state)
            .await
            .unwrap();

        let january = SyncRunner::new(&fetcher, &PipeDecoder, &storage, FileId::from("2025-01"));
        let both = vec![
            remote("2024-12", 1, "https://x/dec.xls"),
            remote("2025-01", 1, "https://x/jan.xls"),
        ];
        january.run(&both, &mut state).await.unwrap();

        let latest = flatten_groups(storage.load_output("latest.json").await.unwrap().unwrap());
        assert_eq!(latest.len(), 2);
        let december = flatten_groups(storage.load_output("2024-12.json").await.unwrap().unwrap());
        assert_eq!(december.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_output_with_newer_version_fetches_once() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default()
            .with("https://x/old.xls", PLAN_V1)
            .with("https://x/new.xls", PLAN_V2);
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());

        let mut state = SyncState::default();
        runner
            .run(&[remote("2024-12", 1, "https://x/old.xls")], &mut state)
            .await
            .unwrap();
        std::fs::remove_file(tmp.path().join("2024-12.json")).unwrap();

        let old_gone = StubFetcher::default().with("https://x/new.xls", PLAN_V2);
        let runner = SyncRunner::new(&old_gone, &PipeDecoder, &storage, current());
        let summary = runner
            .run(&[remote("2024-12", 2, "https://x/new.xls")], &mut state)
            .await
            .unwrap();

        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.repaired, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(old_gone.calls(), vec!["https://x/new.xls"]);
        assert_eq!(state.version_of(&FileId::from("2024-12")), 2);
        assert!(tmp.path().join("2024-12.json").exists());
    }

    #[tokio::test]
    async fn test_unwritable_state_aborts_run() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(STATE)).unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default()
            .with("https://x/a.xls", PLAN_V1)
            .with("https://x/b.xls", PLAN_V1);
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());

        let candidates = vec![
            remote("2024-11", 1, "https://x/a.xls"),
            remote("2024-12", 1, "https://x/b.xls"),
        ];
        let mut state = SyncState::default();
        let err = runner.run(&candidates, &mut state).await.unwrap_err();

        assert!(matches!(err, AppError::Persistence { .. }));
        assert_eq!(fetcher.calls(), vec!["https://x/a.xls"]);
    }

    #[tokio::test]
    async fn test_interrupt_saves_completed_plans() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default()
            .with("https://x/a.xls", PLAN_V1)
            .stalling("https://x/b.xls");
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());

        let candidates = vec![
            remote("2024-11", 1, "https://x/a.xls"),
            remote("2024-12", 1, "https://x/b.xls"),
        ];
        let mut state = SyncState::default();
        let shutdown = tokio::time::sleep(Duration::from_millis(200));
        let outcome = runner
            .run_until(&candidates, &mut state, shutdown)
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(fetcher.calls(), vec!["https://x/a.xls", "https://x/b.xls"]);

        let persisted = storage.load_state().await.unwrap();
        assert_eq!(persisted, state);
        assert_eq!(persisted.version_of(&FileId::from("2024-11")), 1);
        assert!(persisted.get(&FileId::from("2024-12")).is_none());
        assert!(!tmp.path().join("2024-12.json").exists());
    }

    #[tokio::test]
    async fn test_run_until_without_shutdown_returns_summary() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default().with("https://x/a.xls", PLAN_V1);
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());

        let mut state = SyncState::default();
        let summary = runner
            .run_until(
                &[remote("2024-12", 1, "https://x/a.xls")],
                &mut state,
                std::future::pending::<()>(),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.fetched, 1);
    }

    #[tokio::test]
    async fn test_vanished_files_are_marked_not_deleted() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default()
            .with("https://x/nov.xls", PLAN_V1)
            .with("https://x/jan.xls", PLAN_V1);
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());
        let mut state = SyncState::default();

        let both = vec![
            remote("2024-11", 1, "https://x/nov.xls"),
            remote("2025-01", 1, "https://x/jan.xls"),
        ];
        runner.run(&both, &mut state).await.unwrap();

        let summary = runner.run(&[], &mut state).await.unwrap();
        assert_eq!(summary.marked_unavailable, 1);
        assert_eq!(state.len(), 2);
        assert!(!state.get(&FileId::from("2024-11")).unwrap().available);
        assert!(state.get(&FileId::from("2025-01")).unwrap().available);

        let persisted = storage.load_state().await.unwrap();
        assert!(!persisted.get(&FileId::from("2024-11")).unwrap().available);

        runner.run(&both, &mut state).await.unwrap();
        assert!(state.get(&FileId::from("2024-11")).unwrap().available);
    }

    #[test]
    fn test_output_name() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), STATE);
        let fetcher = StubFetcher::default();
        let runner = SyncRunner::new(&fetcher, &PipeDecoder, &storage, current());

        assert_eq!(runner.output_name(&FileId::from("2025-01")), "latest.json");
        assert_eq!(runner.output_name(&FileId::from("2024-12")), "2024-12.json");
    }
}
