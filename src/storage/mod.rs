//! Storage abstractions for tracker state and plan outputs.
//!
//! ## Directory Structure
//!
//! ```text
//! cpv/
//! ├── .procurement_tracker.json   # Sync state
//! ├── latest.json                 # Plan of the current month
//! ├── 2024-11.json                # Older plans, one per month
//! └── 2024-12.json
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CategoryGroup, SyncState};

// Re-export for convenience
pub use local::LocalStorage;

/// Output name of the plan for the current month.
pub const LATEST_OUTPUT: &str = "latest.json";

/// Trait for tracker storage backends.
#[async_trait]
pub trait TrackerStorage: Send + Sync {
    /// Load the sync state; a missing state file is an empty state.
    async fn load_state(&self) -> Result<SyncState>;

    /// Persist the sync state.
    async fn save_state(&self, state: &SyncState) -> Result<()>;

    /// Write one plan output atomically under `name`.
    async fn write_output(&self, name: &str, groups: &[CategoryGroup]) -> Result<()>;

    /// Read a plan output back, `None` if missing.
    async fn load_output(&self, name: &str) -> Result<Option<Vec<CategoryGroup>>>;

    /// Whether an output named `name` exists.
    async fn output_exists(&self, name: &str) -> bool;

    /// Delete an output; a missing output is not an error.
    async fn remove_output(&self, name: &str) -> Result<()>;
}
