//! Pipeline entry points for plan synchronization.
//!
//! - `plan`: Decide which discovered plans need fetching
//! - `SyncRunner`: Fetch, extract and persist plans, then reconcile state

pub mod detect;
pub mod sync;

pub use detect::{Decision, plan, should_fetch};
pub use sync::{SyncRunner, SyncSummary};
