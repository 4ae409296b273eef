// src/models/mod.rs

//! Domain models for the procurement tracker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod cell;
mod config;
mod item;
mod remote;
mod state;

// Re-export all public types
pub use cell::Cell;
pub use config::{Config, CrawlerConfig, TrackerConfig};
pub use item::{Category, CategoryGroup, LineItem, flatten_groups, group_by_category};
pub use remote::{FileId, Link, RemoteFile};
pub use state::{StateEntry, SyncState, default_output_name};
