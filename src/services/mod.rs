//! Service layer for the tracker.
//!
//! This module contains the business logic for:
//! - Plan discovery on the source page (`PlanDiscovery`)
//! - Row classification (`classify`)
//! - Table extraction (`extract`, `TableDecoder`)
//! - Price and code normalization (`normalize`)

pub mod classify;
mod discovery;
mod extractor;
pub mod normalize;

pub use classify::{RowClass, RowContext, classify};
pub use discovery::{PlanDiscovery, extract_links};
pub use extractor::{ExtractStats, Extraction, SpreadsheetDecoder, TableDecoder, extract, extract_bytes};
