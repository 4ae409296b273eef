// src/services/extractor.rs

//! Table extraction service.
//!
//! Decodes the first worksheet of a plan spreadsheet and walks its rows in
//! file order, turning them into line items tagged with their category.

use std::io::Cursor;

use calamine::{Reader, open_workbook_auto_from_rs};

use crate::error::{AppError, Result};
use crate::models::{Category, Cell, LineItem};
use crate::services::classify::{COL_CODE, COL_NAME, COLUMN_COUNT, RowClass, RowContext, classify};

/// Turns raw file bytes into rows of cells.
pub trait TableDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Vec<Cell>>>;
}

/// Reads `.xls`, `.xlsx`, `.xlsb` and `.ods` workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetDecoder;

impl TableDecoder for SpreadsheetDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| AppError::decode(format!("unreadable workbook: {e}")))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::decode("workbook has no worksheets"))?
            .map_err(|e| AppError::decode(format!("unreadable worksheet: {e}")))?;

        Ok(range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect())
    }
}

/// Counters collected during one extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Data rows after the header
    pub rows: usize,
    /// Rows removed by the malformed-table pre-pass
    pub dropped_malformed: usize,
    pub noise: usize,
    pub categories: usize,
    pub items: usize,
    pub discarded: usize,
    /// Rows seen while inside an uncategorized block
    pub uncategorized: usize,
}

/// Result of extracting one table.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub items: Vec<LineItem>,
    pub stats: ExtractStats,
}

/// Extract line items from decoded rows. Row 0 is the header.
pub fn extract(rows: &[Vec<Cell>]) -> Extraction {
    let mut stats = ExtractStats::default();
    let body = rows.get(1..).unwrap_or_default();
    stats.rows = body.len();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let body: Vec<&[Cell]> = if width > COLUMN_COUNT {
        let kept = reduce_malformed(body);
        stats.dropped_malformed = body.len() - kept.len();
        log::debug!(
            "Table has {} columns; kept {} of {} rows with all {} leading cells populated",
            width,
            kept.len(),
            body.len(),
            COLUMN_COUNT
        );
        kept
    } else {
        body.iter().map(Vec::as_slice).collect()
    };

    let mut items = Vec::new();
    let mut category: Option<Category> = None;
    let mut uncategorized = false;

    for row in body {
        if uncategorized {
            stats.uncategorized += 1;
        }

        let ctx = RowContext {
            category: category.as_ref(),
        };

        let has_label = [COL_NAME, COL_CODE]
            .iter()
            .any(|&idx| row.get(idx).is_some_and(|c| !c.is_blank()));
        if has_label {
            uncategorized = false;
        }

        match classify(row, ctx) {
            RowClass::Noise {
                uncategorized: entering,
            } => {
                stats.noise += 1;
                if entering {
                    uncategorized = true;
                }
            }
            RowClass::CategoryUpdate(next) => {
                stats.categories += 1;
                category = Some(next);
            }
            RowClass::Item(item) => {
                stats.items += 1;
                items.push(item);
            }
            RowClass::Discarded(reason) => {
                stats.discarded += 1;
                log::debug!("Discarded row {:?}: {:?}", row, reason);
            }
        }
    }

    Extraction { items, stats }
}

/// Keep the first five cells of rows that have all five populated.
fn reduce_malformed(rows: &[Vec<Cell>]) -> Vec<&[Cell]> {
    rows.iter()
        .filter(|row| row.len() >= COLUMN_COUNT)
        .map(|row| &row[..COLUMN_COUNT])
        .filter(|cells| cells.iter().all(|c| !c.is_blank()))
        .collect()
}

/// Decode and extract in one step.
pub fn extract_bytes(decoder: &dyn TableDecoder, bytes: &[u8]) -> Result<Extraction> {
    let rows = decoder.decode(bytes)?;
    Ok(extract(&rows))
}
