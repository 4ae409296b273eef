//! Row classification for procurement plan tables.
//!
//! Every data row of a plan is exactly one of: noise, a category marker, a
//! line item, or a row that looks like an item but cannot be accepted.
//! Classification is pure; the category in scope is passed in explicitly
//! through [`RowContext`] and transitions are applied by the caller.

use crate::models::{Category, Cell, LineItem};
use crate::services::normalize::{clean_price, code_of};

/// Column positions of the five meaningful cells.
pub const COL_ORDINAL: usize = 0;
pub const COL_CODE: usize = 1;
pub const COL_NAME: usize = 2;
pub const COL_PRICE_PLN: usize = 3;
pub const COL_PRICE_EUR: usize = 4;
pub const COLUMN_COUNT: usize = 5;

/// Category context threaded through a table scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowContext<'a> {
    /// Most recent category marker, if any
    pub category: Option<&'a Category>,
}

/// Why an item-like row was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Neither the row nor its category has a valid CPV code
    MissingCode,
    /// No category marker precedes the row
    NoCategory,
    /// First column is not a whole number
    InvalidOrdinal,
}

/// Outcome of classifying one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowClass {
    /// Carries nothing; `uncategorized` marks a row with neither name nor code
    Noise { uncategorized: bool },
    /// Starts a new category
    CategoryUpdate(Category),
    /// An accepted line item
    Item(LineItem),
    /// Item-like, but rejected
    Discarded(DiscardReason),
}

/// Classify one row against the current context.
///
/// Rows shorter than five cells are padded with blanks; extra cells are
/// ignored.
pub fn classify(row: &[Cell], ctx: RowContext<'_>) -> RowClass {
    let blank = Cell::Empty;
    let cell = |idx: usize| row.get(idx).unwrap_or(&blank);

    if (0..COLUMN_COUNT).all(|idx| cell(idx).is_blank()) {
        return RowClass::Noise {
            uncategorized: false,
        };
    }

    let Some(name) = cell(COL_NAME).as_text() else {
        return RowClass::Noise {
            uncategorized: cell(COL_CODE).is_blank(),
        };
    };

    let row_code = code_of(cell(COL_CODE));
    let price_pln = clean_price(cell(COL_PRICE_PLN));
    let price_eur = clean_price(cell(COL_PRICE_EUR));

    if price_pln.is_none() && price_eur.is_none() {
        return RowClass::CategoryUpdate(Category {
            name,
            code: row_code,
        });
    }

    let Some(code) = row_code.or_else(|| ctx.category.and_then(|c| c.code.clone())) else {
        return RowClass::Discarded(DiscardReason::MissingCode);
    };

    let Some(category) = ctx.category else {
        return RowClass::Discarded(DiscardReason::NoCategory);
    };

    let Some(ordinal) = parse_ordinal(cell(COL_ORDINAL)) else {
        return RowClass::Discarded(DiscardReason::InvalidOrdinal);
    };

    RowClass::Item(LineItem {
        category: category.name.clone(),
        ordinal,
        code,
        name,
        price_pln,
        price_eur,
    })
}

/// Whole, non-negative ordinal. Text like `"12."` is accepted.
fn parse_ordinal(cell: &Cell) -> Option<u32> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(raw) => raw.trim().trim_end_matches('.').parse::<f64>().ok()?,
        Cell::Empty => return None,
    };

    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64)
        .then_some(value as u32)
}
