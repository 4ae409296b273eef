//! Price and CPV code normalization.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Cell;

/// Clean a price cell into a two-decimal string.
///
/// Blank, zero and unparsable values are all `None`. Rounding is half away
/// from zero on the decimal digits as written, so `"1.005"` becomes
/// `"1.01"`. Numeric cells are rounded on their shortest decimal form.
pub fn clean_price(cell: &Cell) -> Option<String> {
    let value = match cell {
        Cell::Empty => return None,
        Cell::Number(n) if n.is_finite() => Decimal::from_str(&n.to_string()).ok()?,
        Cell::Number(_) => return None,
        Cell::Text(raw) => parse_price_text(raw)?,
    };

    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        return None;
    }

    Some(format!("{rounded:.2}"))
}

fn parse_price_text(raw: &str) -> Option<Decimal> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    if kept.is_empty() {
        return None;
    }

    let normalized = match (kept.rfind('.'), kept.rfind(',')) {
        (None, Some(_)) => kept.replace(',', "."),
        // 1.234,56
        (Some(dot), Some(comma)) if comma > dot => kept.replace('.', "").replace(',', "."),
        // 1,234.56
        (Some(_), Some(_)) => kept.replace(',', ""),
        _ => kept,
    };

    Decimal::from_str(&normalized).ok()
}

/// Whether `raw` is a CPV code: eight digits, a hyphen, one digit.
pub fn is_valid_code(raw: &str) -> bool {
    let bytes = raw.trim().as_bytes();
    bytes.len() == 10
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[8] == b'-'
        && bytes[9].is_ascii_digit()
}

/// Valid CPV code held by a cell, trimmed.
pub fn code_of(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(raw) if is_valid_code(raw) => Some(raw.trim().to_string()),
        _ => None,
    }
}
