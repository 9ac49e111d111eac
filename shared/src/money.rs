//! Price helpers
//!
//! Prices are carried as [`Decimal`] at full precision everywhere. Rounding to
//! two fraction digits happens only here, at display time.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Format an amount for display, e.g. `$5.00`
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${:.2}", rounded)
}

/// Parse a persisted decimal string (`"5"`, `"4.75"`, `"0.30000000000000004"`)
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
