//! # Locale Decimal Formatting
//!
//! Quantities and prices arrive as text in the sheet's locale: comma as the
//! decimal separator, dot as the thousands separator, optionally prefixed with
//! a currency symbol. The terminal expects a plain value with exactly two
//! fraction digits and a comma separator.
//!
//! | input | output |
//! |---|---|
//! | `1.234,56` | `1234,56` |
//! | `R$ 27` | `27,00` |
//! | `12.5` | `12,50` |
//! | `3.000` | `3000,00` |

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency markers stripped before parsing, longest first
const CURRENCY_SYMBOLS: [&str; 4] = ["US$", "R$", "$", "€"];

/// A dot-only value grouped in threes, e.g. `1.234` or `12.345.678`
static DOT_THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d{1,3}(\.\d{3})+$").expect("valid thousands pattern"));

/// Parse a locale-formatted decimal. Returns `None` for empty or unparsable text.
pub fn parse_locale_decimal(raw: &str) -> Option<Decimal> {
    let mut value = raw.trim().to_string();
    for symbol in CURRENCY_SYMBOLS {
        value = value.replace(symbol, "");
    }
    let value: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();

    if value.is_empty() {
        return None;
    }

    let normalized = match (value.contains('.'), value.contains(',')) {
        (true, true) => value.replace('.', "").replace(',', "."),
        (false, true) => value.replace(',', "."),
        (true, false) if DOT_THOUSANDS.is_match(&value) => value.replace('.', ""),
        _ => value,
    };

    Decimal::from_str(&normalized).ok()
}

/// Render a decimal with two fraction digits and a comma separator
///
/// The fraction is padded as text: values with 27 or more integer digits
/// cannot be rescaled to two places inside a `Decimal`.
pub fn render_locale_decimal(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().to_string();
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
    format!("{sign}{integer},{fraction:0<2}")
}

/// Normalize a locale-formatted value for submission.
///
/// Empty input stays empty; unparsable input is passed through with dots
/// replaced by commas instead of failing.
pub fn format_locale_decimal(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match parse_locale_decimal(trimmed) {
        Some(value) => render_locale_decimal(value),
        None => trimmed.replace('.', ","),
    }
}
