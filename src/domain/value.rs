//! Typed cell values headed for the warehouse.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Storage format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for timestamps, matching SQLite's `CURRENT_TIMESTAMP`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A cleaned value, already coerced to its column's declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Decimal together with the scale of its column.
    Decimal(Decimal, u32),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    /// `None` items are missing elements inside the list.
    TextArray(Vec<Option<String>>),
    Json(serde_json::Value),
}

impl CellValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Textual storage form for the non-numeric kinds.
    ///
    /// Returns `None` for `Null`, `Bool` and `Integer`, which bind natively.
    #[must_use]
    pub fn storage_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::Bool(_) | Self::Integer(_) => None,
            Self::Decimal(value, scale) => Some(format_decimal(*value, *scale)),
            Self::Text(text) => Some(text.clone()),
            Self::Date(date) => Some(date.format(DATE_FORMAT).to_string()),
            Self::Timestamp(ts) => Some(format_timestamp(*ts)),
            Self::TextArray(items) => Some(
                serde_json::Value::Array(
                    items
                        .iter()
                        .map(|item| item.clone().map_or(serde_json::Value::Null, serde_json::Value::String))
                        .collect(),
                )
                .to_string(),
            ),
            Self::Json(value) => Some(value.to_string()),
        }
    }
}

/// Canonical text of a decimal padded to `scale` fractional digits.
#[must_use]
pub fn format_decimal(value: Decimal, scale: u32) -> String {
    let mut value = round_to_scale(value, scale);
    value.rescale(scale);
    value.to_string()
}

/// Round half away from zero, the way `NUMERIC(p, s)` columns store values.
#[must_use]
pub fn round_to_scale(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

#[must_use]
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

#[must_use]
pub fn encode_text_array(items: &[String]) -> String {
    serde_json::Value::from(items.to_vec()).to_string()
}
