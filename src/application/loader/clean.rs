//! Per-column value cleaning.
//!
//! Raw values arrive as JSON values: CSV cells are strings, while callers
//! holding native data can pass arrays, objects, numbers or booleans directly.
//! Each value is coerced to the declared [`ColumnKind`] of its column.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use super::literal;
use crate::domain::table::ColumnKind;
use crate::domain::value::{round_to_scale, CellValue};

/// Tokens read as missing values, matching the usual dataframe NA set.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_TOKENS: &[&str] = &["true", "t", "yes", "y", "1", "on"];
const FALSE_TOKENS: &[&str] = &["false", "f", "no", "n", "0", "off"];

/// A value that could not be coerced to its declared kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    pub expected: &'static str,
}

/// Whether `raw` stands for a missing value.
#[must_use]
pub fn is_missing(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(text) => MISSING_TOKENS.contains(&text.trim()),
        _ => false,
    }
}

/// Clean one raw value for a column of the given kind.
///
/// Missing values become `Null` for every kind. Array and JSON columns never
/// fail: malformed arrays fall back to the raw string and malformed JSON
/// becomes `Null`. Scalar kinds fail with a [`CoerceError`].
pub fn clean_value(kind: ColumnKind, raw: &Value) -> Result<CellValue, CoerceError> {
    if is_missing(raw) {
        return Ok(CellValue::Null);
    }

    let fail = || CoerceError {
        expected: kind.label(),
    };

    match kind {
        ColumnKind::TextArray => Ok(CellValue::TextArray(clean_array(raw))),
        ColumnKind::Json => Ok(clean_json(raw)),
        ColumnKind::Bool => Ok(CellValue::Bool(clean_bool(raw))),
        ColumnKind::Integer => clean_integer(raw).map(CellValue::Integer).ok_or_else(fail),
        ColumnKind::Decimal { scale } => clean_decimal(raw)
            .map(|value| CellValue::Decimal(round_to_scale(value, scale), scale))
            .ok_or_else(fail),
        ColumnKind::Text => Ok(CellValue::Text(scalar_text(raw))),
        ColumnKind::Date => clean_date(raw).map(CellValue::Date).ok_or_else(fail),
        ColumnKind::Timestamp => clean_timestamp(raw).map(CellValue::Timestamp).ok_or_else(fail),
    }
}

/// Normalize an array-typed value to a sequence of strings.
///
/// Null items stay missing. A literal that does not parse is kept whole as a
/// one-element sequence.
#[must_use]
pub fn clean_array(raw: &Value) -> Vec<Option<String>> {
    match raw {
        Value::Array(items) => items
            .iter()
            .map(|item| (!item.is_null()).then(|| scalar_text(item)))
            .collect(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                match literal::parse_list(trimmed) {
                    Ok(items) => items,
                    Err(err) => {
                        debug!(value = %text, error = %err, "Unparseable list literal, keeping raw text");
                        vec![Some(text.clone())]
                    }
                }
            } else {
                vec![Some(text.clone())]
            }
        }
        other => vec![Some(scalar_text(other))],
    }
}

fn clean_json(raw: &Value) -> CellValue {
    match raw {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(value) => CellValue::Json(value),
            Err(err) => {
                debug!(value = %text, error = %err, "Invalid JSON, storing NULL");
                CellValue::Null
            }
        },
        other => CellValue::Json(other.clone()),
    }
}

fn clean_bool(raw: &Value) -> bool {
    match raw {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => {
            let lowered = text.trim().to_ascii_lowercase();
            if TRUE_TOKENS.contains(&lowered.as_str()) {
                true
            } else if FALSE_TOKENS.contains(&lowered.as_str()) {
                false
            } else if let Ok(number) = lowered.parse::<f64>() {
                number != 0.0
            } else {
                !lowered.is_empty()
            }
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

fn clean_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(whole_f64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| {
                // Integer columns with gaps are often exported as floats ("12.0").
                parse_decimal(text)
                    .filter(|d| d.fract().is_zero())
                    .and_then(|d| i64::try_from(d).ok())
            })
        }
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    }
}

fn whole_f64(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(value as i64)
    } else {
        None
    }
}

fn clean_decimal(raw: &Value) -> Option<Decimal> {
    match raw {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text.trim()),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.strip_prefix('$').unwrap_or(text);
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn clean_date(raw: &Value) -> Option<NaiveDate> {
    let text = raw.as_str()?.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(text).map(|ts| ts.date()))
}

fn clean_timestamp(raw: &Value) -> Option<NaiveDateTime> {
    let text = raw.as_str()?.trim();
    parse_timestamp(text).or_else(|| {
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

/// Parse a timestamp, converting zoned values to UTC.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return Some(zoned.naive_utc());
    }
    if let Ok(zoned) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(zoned.naive_utc());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn scalar_text(raw: &Value) -> String {
    match raw {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn missing_tokens_become_null_for_every_kind() {
        let kinds = [
            ColumnKind::Integer,
            ColumnKind::Decimal { scale: 2 },
            ColumnKind::Text,
            ColumnKind::Bool,
            ColumnKind::Date,
            ColumnKind::Timestamp,
            ColumnKind::TextArray,
            ColumnKind::Json,
        ];
        for kind in kinds {
            for token in ["", "NaN", "nan", "NULL", "None", "N/A", "<NA>", "  "] {
                assert_eq!(
                    clean_value(kind, &text(token)).unwrap(),
                    CellValue::Null,
                    "{kind:?} {token:?}"
                );
            }
            assert_eq!(clean_value(kind, &Value::Null).unwrap(), CellValue::Null);
        }
    }

    fn some(items: &[&str]) -> Vec<Option<String>> {
        items.iter().map(|item| Some((*item).to_string())).collect()
    }

    #[test]
    fn string_encoded_list_becomes_sequence() {
        let cleaned = clean_value(ColumnKind::TextArray, &text("['1970s','1980s']")).unwrap();
        assert_eq!(cleaned, CellValue::TextArray(some(&["1970s", "1980s"])));
    }

    #[test]
    fn array_cleaning_is_idempotent() {
        let first = clean_array(&text("['boho', 'retro']"));
        let again = clean_array(&json!(first.clone()));
        assert_eq!(first, again);

        let native = json!(["a", "b", "c"]);
        assert_eq!(clean_array(&native), some(&["a", "b", "c"]));
        assert_eq!(clean_array(&json!(clean_array(&native))), some(&["a", "b", "c"]));
    }

    #[test]
    fn bare_scalar_is_wrapped() {
        assert_eq!(clean_array(&text("vintage")), some(&["vintage"]));
        assert_eq!(clean_array(&json!(42)), some(&["42"]));
    }

    #[test]
    fn malformed_literal_falls_back_to_raw_string() {
        assert_eq!(clean_array(&text("['broken")), some(&["['broken"]));
        assert_eq!(clean_array(&text("[[1], [2]]")), some(&["[[1], [2]]"]));
        assert_eq!(clean_array(&text("[vintage, retro]")), some(&["[vintage, retro]"]));
    }

    #[test]
    fn none_inside_a_literal_stays_missing() {
        assert_eq!(
            clean_array(&text("['a', None]")),
            vec![Some("a".to_string()), None]
        );
        assert_eq!(
            clean_array(&json!(["a", null])),
            vec![Some("a".to_string()), None]
        );
    }

    #[test]
    fn native_array_items_are_stringified() {
        assert_eq!(clean_array(&json!([1, true, "x"])), some(&["1", "true", "x"]));
    }

    #[test]
    fn measurements_json_is_parsed() {
        let raw = text(r#"{"chest":"36\""}"#);
        assert_eq!(
            clean_value(ColumnKind::Json, &raw).unwrap(),
            CellValue::Json(json!({"chest": "36\""}))
        );
    }

    #[test]
    fn malformed_json_yields_null() {
        assert_eq!(
            clean_value(ColumnKind::Json, &text("{chest: 36")).unwrap(),
            CellValue::Null
        );
    }

    #[test]
    fn native_mapping_passes_through() {
        let raw = json!({"waist": "28\""});
        assert_eq!(
            clean_value(ColumnKind::Json, &raw).unwrap(),
            CellValue::Json(raw.clone())
        );
    }

    #[test]
    fn booleans_from_any_representation() {
        for truthy in ["True", "true", "T", "yes", "1", "1.0", "on", "anything"] {
            assert_eq!(
                clean_value(ColumnKind::Bool, &text(truthy)).unwrap(),
                CellValue::Bool(true),
                "{truthy}"
            );
        }
        for falsy in ["False", "false", "f", "No", "0", "0.0", "off"] {
            assert_eq!(
                clean_value(ColumnKind::Bool, &text(falsy)).unwrap(),
                CellValue::Bool(false),
                "{falsy}"
            );
        }
        assert_eq!(clean_value(ColumnKind::Bool, &json!(0)).unwrap(), CellValue::Bool(false));
        assert_eq!(clean_value(ColumnKind::Bool, &json!(true)).unwrap(), CellValue::Bool(true));
    }

    #[test]
    fn integers_accept_float_spelling_of_whole_numbers() {
        assert_eq!(clean_value(ColumnKind::Integer, &text("12")).unwrap(), CellValue::Integer(12));
        assert_eq!(clean_value(ColumnKind::Integer, &text("12.0")).unwrap(), CellValue::Integer(12));
        assert_eq!(clean_value(ColumnKind::Integer, &json!(7.0)).unwrap(), CellValue::Integer(7));
    }

    #[test]
    fn uncoercible_scalars_are_errors() {
        assert_eq!(
            clean_value(ColumnKind::Integer, &text("12.5")),
            Err(CoerceError { expected: "integer" })
        );
        assert!(clean_value(ColumnKind::Decimal { scale: 2 }, &text("abc")).is_err());
        assert!(clean_value(ColumnKind::Date, &text("yesterday")).is_err());
        assert!(clean_value(ColumnKind::Timestamp, &json!(5)).is_err());
    }

    #[test]
    fn decimals_round_to_column_scale() {
        assert_eq!(
            clean_value(ColumnKind::Decimal { scale: 2 }, &text("19.995")).unwrap(),
            CellValue::Decimal(dec!(20.00), 2)
        );
        assert_eq!(
            clean_value(ColumnKind::Decimal { scale: 4 }, &json!(0.12345)).unwrap(),
            CellValue::Decimal(dec!(0.1235), 4)
        );
        assert_eq!(
            clean_value(ColumnKind::Decimal { scale: 2 }, &text("$5")).unwrap(),
            CellValue::Decimal(dec!(5), 2)
        );
    }

    #[test]
    fn dates_and_timestamps() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            clean_value(ColumnKind::Date, &text("2024-03-09")).unwrap(),
            CellValue::Date(date)
        );
        assert_eq!(
            clean_value(ColumnKind::Date, &text("2024-03-09 14:30:00")).unwrap(),
            CellValue::Date(date)
        );

        let ts = date.and_hms_opt(14, 30, 0).unwrap();
        for raw in [
            "2024-03-09 14:30:00",
            "2024-03-09T14:30:00",
            "2024-03-09T14:30:00Z",
            "2024-03-09T10:30:00-04:00",
            "2024-03-09 14:30:00.000000",
        ] {
            assert_eq!(
                clean_value(ColumnKind::Timestamp, &text(raw)).unwrap(),
                CellValue::Timestamp(ts),
                "{raw}"
            );
        }
        assert_eq!(
            clean_value(ColumnKind::Timestamp, &text("2024-03-09")).unwrap(),
            CellValue::Timestamp(date.and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn text_keeps_content_and_stringifies_scalars() {
        assert_eq!(
            clean_value(ColumnKind::Text, &text("Queen St Market")).unwrap(),
            CellValue::Text("Queen St Market".into())
        );
        assert_eq!(
            clean_value(ColumnKind::Text, &json!(5)).unwrap(),
            CellValue::Text("5".into())
        );
    }
}
