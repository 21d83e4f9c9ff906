//! CSV fixture reading.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::Value;

use super::clean::clean_value;
use crate::domain::batch::TableBatch;
use crate::domain::table::{Column, TableSchema};
use crate::error::{DataError, Result};

/// Read and clean a fixture file for `table`.
pub fn read_file(table: &'static TableSchema, path: &Path) -> Result<TableBatch> {
    let file = std::fs::File::open(path)?;
    read_from(table, file)
}

/// Read and clean CSV content for `table` from any reader.
///
/// The header row must name columns of the table; every cell is cleaned for
/// its column's declared kind. Only headers are trimmed, cells keep their
/// whitespace.
pub fn read_from<R: Read>(table: &'static TableSchema, source: R) -> Result<TableBatch> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(DataError::EmptyFile(table.name.to_string()).into());
    }
    let columns = resolve_columns(table, &headers)?;
    let mut batch = TableBatch::new(table, columns);

    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, csv::Position::line);
        batch.rows.push(clean_record(table, &batch.columns, &record, line)?);
    }

    Ok(batch)
}

fn resolve_columns(
    table: &'static TableSchema,
    headers: &StringRecord,
) -> Result<Vec<&'static Column>> {
    headers
        .iter()
        .map(|header| {
            // Tolerate a byte-order mark on the first header.
            let name = header.trim_start_matches('\u{feff}');
            table.column(name).ok_or_else(|| {
                DataError::UnknownColumn {
                    table: table.name.to_string(),
                    column: name.to_string(),
                }
                .into()
            })
        })
        .collect()
}

fn clean_record(
    table: &'static TableSchema,
    columns: &[&'static Column],
    record: &StringRecord,
    line: u64,
) -> Result<Vec<crate::domain::value::CellValue>> {
    columns
        .iter()
        .zip(record.iter())
        .map(|(column, raw)| {
            clean_value(column.kind, &Value::String(raw.to_string())).map_err(|err| {
                DataError::InvalidValue {
                    table: table.name,
                    column: column.name,
                    line,
                    raw: raw.to_string(),
                    expected: err.expected,
                }
                .into()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::{CUSTOMERS, INVENTORY_ITEMS, LOCATIONS, ORDERS};
    use crate::domain::value::CellValue;
    use crate::error::Error;

    #[test]
    fn reads_and_cleans_customer_rows() {
        let csv = "customer_id,first_name,preferred_eras,total_spent,date_of_birth\n\
                   1,Ada,\"['1970s', '1980s']\",12.5,1990-05-01\n\
                   2,,NaN,,\n";
        let batch = read_from(&CUSTOMERS, csv.as_bytes()).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.value(0, "preferred_eras"),
            Some(&CellValue::TextArray(vec![
                Some("1970s".into()),
                Some("1980s".into())
            ]))
        );
        assert_eq!(batch.value(1, "first_name"), Some(&CellValue::Null));
        assert_eq!(batch.value(1, "preferred_eras"), Some(&CellValue::Null));
        assert_eq!(batch.value(1, "total_spent"), Some(&CellValue::Null));
    }

    #[test]
    fn measurements_with_escaped_quotes() {
        let csv = "item_id,item_name,category,selling_price,measurements\n\
                   1,Coat,jackets,40,\"{\"\"chest\"\": \"\"36\\\"\"\"\"}\"\n\
                   2,Hat,accessories,10,\"{not json\"\n";
        let batch = read_from(&INVENTORY_ITEMS, csv.as_bytes()).unwrap();
        assert_eq!(
            batch.value(0, "measurements"),
            Some(&CellValue::Json(serde_json::json!({"chest": "36\""})))
        );
        assert_eq!(batch.value(1, "measurements"), Some(&CellValue::Null));
    }

    #[test]
    fn unknown_header_is_a_data_error() {
        let csv = "order_id,favourite_colour\n1,red\n";
        let err = read_from(&ORDERS, csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::Data(DataError::UnknownColumn { ref column, .. }) if column == "favourite_colour"
        ));
    }

    #[test]
    fn bad_scalar_reports_line_and_column() {
        let csv = "order_id,subtotal\n1,10.00\n2,lots\n";
        let err = read_from(&ORDERS, csv.as_bytes()).unwrap_err();
        match err {
            Error::Data(DataError::InvalidValue {
                column, line, raw, ..
            }) => {
                assert_eq!(column, "subtotal");
                assert_eq!(line, 3);
                assert_eq!(raw, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_file_is_an_empty_batch() {
        let batch = read_from(&ORDERS, "order_id,subtotal\n".as_bytes()).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.columns.len(), 2);
    }

    #[test]
    fn empty_file_is_a_data_error() {
        let err = read_from(&ORDERS, "".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::Data(DataError::EmptyFile(ref table)) if table == "orders"
        ));
    }

    #[test]
    fn cells_keep_surrounding_whitespace() {
        let csv = " location_id , location_name ,city\n1,  Queen St  , NA \n";
        let batch = read_from(&LOCATIONS, csv.as_bytes()).unwrap();
        assert_eq!(batch.value(0, "location_name"), Some(&CellValue::Text("  Queen St  ".into())));
        assert_eq!(batch.value(0, "city"), Some(&CellValue::Null));
        assert_eq!(batch.value(0, "location_id"), Some(&CellValue::Integer(1)));
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let csv = "order_id,subtotal\n1,10.00,extra\n";
        let err = read_from(&ORDERS, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Data(DataError::Csv(_))));
    }
}
