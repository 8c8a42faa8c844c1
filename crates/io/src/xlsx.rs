// Spreadsheet import (xlsx, plus the other workbook formats calamine reads)
//
// Each sheet becomes one dataset. The first row of the sheet's used range is
// the header; every later row is data.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::Timelike;

use crate::dataset::{dedupe_headers, Dataset, DatasetCollection, Scalar};
use crate::error::NormalizeError;

/// Import every sheet of a workbook, in file order
pub fn import(path: &Path) -> Result<DatasetCollection, NormalizeError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| NormalizeError::Io(format!("Failed to open workbook: {}", e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut collection = DatasetCollection::new();

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| NormalizeError::Io(format!("Failed to read sheet '{}': {}", sheet_name, e)))?;

        let dataset = sheet_to_dataset(sheet_name, &range)?;
        log::debug!(
            "sheet '{}': {} columns, {} rows",
            sheet_name,
            dataset.column_count(),
            dataset.row_count()
        );
        collection.insert(dataset);
    }

    Ok(collection)
}

fn sheet_to_dataset(name: &str, range: &Range<Data>) -> Result<Dataset, NormalizeError> {
    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(Dataset::empty(name));
    }

    let mut rows_iter = range.rows();
    let header: Vec<String> = match rows_iter.next() {
        Some(row) => row.iter().map(header_text).collect(),
        None => return Ok(Dataset::empty(name)),
    };
    let column_names = dedupe_headers(header);

    let rows: Vec<Vec<Scalar>> = rows_iter
        .map(|row| {
            let mut values: Vec<Scalar> = row.iter().map(cell_to_scalar).collect();
            // calamine ranges are rectangular, but keep the width invariant regardless
            values.resize(width, Scalar::Null);
            values
        })
        .collect();

    Dataset::new(name, column_names, rows)
        .map_err(|e| NormalizeError::Io(format!("sheet '{}': {}", name, e)))
}

fn header_text(cell: &Data) -> String {
    match cell_to_scalar(cell) {
        Scalar::Null => String::new(),
        Scalar::Bool(b) => (if b { "True" } else { "False" }).to_string(),
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Text(s) => s,
        Scalar::Blob(_) => String::new(),
    }
}

/// Map one calamine cell to a scalar
fn cell_to_scalar(cell: &Data) -> Scalar {
    match cell {
        Data::Empty => Scalar::Null,
        Data::String(s) if s.is_empty() => Scalar::Null,
        Data::String(s) => Scalar::Text(s.clone()),
        // Excel stores every number as a double; whole values read back as integers
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => Scalar::Int(*n as i64),
        Data::Float(n) => Scalar::Float(*n),
        Data::Int(n) => Scalar::Int(*n),
        Data::Bool(b) => Scalar::Bool(*b),
        Data::Error(e) => Scalar::Text(e.to_string()),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                match dt.as_duration() {
                    Some(d) => Scalar::Text(format_duration(d.num_seconds())),
                    None => Scalar::Float(dt.as_f64()),
                }
            } else {
                match dt.as_datetime() {
                    Some(ts) if ts.hour() == 0 && ts.minute() == 0 && ts.second() == 0 => {
                        Scalar::Text(ts.format("%Y-%m-%d").to_string())
                    }
                    Some(ts) => Scalar::Text(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
                    None => Scalar::Float(dt.as_f64()),
                }
            }
        }
        Data::DateTimeIso(s) => Scalar::Text(s.clone()),
        Data::DurationIso(s) => Scalar::Text(s.clone()),
    }
}

fn format_duration(total_seconds: i64) -> String {
    let sign = if total_seconds < 0 { "-" } else { "" };
    let secs = total_seconds.unsigned_abs();
    format!("{}{}:{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60, secs % 60)
}
