// CSV/TSV import into a single typed dataset

use std::io::Read;
use std::path::Path;

use crate::dataset::{dedupe_headers, Dataset, Scalar};
use crate::error::NormalizeError;

/// Name given to the single dataset a CSV file produces
pub const CSV_DATASET_NAME: &str = "csv_data";

/// Cell texts treated as missing values when types are inferred
const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter; None sniffs it from the first lines
    pub delimiter: Option<u8>,

    /// Recover integer/float/bool columns instead of keeping every cell as text
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: None, infer_types: true }
    }
}

pub fn import(path: &Path, options: &CsvOptions) -> Result<Dataset, NormalizeError> {
    let content = read_file_as_utf8(path)
        .map_err(|e| NormalizeError::Io(format!("{}: {}", path.display(), e)))?;
    import_from_string(&content, options)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        // Lines agreeing with line 1, weighted by field count
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) if s.starts_with('\u{feff}') => Ok(s['\u{feff}'.len_utf8()..].to_string()),
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel on Windows exports CP-1252
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, options: &CsvOptions) -> Result<Dataset, NormalizeError> {
    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(content));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let header = match records.next() {
        Some(result) => result.map_err(|e| NormalizeError::Io(e.to_string()))?,
        None => return Ok(Dataset::empty(CSV_DATASET_NAME)),
    };
    let column_names = dedupe_headers(header.iter().map(str::to_string).collect());
    let width = column_names.len();

    // Raw text per cell; None = field absent on a short row
    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for result in records {
        let record = result.map_err(|e| NormalizeError::Io(e.to_string()))?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(NormalizeError::Io(format!(
                "line {}: expected {} fields, saw {}",
                line,
                width,
                record.len()
            )));
        }
        let mut row: Vec<Option<String>> = record.iter().map(|f| Some(f.to_string())).collect();
        row.resize(width, None);
        raw_rows.push(row);
    }

    let kinds: Vec<ColumnKind> = (0..width)
        .map(|col| {
            if options.infer_types {
                infer_column_kind(raw_rows.iter().filter_map(|r| r[col].as_deref()))
            } else {
                ColumnKind::Text
            }
        })
        .collect();

    let rows: Vec<Vec<Scalar>> = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| match cell {
                    Some(text) => convert_cell(&text, *kind, options.infer_types),
                    None => Scalar::Null,
                })
                .collect()
        })
        .collect();

    log::debug!("csv: {} columns, {} rows (delimiter {:?})", width, rows.len(), delimiter as char);

    Dataset::new(CSV_DATASET_NAME, column_names, rows)
        .map_err(|e| NormalizeError::Io(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

fn is_missing(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || NA_MARKERS.contains(&t)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Narrowest kind every non-missing cell of a column fits
fn infer_column_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut all_int = true;
    let mut all_float = true;
    let mut all_bool = true;
    let mut seen = false;

    for cell in cells.filter(|c| !is_missing(c)) {
        seen = true;
        let t = cell.trim();
        if all_int && t.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_float && t.parse::<f64>().is_err() {
            all_float = false;
        }
        if all_bool && parse_bool(t).is_none() {
            all_bool = false;
        }
        if !all_int && !all_float && !all_bool {
            return ColumnKind::Text;
        }
    }

    if !seen {
        // Column of only missing values
        ColumnKind::Text
    } else if all_int {
        ColumnKind::Int
    } else if all_float {
        ColumnKind::Float
    } else if all_bool {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn convert_cell(text: &str, kind: ColumnKind, infer_types: bool) -> Scalar {
    if infer_types && is_missing(text) {
        return Scalar::Null;
    }
    if text.is_empty() {
        return Scalar::Null;
    }
    let t = text.trim();
    match kind {
        ColumnKind::Int => t.parse().map(Scalar::Int).unwrap_or(Scalar::Null),
        ColumnKind::Float => t.parse().map(Scalar::Float).unwrap_or(Scalar::Null),
        ColumnKind::Bool => parse_bool(t).map(Scalar::Bool).unwrap_or(Scalar::Null),
        ColumnKind::Text => Scalar::Text(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(content: &str) -> Dataset {
        import_from_string(content, &CsvOptions::default()).unwrap()
    }

    #[test]
    fn test_sniff_each_candidate() {
        let cases: [(&str, u8); 4] = [
            ("region,revenue\nNorth,10\nSouth,20\n", b','),
            ("region;revenue\nNorth;10\nSouth;20\n", b';'),
            ("region\trevenue\nNorth\t10\nSouth\t20\n", b'\t'),
            ("region|revenue\nNorth|10\nSouth|20\n", b'|'),
        ];
        for (content, expected) in cases {
            assert_eq!(sniff_delimiter(content), expected, "{content:?}");
        }
    }

    #[test]
    fn test_sniff_single_column_falls_back_to_comma() {
        assert_eq!(sniff_delimiter("total\n5\n7\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_sniff_skips_leading_blank_lines() {
        let content = "\n\nsku;qty;bin\nA1;3;x\nB2;0;y\n";
        assert_eq!(sniff_delimiter(content), b';');

        let ds = parse(content);
        assert_eq!(ds.column_names(), &["sku", "qty", "bin"]);
        assert_eq!(ds.get(1, 1), Some(&Scalar::Int(0)));
    }

    #[test]
    fn test_bom_is_stripped_before_sniffing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("excel.csv");
        fs::write(&path, b"\xef\xbb\xbfid;name\n1;bolt\n").unwrap();

        let ds = import(&path, &CsvOptions::default()).unwrap();
        assert_eq!(ds.column_names(), &["id", "name"]);
        assert_eq!(ds.get(0, 0), Some(&Scalar::Int(1)));
    }

    #[test]
    fn test_header_and_integer_row() {
        let ds = parse("a,b,c\n1,2,3\n");
        assert_eq!(ds.name(), CSV_DATASET_NAME);
        assert_eq!(ds.column_names(), &["a", "b", "c"]);
        assert_eq!(ds.rows(), &[vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)]]);
    }

    #[test]
    fn test_column_kinds_are_inferred_per_column() {
        let ds = parse("id,price,flag,label\n1,2.5,true,x\n2,3,FALSE,7\n");
        assert_eq!(ds.get(0, 0), Some(&Scalar::Int(1)));
        // Integer-looking cell in a float column stays a float
        assert_eq!(ds.get(1, 1), Some(&Scalar::Float(3.0)));
        assert_eq!(ds.get(1, 2), Some(&Scalar::Bool(false)));
        // Mixed column falls back to text, including its numeric cells
        assert_eq!(ds.get(1, 3), Some(&Scalar::Text("7".into())));
    }

    #[test]
    fn test_missing_markers_become_null() {
        let ds = parse("n,s\n1,a\n,NA\nnan,b\n");
        assert_eq!(ds.get(0, 0), Some(&Scalar::Int(1)));
        assert_eq!(ds.get(1, 0), Some(&Scalar::Null));
        assert_eq!(ds.get(1, 1), Some(&Scalar::Null));
        assert_eq!(ds.get(2, 0), Some(&Scalar::Null));
    }

    #[test]
    fn test_no_inference_keeps_text() {
        let options = CsvOptions { delimiter: None, infer_types: false };
        let ds = import_from_string("a,b\n1,NA\n", &options).unwrap();
        assert_eq!(ds.get(0, 0), Some(&Scalar::Text("1".into())));
        assert_eq!(ds.get(0, 1), Some(&Scalar::Text("NA".into())));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let ds = parse("a,b,c\n1\n4,5,6\n");
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows()[0], vec![Scalar::Int(1), Scalar::Null, Scalar::Null]);
    }

    #[test]
    fn test_long_row_is_an_error() {
        let err = import_from_string("a,b\n1,2\n3,4,5\n", &CsvOptions::default()).unwrap_err();
        match err {
            NormalizeError::Io(msg) => assert!(msg.contains("expected 2 fields"), "{msg}"),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_and_empty_file() {
        let ds = parse("a,b\n");
        assert_eq!(ds.column_count(), 2);
        assert_eq!(ds.row_count(), 0);

        let ds = parse("");
        assert_eq!(ds.column_count(), 0);
        assert_eq!(ds.row_count(), 0);
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let ds = parse("x,,x\n1,2,3\n");
        assert_eq!(ds.column_names(), &["x", "Unnamed: 1", "x.1"]);
    }

    #[test]
    fn test_fixed_delimiter_overrides_sniffing() {
        let options = CsvOptions { delimiter: Some(b'|'), infer_types: true };
        let ds = import_from_string("a;b|c\n1;2|3\n", &options).unwrap();
        assert_eq!(ds.column_names(), &["a;b", "c"]);
        assert_eq!(ds.get(0, 1), Some(&Scalar::Int(3)));
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "café" in CP-1252
        fs::write(&path, b"name\ncaf\xe9\n").unwrap();

        let ds = import(&path, &CsvOptions::default()).unwrap();
        assert_eq!(ds.get(0, 0), Some(&Scalar::Text("café".into())));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = import(&dir.path().join("nope.csv"), &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::Io(_)));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn grid() -> impl Strategy<Value = (usize, Vec<Vec<String>>)> {
            (1usize..6).prop_flat_map(|cols| {
                let row = prop::collection::vec("[a-z0-9]{1,5}", cols);
                (Just(cols), prop::collection::vec(row, 1..12))
            })
        }

        proptest! {
            #[test]
            fn shape_matches_input((cols, lines) in grid()) {
                let content: String = lines.iter().map(|r| r.join(",") + "\n").collect();
                let ds = import_from_string(&content, &CsvOptions::default()).unwrap();

                prop_assert_eq!(ds.column_count(), cols);
                prop_assert_eq!(ds.column_names().len(), ds.column_count());
                prop_assert_eq!(ds.row_count(), lines.len() - 1);
                prop_assert_eq!(ds.rows().len(), ds.row_count());
                for row in ds.rows() {
                    prop_assert_eq!(row.len(), cols);
                }
            }
        }
    }
}
