// Human-readable dataset summaries for `dlens inspect`

use datalens_io::{Dataset, DatasetCollection, Scalar};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a single preview column may grow before cells are cut with ".."
const MAX_CELL_WIDTH: usize = 24;

/// Render every dataset in `collection`: a header line, then up to
/// `preview_rows` rows as an aligned table.
pub(crate) fn render_collection(collection: &DatasetCollection, preview_rows: usize) -> String {
    let mut out = String::new();
    for (i, dataset) in collection.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&render_dataset(dataset, preview_rows));
    }
    out
}

fn render_dataset(dataset: &Dataset, preview_rows: usize) -> String {
    let mut out = format!(
        "{}  {} rows x {} columns\n",
        dataset.name(),
        dataset.row_count(),
        dataset.column_count()
    );
    if dataset.column_count() == 0 || preview_rows == 0 {
        return out;
    }

    let rows: Vec<Vec<String>> = dataset
        .rows()
        .iter()
        .take(preview_rows)
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let widths: Vec<usize> = dataset
        .column_names()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let widest = rows
                .iter()
                .map(|row| UnicodeWidthStr::width(row[col].as_str()))
                .fold(UnicodeWidthStr::width(name.as_str()), usize::max);
            widest.min(MAX_CELL_WIDTH)
        })
        .collect();

    out.push_str(&table_line(dataset.column_names(), &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&table_line(&rule, &widths));
    for row in &rows {
        out.push_str(&table_line(row, &widths));
    }
    if dataset.row_count() > rows.len() {
        out.push_str(&format!("... {} more rows\n", dataset.row_count() - rows.len()));
    }
    out
}

fn table_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad_right(cell, *width))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Plain text for a cell; nulls are blank and blobs show their size
fn cell_text(value: &Scalar) -> String {
    match value {
        Scalar::Null => String::new(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Text(s) => s.replace(['\n', '\r', '\t'], " "),
        Scalar::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}

/// Cut `s` to at most `width` display columns, ending in ".." when shortened.
fn truncate_display(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    let budget = width.saturating_sub(2);
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    if width >= 2 {
        out.push_str("..");
    }
    out
}

/// Pad with spaces or truncate so `s` fills exactly `width` display columns
fn pad_right(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let used = UnicodeWidthStr::width(cut.as_str());
    format!("{}{}", cut, " ".repeat(width.saturating_sub(used)))
}
