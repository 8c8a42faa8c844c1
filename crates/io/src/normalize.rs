// File-kind detection and dispatch to the matching reader

use std::path::Path;

use crate::csv::{self, CsvOptions};
use crate::dataset::DatasetCollection;
use crate::error::NormalizeError;
use crate::{sqlite, xlsx};

/// The reader a file is routed to, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet,
    Sqlite,
}

impl FileKind {
    /// Classify a path by extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, NormalizeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(FileKind::Csv),
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => {
                Ok(FileKind::Spreadsheet)
            }
            Some("db") | Some("sqlite") | Some("sqlite3") => Ok(FileKind::Sqlite),
            Some(other) => Err(NormalizeError::UnsupportedFormat(format!(".{}", other))),
            None => Err(NormalizeError::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Csv => "csv",
            FileKind::Spreadsheet => "spreadsheet",
            FileKind::Sqlite => "sqlite",
        }
    }
}

/// Options controlling optional behavior during normalization.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub csv: CsvOptions,
}

/// Read a CSV, spreadsheet or SQLite file into a dataset collection
pub fn normalize(path: &Path) -> Result<DatasetCollection, NormalizeError> {
    normalize_with_options(path, &NormalizeOptions::default())
}

/// Read a file with options. Fails as a whole; never returns a partial collection.
pub fn normalize_with_options(
    path: &Path,
    options: &NormalizeOptions,
) -> Result<DatasetCollection, NormalizeError> {
    let kind = FileKind::from_path(path)?;
    log::debug!("normalizing {} as {}", path.display(), kind.as_str());

    let collection = match kind {
        FileKind::Csv => {
            let mut collection = DatasetCollection::new();
            collection.insert(csv::import(path, &options.csv)?);
            collection
        }
        FileKind::Spreadsheet => xlsx::import(path)?,
        FileKind::Sqlite => sqlite::import(path)?,
    };

    log::info!("{}: {} dataset(s)", path.display(), collection.len());
    Ok(collection)
}
