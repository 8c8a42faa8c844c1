use thiserror::Error;

/// Why a file could not be normalized. Any error aborts the whole read;
/// callers never see a partially filled collection.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Extension matches none of the recognized kinds
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// CSV or spreadsheet file missing, unreadable, or malformed
    #[error("I/O error: {0}")]
    Io(String),

    /// SQLite file could not be opened, or a table could not be read
    #[error("database error: {0}")]
    Database(String),
}

impl NormalizeError {
    /// Stable machine-readable kind, used in JSON replies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizeError::UnsupportedFormat(_) => "unsupported_format",
            NormalizeError::Io(_) => "io_error",
            NormalizeError::Database(_) => "database_error",
        }
    }
}

impl From<rusqlite::Error> for NormalizeError {
    fn from(e: rusqlite::Error) -> Self {
        NormalizeError::Database(e.to_string())
    }
}
