// File normalization: CSV, spreadsheet and SQLite files into uniform datasets

pub mod context;
pub mod csv;
pub mod dataset;
pub mod error;
pub mod json;
pub mod normalize;
pub mod session;
pub mod sqlite;
pub mod xlsx;

pub use dataset::{Dataset, DatasetCollection, Scalar};
pub use error::NormalizeError;
pub use normalize::{normalize, normalize_with_options, FileKind, NormalizeOptions};
