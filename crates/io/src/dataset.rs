// Uniform dataset model shared by every reader

use base64::Engine as _;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// A single cell value, with the source's scalar type preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(n) => serializer.serialize_i64(*n),
            // JSON has no NaN/Infinity
            Scalar::Float(n) if !n.is_finite() => serializer.serialize_unit(),
            Scalar::Float(n) => serializer.serialize_f64(*n),
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::Blob(bytes) => {
                serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
        }
    }
}

/// A row whose width disagrees with the dataset's column count
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {row} has {found} values, expected {expected}")]
pub struct ShapeError {
    /// 0-indexed data row (header excluded)
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

/// One named table: a CSV's contents, one sheet, or one database table.
///
/// Every row holds exactly `column_count()` values; `new` refuses anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    column_names: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl Dataset {
    pub fn new(
        name: impl Into<String>,
        column_names: Vec<String>,
        rows: Vec<Vec<Scalar>>,
    ) -> Result<Self, ShapeError> {
        let expected = column_names.len();
        if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(ShapeError { row, expected, found: bad.len() });
        }
        Ok(Self { name: name.into(), column_names, rows })
    }

    /// A dataset with no columns and no rows (empty sheet, header-less file)
    pub fn empty(name: impl Into<String>) -> Self {
        Self { name: name.into(), column_names: Vec::new(), rows: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Value at (row, col), 0-indexed over data rows
    pub fn get(&self, row: usize, col: usize) -> Option<&Scalar> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Dataset", 4)?;
        s.serialize_field("column_names", &self.column_names)?;
        s.serialize_field("column_count", &self.column_count())?;
        s.serialize_field("rows", &self.rows)?;
        s.serialize_field("row_count", &self.row_count())?;
        s.end()
    }
}

/// All datasets read from one file, keyed by name, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetCollection {
    datasets: Vec<Dataset>,
}

impl DatasetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset. A dataset with the same name is replaced in place,
    /// keeping its original position.
    pub fn insert(&mut self, dataset: Dataset) {
        match self.datasets.iter_mut().find(|d| d.name == dataset.name) {
            Some(existing) => *existing = dataset,
            None => self.datasets.push(dataset),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dataset> {
        self.datasets.iter()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl<'a> IntoIterator for &'a DatasetCollection {
    type Item = &'a Dataset;
    type IntoIter = std::slice::Iter<'a, Dataset>;

    fn into_iter(self) -> Self::IntoIter {
        self.datasets.iter()
    }
}

impl Serialize for DatasetCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.datasets.len()))?;
        for dataset in &self.datasets {
            map.serialize_entry(&dataset.name, dataset)?;
        }
        map.end()
    }
}

/// Make header names usable as keys: blanks become `Unnamed: {i}`,
/// repeats get `.1`, `.2`, ... suffixes.
pub(crate) fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while out.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}
