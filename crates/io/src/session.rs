// Caller-owned store of uploaded datasets
//
// An upload normalizes a file and hands back a token; later questions name
// the token. The store lives wherever the caller keeps it (one per request
// handler, per connection, per CLI run) and is never shared implicitly.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::dataset::DatasetCollection;
use crate::error::NormalizeError;
use crate::normalize::{normalize_with_options, NormalizeOptions};

/// Handle for one uploaded collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DatasetToken(Uuid);

impl DatasetToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DatasetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct Workspace {
    options: NormalizeOptions,
    uploads: HashMap<DatasetToken, DatasetCollection>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: NormalizeOptions) -> Self {
        Self { options, uploads: HashMap::new() }
    }

    /// Normalize `path` and keep the result. Nothing is stored on failure.
    pub fn upload(&mut self, path: &Path) -> Result<DatasetToken, NormalizeError> {
        let collection = normalize_with_options(path, &self.options)?;
        let token = DatasetToken::new();
        self.uploads.insert(token, collection);
        log::debug!("upload {} stored as {}", path.display(), token);
        Ok(token)
    }

    pub fn get(&self, token: &DatasetToken) -> Option<&DatasetCollection> {
        self.uploads.get(token)
    }

    pub fn remove(&mut self, token: &DatasetToken) -> Option<DatasetCollection> {
        self.uploads.remove(token)
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }
}

/// `{ "success": bool, "message": string }` reply shape for upload and query results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub success: bool,
    pub message: String,
}

impl Reply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }

    pub fn from_upload(result: &Result<DatasetToken, NormalizeError>) -> Self {
        match result {
            Ok(_) => Self::ok("File uploaded and processed successfully"),
            Err(e) => Self::err(format!("Error processing file: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_uploads_are_isolated() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        fs::write(&first, "a\n1\n").unwrap();
        fs::write(&second, "b,c\n2,3\n4,5\n").unwrap();

        let mut ws = Workspace::new();
        let t1 = ws.upload(&first).unwrap();
        let t2 = ws.upload(&second).unwrap();
        assert_ne!(t1, t2);
        assert_eq!(ws.len(), 2);

        // A later upload does not clobber an earlier one
        assert_eq!(ws.get(&t1).unwrap().get("csv_data").unwrap().column_names(), &["a"]);
        assert_eq!(ws.get(&t2).unwrap().get("csv_data").unwrap().row_count(), 2);

        assert!(ws.remove(&t1).is_some());
        assert!(ws.get(&t1).is_none());
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn test_failed_upload_stores_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let mut ws = Workspace::new();
        let result = ws.upload(&path);
        assert!(result.is_err());
        assert!(ws.is_empty());

        let reply = Reply::from_upload(&result);
        assert!(!reply.success);
        assert!(reply.message.starts_with("Error processing file: unsupported file format"));
    }

    #[test]
    fn test_reply_json() {
        let json = serde_json::to_value(Reply::ok("done")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "done"}));
    }

    #[test]
    fn test_tokens_display_as_uuids() {
        let (a, b) = (DatasetToken::new(), DatasetToken::new());
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a.to_string()).is_ok());
    }
}
