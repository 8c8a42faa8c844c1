// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::dataset::DatasetCollection;

/// Serialize a collection as a JSON object keyed by dataset name
pub fn to_string(collection: &DatasetCollection, pretty: bool) -> Result<String, String> {
    if pretty {
        serde_json::to_string_pretty(collection).map_err(|e| e.to_string())
    } else {
        serde_json::to_string(collection).map_err(|e| e.to_string())
    }
}

/// Write a collection to `path` as JSON
pub fn export(collection: &DatasetCollection, path: &Path, pretty: bool) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(&mut writer, collection).map_err(|e| e.to_string())?;
    } else {
        serde_json::to_writer(&mut writer, collection).map_err(|e| e.to_string())?;
    }
    writer.write_all(b"\n").map_err(|e| e.to_string())?;
    writer.flush().map_err(|e| e.to_string())?;

    Ok(())
}
