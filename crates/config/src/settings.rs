// Application settings
// Loaded from ~/.config/datalens/settings.json

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    // CSV
    /// Fixed field delimiter; unset = sniff from the file
    #[serde(rename = "csv.delimiter")]
    pub csv_delimiter: Option<char>,

    #[serde(rename = "csv.inferTypes")]
    pub csv_infer_types: bool,

    // Context
    #[serde(rename = "context.sampleRows")]
    pub context_sample_rows: usize,

    // Output
    #[serde(rename = "output.prettyJson")]
    pub pretty_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csv_delimiter: None,
            csv_infer_types: true,
            context_sample_rows: 3,
            pretty_json: true,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // CSV parsing
    // Delimiter: null = detect from the file, or one character such as ";"
    "csv.delimiter": null,
    "csv.inferTypes": true,

    // Data context sent along with questions
    "context.sampleRows": 3,

    // JSON output
    "output.prettyJson": true
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datalens");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, writing a commented
    /// default file on first run
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            Self::create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with `//`
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// CSV delimiter as a byte, if one is configured and is ASCII
    pub fn csv_delimiter_byte(&self) -> Option<u8> {
        self.csv_delimiter.filter(|c| c.is_ascii()).map(|c| c as u8)
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_file_parses_to_defaults() {
        assert_eq!(Settings::parse(DEFAULT_CONFIG).unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let settings = Settings::parse(
            r#"{
                // only the delimiter
                "csv.delimiter": ";"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.csv_delimiter, Some(';'));
        assert_eq!(settings.csv_delimiter_byte(), Some(b';'));
        assert!(settings.csv_infer_types);
        assert_eq!(settings.context_sample_rows, 3);
    }

    #[test]
    fn test_missing_and_broken_files_fall_back() {
        let dir = tempdir().unwrap();
        assert_eq!(Settings::load_from(&dir.path().join("absent.json")), Settings::default());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&broken), Settings::default());
    }

    #[test]
    fn test_every_key_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "csv.delimiter": "\t",
                "csv.inferTypes": false,
                "context.sampleRows": 5,
                "output.prettyJson": false
            }"#,
        )
        .unwrap();

        let expected = Settings {
            csv_delimiter: Some('\t'),
            csv_infer_types: false,
            context_sample_rows: 5,
            pretty_json: false,
        };
        assert_eq!(Settings::load_from(&path), expected);
    }

    #[test]
    fn test_non_ascii_delimiter_is_ignored() {
        let settings = Settings { csv_delimiter: Some('§'), ..Settings::default() };
        assert_eq!(settings.csv_delimiter_byte(), None);
    }
}
