//! Document sinks.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use crate::error::ExportError;

/// Writes an assembled document tree to a destination.
///
/// The sink must preserve nested-map structure exactly; key ordering is
/// not significant.
pub trait DocumentSink {
    fn write(&self, document: &Value, path: &Path) -> Result<(), ExportError>;
}

/// Sink that writes documents as JSON files, creating parent directories
/// as needed.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    pretty: bool,
}

impl Default for JsonFileSink {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonFileSink {
    /// Creates a pretty-printing sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that writes compact JSON.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl DocumentSink for JsonFileSink {
    fn write(&self, document: &Value, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, document)?;
        } else {
            serde_json::to_writer(&mut writer, document)?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), "wrote fixture document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_writes_parseable_json() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("out.json");

        let document = json!({"a": {"b": [1, 2, 3]}});
        JsonFileSink::new()
            .write(&document, &path)
            .expect("should write");

        let content = fs::read_to_string(&path).expect("should read back");
        let parsed: Value = serde_json::from_str(&content).expect("should parse");
        assert_eq!(parsed, document);
    }

    #[test]
    fn test_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("nested").join("deeper").join("out.json");

        JsonFileSink::compact()
            .write(&json!({}), &path)
            .expect("should write");
        assert!(path.exists());
    }
}
