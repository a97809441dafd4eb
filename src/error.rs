//! Error types for fixture-forge operations.
//!
//! Defines error types for the two failure surfaces of the crate:
//! - Graph construction (reference wiring between generated entities)
//! - Document export (filesystem and serialization)
//!
//! Configuration errors live next to the config type in [`crate::config`].

use thiserror::Error;

/// Errors that can occur while building the entity graph.
///
/// A dangling reference is a programming defect in the generation order,
/// not a recoverable runtime condition: the builder aborts and discards
/// the in-progress graph rather than emitting invalid fixtures.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("dangling reference: {collection}.{field} points at missing id '{id}'")]
    DanglingReference {
        collection: String,
        field: String,
        id: String,
    },

    #[error("task '{0}' has no variants to choose from")]
    EmptyVariantPool(String),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl BuilderError {
    /// Shorthand for the common dangling-reference case.
    pub fn dangling(collection: &str, field: &str, id: &str) -> Self {
        BuilderError::DanglingReference {
            collection: collection.to_string(),
            field: field.to_string(),
            id: id.to_string(),
        }
    }
}

/// Errors that can occur during document export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
