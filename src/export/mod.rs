//! Export of the finished graph as datastore seed documents.

pub mod sink;
pub mod tree;

pub use sink::{DocumentSink, JsonFileSink};
pub use tree::{engine_document, roster_document, COLLECTIONS_KEY};

use std::path::{Path, PathBuf};

use crate::builder::context::BuildContext;
use crate::error::ExportError;

/// Result of a database export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Path of the roster database document.
    pub roster_path: PathBuf,
    /// Path of the assessment-engine database document.
    pub engine_path: PathBuf,
    /// Users in the roster database.
    pub user_count: usize,
    /// Administrations in the roster database.
    pub administration_count: usize,
    /// Mirrored users in the engine database.
    pub engine_user_count: usize,
}

/// Writes both databases under `output_dir`:
/// `admin/admin_db.json` and `assessment/assessment_db.json`.
pub fn export_databases(
    ctx: &BuildContext,
    output_dir: &Path,
    sink: &dyn DocumentSink,
) -> Result<ExportSummary, ExportError> {
    let roster = tree::roster_document(ctx)?;
    let engine = tree::engine_document(ctx)?;

    let roster_path = output_dir.join("admin").join("admin_db.json");
    let engine_path = output_dir.join("assessment").join("assessment_db.json");

    sink.write(&roster, &roster_path)?;
    sink.write(&engine, &engine_path)?;

    Ok(ExportSummary {
        roster_path,
        engine_path,
        user_count: ctx.users.len(),
        administration_count: ctx.administrations.len(),
        engine_user_count: ctx.engine_users.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SyntheticDatasetBuilder;
    use crate::config::GeneratorConfig;
    use tempfile::TempDir;

    #[test]
    fn test_export_databases_writes_both_files() {
        let ctx = SyntheticDatasetBuilder::new(GeneratorConfig::default().with_seed(42))
            .expect("valid config")
            .build()
            .expect("build should succeed");

        let temp_dir = TempDir::new().expect("should create temp dir");
        let sink = JsonFileSink::new();
        let summary =
            export_databases(&ctx, temp_dir.path(), &sink).expect("export should succeed");

        assert!(summary.roster_path.exists());
        assert!(summary.engine_path.exists());
        assert_eq!(summary.user_count, ctx.users.len());
        assert_eq!(summary.engine_user_count, ctx.engine_users.len());
        assert!(summary
            .roster_path
            .ends_with(PathBuf::from("admin/admin_db.json")));
    }
}
