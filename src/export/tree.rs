//! Assembly of the root documents.
//!
//! The reserved `__collections__` key only exists at this boundary; the
//! in-memory graph is fully typed.

use serde_json::{Map, Value};

use crate::builder::context::BuildContext;
use crate::error::ExportError;

/// The reserved key introducing a document's nested sub-collections.
pub const COLLECTIONS_KEY: &str = "__collections__";

/// Builds the roster database document: districts, schools, classes,
/// users and administrations under one reserved root key.
pub fn roster_document(ctx: &BuildContext) -> Result<Value, ExportError> {
    wrap_collections(vec![
        ("districts", serde_json::to_value(&ctx.districts)?),
        ("schools", serde_json::to_value(&ctx.schools)?),
        ("classes", serde_json::to_value(&ctx.classes)?),
        ("users", serde_json::to_value(&ctx.users)?),
        ("administrations", serde_json::to_value(&ctx.administrations)?),
    ])
}

/// Builds the assessment-engine database document: the task catalog and
/// the engine-side users with their nested runs.
pub fn engine_document(ctx: &BuildContext) -> Result<Value, ExportError> {
    wrap_collections(vec![
        ("tasks", serde_json::to_value(&ctx.tasks)?),
        ("users", serde_json::to_value(&ctx.engine_users)?),
    ])
}

fn wrap_collections(entries: Vec<(&str, Value)>) -> Result<Value, ExportError> {
    let mut collections = Map::new();
    for (name, value) in entries {
        collections.insert(name.to_string(), value);
    }
    let mut root = Map::new();
    root.insert(COLLECTIONS_KEY.to_string(), Value::Object(collections));
    Ok(Value::Object(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SyntheticDatasetBuilder;
    use crate::config::GeneratorConfig;

    fn built_context() -> BuildContext {
        SyntheticDatasetBuilder::new(GeneratorConfig::default().with_seed(42))
            .expect("valid config")
            .build()
            .expect("build should succeed")
    }

    #[test]
    fn test_roster_document_top_level_collections() {
        let ctx = built_context();
        let document = roster_document(&ctx).expect("should assemble");

        let collections = document[COLLECTIONS_KEY]
            .as_object()
            .expect("root collections object");
        for name in ["districts", "schools", "classes", "users", "administrations"] {
            assert!(collections.contains_key(name), "missing {}", name);
        }
        assert_eq!(
            collections["districts"].as_object().expect("map").len(),
            ctx.districts.len()
        );
    }

    #[test]
    fn test_engine_document_top_level_collections() {
        let ctx = built_context();
        let document = engine_document(&ctx).expect("should assemble");

        let collections = document[COLLECTIONS_KEY]
            .as_object()
            .expect("root collections object");
        assert_eq!(collections.len(), 2);
        assert_eq!(
            collections["tasks"].as_object().expect("map").len(),
            4
        );
        assert_eq!(
            collections["users"].as_object().expect("map").len(),
            ctx.engine_users.len()
        );
    }

    #[test]
    fn test_nested_subcollections_survive_assembly() {
        let ctx = built_context();
        let document = roster_document(&ctx).expect("should assemble");

        let schools = document[COLLECTIONS_KEY]["schools"]
            .as_object()
            .expect("schools map");
        let with_classes = schools
            .values()
            .filter(|school| school[COLLECTIONS_KEY].get("classes").is_some())
            .count();
        assert_eq!(with_classes, ctx.schools.len());
    }

    #[test]
    fn test_timestamps_are_tagged_objects() {
        let ctx = built_context();
        let document = roster_document(&ctx).expect("should assemble");

        let administrations = document[COLLECTIONS_KEY]["administrations"]
            .as_object()
            .expect("administrations map");
        for administration in administrations.values() {
            assert_eq!(administration["dateOpened"]["__datatype__"], "timestamp");
            assert!(administration["dateOpened"]["value"]["_seconds"].is_i64());
            assert!(administration["dateOpened"]["value"]["_nanoseconds"].is_u64());
        }
    }
}
