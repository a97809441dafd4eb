//! Assessment-engine entities: the task/variant catalog and the per-user
//! run/trial mirror.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::provider::FakeDataProvider;

/// A fixed assessment category. Variants hang off it as a sub-collection.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub name: String,
    #[serde(rename = "__collections__")]
    pub collections: TaskCollections,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskCollections {
    pub variants: BTreeMap<String, Variant>,
}

impl Task {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            name: name.to_string(),
            collections: TaskCollections::default(),
        }
    }
}

/// One configured version of a task, composed of ordered blocks.
///
/// `blocks_string` carries the same blocks pre-serialized, matching the
/// consuming app's denormalized storage format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub description: String,
    pub name: String,
    pub scr_hash: String,
    pub blocks: Vec<Block>,
    pub blocks_string: String,
}

impl Variant {
    /// Creates a variant over an ordered block list.
    pub fn generate(provider: &mut FakeDataProvider, blocks: Vec<Block>) -> Self {
        let blocks_string =
            serde_json::to_string(&blocks).unwrap_or_else(|_| "[]".to_string());
        Self {
            id: provider.doc_id(),
            description: "variant Description".to_string(),
            name: provider.prefixed("variant-", 4),
            scr_hash: String::new(),
            blocks,
            blocks_string,
        }
    }
}

/// A block inside a variant. `block_number` runs 0..k-1 in order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub block_number: u32,
    pub corpus: String,
    pub trial_method: String,
}

impl Block {
    pub fn new(block_number: u32) -> Self {
        Self {
            block_number,
            corpus: "randomCorpusId".to_string(),
            trial_method: "trialMethod".to_string(),
        }
    }
}

/// Engine-side mirror of a student. Task/variant references are filled in
/// when the student is swept into an administration; runs nest underneath.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineUser {
    pub id: String,
    pub birth_month: u32,
    pub birth_year: i32,
    pub class_id: String,
    pub district_id: String,
    pub firebase_uid: String,
    pub school_id: String,
    pub study_id: String,
    pub studies: Vec<String>,
    pub tasks: Vec<String>,
    pub task_refs: Vec<String>,
    pub variants: Vec<String>,
    pub variant_refs: Vec<String>,
    #[serde(rename = "__collections__")]
    pub collections: EngineUserCollections,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineUserCollections {
    pub runs: BTreeMap<String, Run>,
}

impl EngineUser {
    /// Creates the mirror record for a student, sharing the roster DOB.
    pub fn new(id: &str, dob: NaiveDate, class_id: &str, school_id: &str, district_id: &str) -> Self {
        Self {
            id: id.to_string(),
            birth_month: dob.month(),
            birth_year: dob.year(),
            class_id: class_id.to_string(),
            district_id: district_id.to_string(),
            firebase_uid: String::new(),
            school_id: school_id.to_string(),
            study_id: String::new(),
            studies: Vec::new(),
            tasks: Vec::new(),
            task_refs: Vec::new(),
            variants: Vec::new(),
            variant_refs: Vec::new(),
            collections: EngineUserCollections::default(),
        }
    }
}

/// One attempt instance of a task/variant inside an administration,
/// owned by an engine user. Trials nest underneath as placeholders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub task_id: String,
    pub variant_id: String,
    pub completed: bool,
    pub class_id: String,
    pub district_id: String,
    pub school_id: String,
    pub study_id: String,
    #[serde(rename = "__collections__")]
    pub collections: RunCollections,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunCollections {
    pub trials: BTreeMap<String, Trial>,
}

/// Placeholder for the smallest unit of measurement within a run.
#[derive(Debug, Clone, Serialize)]
pub struct Trial {
    pub id: String,
}
