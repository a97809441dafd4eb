//! Build context: the single owner of all generated collections.
//!
//! Every stage function takes `&mut BuildContext`, so the whole build is
//! one linear pass over explicitly threaded state with no ambient
//! accumulators.

use std::collections::BTreeMap;

use crate::config::GeneratorConfig;
use crate::model::{
    Administration, Class, District, EngineUser, School, Task, User, UserType,
};
use crate::provider::FakeDataProvider;

/// Owns the in-progress fixture graph plus the provider that feeds it.
///
/// The first block of maps becomes the output documents; the bookkeeping
/// indexes below it exist only to wire references between stages and are
/// never serialized.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub config: GeneratorConfig,
    pub provider: FakeDataProvider,

    // Output collections
    pub districts: BTreeMap<String, District>,
    pub schools: BTreeMap<String, School>,
    pub classes: BTreeMap<String, Class>,
    pub users: BTreeMap<String, User>,
    pub administrations: BTreeMap<String, Administration>,
    pub tasks: BTreeMap<String, Task>,
    pub engine_users: BTreeMap<String, EngineUser>,

    // Bookkeeping indexes
    pub classes_by_school: BTreeMap<String, Vec<String>>,
    pub educators_by_school: BTreeMap<String, Vec<String>>,
    pub students_by_class: BTreeMap<String, Vec<String>>,
    /// Per-school pool of retired classes that this school's students may
    /// carry as `previousClassIds`. Not part of the output roster.
    pub finished_classes: BTreeMap<String, BTreeMap<String, Class>>,
}

impl BuildContext {
    /// Creates an empty context; the provider is seeded from the config.
    pub fn new(config: GeneratorConfig) -> Self {
        let provider = FakeDataProvider::new(config.seed);
        Self {
            config,
            provider,
            districts: BTreeMap::new(),
            schools: BTreeMap::new(),
            classes: BTreeMap::new(),
            users: BTreeMap::new(),
            administrations: BTreeMap::new(),
            tasks: BTreeMap::new(),
            engine_users: BTreeMap::new(),
            classes_by_school: BTreeMap::new(),
            educators_by_school: BTreeMap::new(),
            students_by_class: BTreeMap::new(),
            finished_classes: BTreeMap::new(),
        }
    }

    /// Number of users of the given type.
    pub fn count_users(&self, user_type: UserType) -> usize {
        self.users
            .values()
            .filter(|user| user.user_type == user_type)
            .count()
    }

    /// Ids of all student users, in class iteration order.
    pub fn student_ids(&self) -> Vec<String> {
        self.students_by_class
            .values()
            .flatten()
            .cloned()
            .collect()
    }
}
