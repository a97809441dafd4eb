//! The synthetic dataset builder: a single-pass, dependency-ordered
//! generation pipeline.
//!
//! Stages run in strict topological order (catalog, districts, schools,
//! staff and classes, students, caregivers, administrators,
//! administrations), each consuming only entities produced by earlier
//! stages. A final integrity walk fails the build on any dangling
//! reference rather than handing invalid fixtures to the sink.
//!
//! # Example
//!
//! ```ignore
//! use fixture_forge::{GeneratorConfig, SyntheticDatasetBuilder};
//!
//! let config = GeneratorConfig::default().with_seed(42);
//! let ctx = SyntheticDatasetBuilder::new(config)?.build()?;
//! assert!(!ctx.districts.is_empty());
//! ```

pub mod administration;
pub mod catalog;
pub mod context;
pub mod hierarchy;
pub mod integrity;

pub use context::BuildContext;

use crate::config::GeneratorConfig;
use crate::error::BuilderError;
use crate::model::UserType;

/// Result type alias for builder operations.
pub type Result<T> = std::result::Result<T, BuilderError>;

/// High-level facade over the generation stages.
pub struct SyntheticDatasetBuilder {
    config: GeneratorConfig,
}

impl SyntheticDatasetBuilder {
    /// Creates a builder after validating the configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate().map_err(BuilderError::from)?;
        Ok(Self { config })
    }

    /// Runs the whole pipeline and returns the finished graph.
    ///
    /// Any failure discards the in-progress graph; there is no partial
    /// output.
    pub fn build(&self) -> Result<BuildContext> {
        let mut ctx = BuildContext::new(self.config.clone());

        catalog::build_task_catalog(&mut ctx);
        hierarchy::generate_districts(&mut ctx);
        hierarchy::generate_schools(&mut ctx);
        hierarchy::generate_staff_and_classes(&mut ctx);
        hierarchy::generate_students(&mut ctx)?;
        hierarchy::generate_caregivers(&mut ctx);
        hierarchy::generate_administrators(&mut ctx);
        administration::assemble_administrations(&mut ctx)?;
        hierarchy::attach_class_collections(&mut ctx)?;

        integrity::verify_referential_closure(&ctx)?;

        tracing::info!(
            districts = ctx.districts.len(),
            schools = ctx.schools.len(),
            classes = ctx.classes.len(),
            users = ctx.users.len(),
            administrations = ctx.administrations.len(),
            "fixture graph complete"
        );
        Ok(ctx)
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}
