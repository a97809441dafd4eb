//! Generation configuration.
//!
//! Provides the knobs for the fixture universe: how many districts to
//! create, the per-parent fan-out ranges for schools, staff, classes and
//! students, administration grouping, and the optional seed that makes a
//! build reproducible.

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// An inclusive `(min, max)` fan-out range.
pub type CountRange = (usize, usize);

/// Configuration for the synthetic dataset builder.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    // Hierarchy fan-out
    /// Number of districts at the top of the hierarchy.
    pub num_districts: usize,
    /// Schools created per district.
    pub schools_per_district: CountRange,
    /// Educators created per school.
    pub educators_per_school: CountRange,
    /// Classes created per school.
    pub classes_per_school: CountRange,
    /// Students created per class.
    pub students_per_class: CountRange,
    /// Administrator accounts created per district.
    pub admins_per_district: usize,
    /// Size of each school's retired-classes pool that students may
    /// reference as `previousClassIds`.
    pub finished_classes_per_school: usize,

    // Administration grouping
    /// Target class-group size for administrations. One size is drawn per
    /// build and shared by every group; the last group may be shorter.
    pub class_group_size: CountRange,

    // Assessment-engine catalog
    /// Variants generated per catalog task.
    pub variants_per_task: CountRange,
    /// Blocks generated per variant.
    pub blocks_per_variant: CountRange,
    /// Trial placeholders attached to each run.
    pub trials_per_run: usize,

    /// Random seed. `None` seeds from entropy; tests pin this for
    /// reproducible fixtures.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_districts: 3,
            schools_per_district: (3, 3),
            educators_per_school: (2, 2),
            classes_per_school: (2, 2),
            students_per_class: (1, 1),
            admins_per_district: 4,
            finished_classes_per_school: 4,
            class_group_size: (5, 10),
            variants_per_task: (1, 3),
            blocks_per_variant: (1, 3),
            trials_per_run: 4,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FORGE_NUM_DISTRICTS`: number of districts (default: 3)
    /// - `FORGE_SCHOOLS_PER_DISTRICT`: `min,max` or single count (default: 3)
    /// - `FORGE_EDUCATORS_PER_SCHOOL`: `min,max` or single count (default: 2)
    /// - `FORGE_CLASSES_PER_SCHOOL`: `min,max` or single count (default: 2)
    /// - `FORGE_STUDENTS_PER_CLASS`: `min,max` or single count (default: 1)
    /// - `FORGE_ADMINS_PER_DISTRICT`: admins per district (default: 4)
    /// - `FORGE_CLASS_GROUP_SIZE`: `min,max` administration group size (default: 5,10)
    /// - `FORGE_SEED`: seed for reproducible builds (default: entropy)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value or the
    /// resulting configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FORGE_NUM_DISTRICTS") {
            config.num_districts = parse_env_value(&val, "FORGE_NUM_DISTRICTS")?;
        }

        if let Ok(val) = std::env::var("FORGE_SCHOOLS_PER_DISTRICT") {
            config.schools_per_district = parse_env_range(&val, "FORGE_SCHOOLS_PER_DISTRICT")?;
        }

        if let Ok(val) = std::env::var("FORGE_EDUCATORS_PER_SCHOOL") {
            config.educators_per_school = parse_env_range(&val, "FORGE_EDUCATORS_PER_SCHOOL")?;
        }

        if let Ok(val) = std::env::var("FORGE_CLASSES_PER_SCHOOL") {
            config.classes_per_school = parse_env_range(&val, "FORGE_CLASSES_PER_SCHOOL")?;
        }

        if let Ok(val) = std::env::var("FORGE_STUDENTS_PER_CLASS") {
            config.students_per_class = parse_env_range(&val, "FORGE_STUDENTS_PER_CLASS")?;
        }

        if let Ok(val) = std::env::var("FORGE_ADMINS_PER_DISTRICT") {
            config.admins_per_district = parse_env_value(&val, "FORGE_ADMINS_PER_DISTRICT")?;
        }

        if let Ok(val) = std::env::var("FORGE_CLASS_GROUP_SIZE") {
            config.class_group_size = parse_env_range(&val, "FORGE_CLASS_GROUP_SIZE")?;
        }

        if let Ok(val) = std::env::var("FORGE_SEED") {
            config.seed = Some(parse_env_value(&val, "FORGE_SEED")?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_districts == 0 {
            return Err(ConfigError::ValidationFailed(
                "num_districts must be greater than 0".to_string(),
            ));
        }

        for (name, range) in [
            ("schools_per_district", self.schools_per_district),
            ("educators_per_school", self.educators_per_school),
            ("classes_per_school", self.classes_per_school),
            ("students_per_class", self.students_per_class),
            ("class_group_size", self.class_group_size),
            ("variants_per_task", self.variants_per_task),
            ("blocks_per_variant", self.blocks_per_variant),
        ] {
            if range.0 > range.1 {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} min ({}) must be <= max ({})",
                    name, range.0, range.1
                )));
            }
        }

        if self.schools_per_district.0 == 0 {
            return Err(ConfigError::ValidationFailed(
                "schools_per_district min must be greater than 0".to_string(),
            ));
        }

        if self.classes_per_school.0 == 0 {
            return Err(ConfigError::ValidationFailed(
                "classes_per_school min must be greater than 0".to_string(),
            ));
        }

        if self.class_group_size.0 == 0 {
            return Err(ConfigError::ValidationFailed(
                "class_group_size min must be greater than 0".to_string(),
            ));
        }

        if self.variants_per_task.0 == 0 {
            return Err(ConfigError::ValidationFailed(
                "variants_per_task min must be greater than 0 (administrations pick one per task)"
                    .to_string(),
            ));
        }

        if self.blocks_per_variant.0 == 0 {
            return Err(ConfigError::ValidationFailed(
                "blocks_per_variant min must be greater than 0".to_string(),
            ));
        }

        if self.trials_per_run == 0 {
            return Err(ConfigError::ValidationFailed(
                "trials_per_run must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder method to set the number of districts.
    pub fn with_num_districts(mut self, count: usize) -> Self {
        self.num_districts = count;
        self
    }

    /// Builder method to set the schools-per-district range.
    pub fn with_schools_per_district(mut self, range: CountRange) -> Self {
        self.schools_per_district = range;
        self
    }

    /// Builder method to set the educators-per-school range.
    pub fn with_educators_per_school(mut self, range: CountRange) -> Self {
        self.educators_per_school = range;
        self
    }

    /// Builder method to set the classes-per-school range.
    pub fn with_classes_per_school(mut self, range: CountRange) -> Self {
        self.classes_per_school = range;
        self
    }

    /// Builder method to set the students-per-class range.
    pub fn with_students_per_class(mut self, range: CountRange) -> Self {
        self.students_per_class = range;
        self
    }

    /// Builder method to set the number of admins per district.
    pub fn with_admins_per_district(mut self, count: usize) -> Self {
        self.admins_per_district = count;
        self
    }

    /// Builder method to set the administration class-group size range.
    pub fn with_class_group_size(mut self, range: CountRange) -> Self {
        self.class_group_size = range;
        self
    }

    /// Builder method to set the variants-per-task range.
    pub fn with_variants_per_task(mut self, range: CountRange) -> Self {
        self.variants_per_task = range;
        self
    }

    /// Builder method to set the blocks-per-variant range.
    pub fn with_blocks_per_variant(mut self, range: CountRange) -> Self {
        self.blocks_per_variant = range;
        self
    }

    /// Builder method to set the number of trial placeholders per run.
    pub fn with_trials_per_run(mut self, count: usize) -> Self {
        self.trials_per_run = count;
        self
    }

    /// Builder method to set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

/// Parse an environment variable as a `min,max` range; a single number is
/// treated as a degenerate `(n, n)` range.
fn parse_env_range(value: &str, key: &str) -> Result<CountRange, ConfigError> {
    match value.split_once(',') {
        Some((min, max)) => {
            let min = parse_env_value(min.trim(), key)?;
            let max = parse_env_value(max.trim(), key)?;
            Ok((min, max))
        }
        None => {
            let n = parse_env_value(value.trim(), key)?;
            Ok((n, n))
        }
    }
}
