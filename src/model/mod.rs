//! Typed entity model for the generated fixture graph.
//!
//! Entities are plain serde structs; nested sub-collections are typed
//! fields that serialize under the reserved `__collections__` key, so the
//! sentinel string never appears outside the serialization boundary.

pub mod engine;
pub mod roster;
pub mod timestamp;

pub use engine::{Block, EngineUser, Run, RunCollections, Task, Trial, Variant};
pub use roster::{
    AdminData, AdminLevel, Administration, AdministrationProgress, AssessmentRecord, CaregiverData,
    Class, District, EducatorData, School, StudentData, TaskAssignment, User, UserPayload, UserRef,
    UserType,
};
pub use timestamp::Timestamp;
