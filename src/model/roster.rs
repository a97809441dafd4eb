//! Roster-side entities: the district hierarchy, users and their typed
//! payloads, and administration records.
//!
//! Field names and shapes match the seeded document store; construction
//! goes through `generate`/`from_candidates` factories that only accept
//! ids of entities that already exist, which is what keeps the graph
//! referentially closed by construction.

use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::model::timestamp::Timestamp;
use crate::provider::FakeDataProvider;

/// Length of non-document keys (administration ids, caregiver/admin user
/// ids, assessment pids, permissions).
const KEY_LEN: usize = 16;

// ============================================================================
// District / School / Class
// ============================================================================

/// Top of the hierarchy. Owns its schools by id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub district_name: String,
    pub schools: Vec<String>,
}

impl District {
    /// Creates a district owning the given school ids.
    pub fn generate(provider: &mut FakeDataProvider, schools: Vec<String>) -> Self {
        Self {
            district_name: provider.prefixed("District-", 4),
            schools,
        }
    }
}

/// A school inside a district. Its classes are attached as a
/// sub-collection once student generation has finished.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub school_name: String,
    pub district_id: String,
    #[serde(rename = "__collections__")]
    pub collections: SchoolCollections,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SchoolCollections {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub classes: BTreeMap<String, Class>,
}

impl School {
    pub fn generate(provider: &mut FakeDataProvider, district_id: String) -> Self {
        Self {
            school_name: provider.prefixed("School-", 4),
            district_id,
            collections: SchoolCollections::default(),
        }
    }
}

/// A class taught at one school.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub school_id: String,
    pub grade: u8,
}

impl Class {
    pub fn generate(provider: &mut FakeDataProvider, school_id: String) -> Self {
        Self {
            school_id,
            grade: provider.grade(),
        }
    }
}

// ============================================================================
// User payloads
// ============================================================================

/// Discriminant for the payload carried by a [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Student,
    Educator,
    Caregiver,
    Admin,
}

/// Exactly one payload per user, selected by its type. Serializes
/// externally tagged, so a student user carries a `studentData` field and
/// nothing else.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UserPayload {
    StudentData(StudentData),
    EducatorData(EducatorData),
    CaregiverData(CaregiverData),
    AdminData(AdminData),
}

impl UserPayload {
    /// The user type this payload implies.
    pub fn user_type(&self) -> UserType {
        match self {
            UserPayload::StudentData(_) => UserType::Student,
            UserPayload::EducatorData(_) => UserType::Educator,
            UserPayload::CaregiverData(_) => UserType::Caregiver,
            UserPayload::AdminData(_) => UserType::Admin,
        }
    }

    pub fn as_student(&self) -> Option<&StudentData> {
        match self {
            UserPayload::StudentData(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_educator(&self) -> Option<&EducatorData> {
        match self {
            UserPayload::EducatorData(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_caregiver(&self) -> Option<&CaregiverData> {
        match self {
            UserPayload::CaregiverData(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_admin(&self) -> Option<&AdminData> {
        match self {
            UserPayload::AdminData(data) => Some(data),
            _ => None,
        }
    }
}

/// Student payload. The class/school/district triple is mutually
/// consistent by construction; `previous*Ids` are deduplicated and never
/// contain the current ids.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentData {
    pub ell: bool,
    pub grade: u8,
    pub class_id: String,
    pub previous_class_ids: Vec<String>,
    pub school_id: String,
    pub previous_school_ids: Vec<String>,
    pub district_id: String,
    pub previous_district_ids: Vec<String>,
    pub studies: Vec<String>,
    pub previous_studies: Vec<String>,
}

impl StudentData {
    /// Builds a student payload from pre-sampled candidate pools.
    ///
    /// `previous_schools` and `previous_classes` may be empty; the
    /// resulting id lists are then empty, which is valid history.
    #[allow(clippy::too_many_arguments)]
    pub fn from_candidates(
        provider: &mut FakeDataProvider,
        school_id: &str,
        class_id: &str,
        grade: u8,
        district_id: &str,
        previous_schools: &[(String, School)],
        previous_classes: &[(String, Class)],
    ) -> Self {
        let (previous_school_ids, previous_district_ids) =
            previous_school_refs(previous_schools, school_id, district_id);

        let previous_class_ids: BTreeSet<String> = previous_classes
            .iter()
            .filter(|(id, _)| id != class_id)
            .map(|(id, _)| id.clone())
            .collect();

        let studies_count = provider.count_between((0, 6));
        let previous_studies_count = provider.count_between((1, 6));

        Self {
            ell: provider.flag(),
            grade,
            class_id: class_id.to_string(),
            previous_class_ids: previous_class_ids.into_iter().collect(),
            school_id: school_id.to_string(),
            previous_school_ids,
            district_id: district_id.to_string(),
            previous_district_ids,
            studies: provider.doc_ids(studies_count),
            previous_studies: provider.doc_ids(previous_studies_count),
        }
    }
}

/// Educator payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducatorData {
    pub previous_class_ids: Vec<String>,
    pub school_id: String,
    pub previous_school_ids: Vec<String>,
    pub district_id: String,
    pub previous_district_ids: Vec<String>,
    pub studies: Vec<String>,
    pub previous_studies: Vec<String>,
}

impl EducatorData {
    /// Builds an educator payload from a pre-sampled previous-schools pool.
    pub fn from_candidates(
        provider: &mut FakeDataProvider,
        school_id: &str,
        district_id: &str,
        previous_schools: &[(String, School)],
    ) -> Self {
        let (previous_school_ids, previous_district_ids) =
            previous_school_refs(previous_schools, school_id, district_id);

        let previous_class_count = provider.count_between((2, 6));
        let studies_count = provider.count_between((0, 4));
        let previous_studies_count = provider.count_between((2, 6));

        Self {
            previous_class_ids: provider.doc_ids(previous_class_count),
            school_id: school_id.to_string(),
            previous_school_ids,
            district_id: district_id.to_string(),
            previous_district_ids,
            studies: provider.doc_ids(studies_count),
            previous_studies: provider.doc_ids(previous_studies_count),
        }
    }
}

/// Derives deduplicated previous school/district id lists from sampled
/// `(id, school)` candidates, dropping the entity's own current ids.
fn previous_school_refs(
    candidates: &[(String, School)],
    current_school_id: &str,
    current_district_id: &str,
) -> (Vec<String>, Vec<String>) {
    let mut school_ids = BTreeSet::new();
    let mut district_ids = BTreeSet::new();

    for (id, school) in candidates {
        if id == current_school_id {
            continue;
        }
        school_ids.insert(id.clone());
        if school.district_id != current_district_id {
            district_ids.insert(school.district_id.clone());
        }
    }

    (
        school_ids.into_iter().collect(),
        district_ids.into_iter().collect(),
    )
}

/// Caregiver payload: the students under this caregiver's care.
#[derive(Debug, Clone, Serialize)]
pub struct CaregiverData {
    pub students: Vec<String>,
}

impl CaregiverData {
    pub fn new(students: Vec<String>) -> Self {
        Self { students }
    }
}

/// Scope level of an administrator account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    Classes,
    Schools,
    Districts,
    Studies,
}

impl AdminLevel {
    pub const ALL: [AdminLevel; 4] = [
        AdminLevel::Classes,
        AdminLevel::Schools,
        AdminLevel::Districts,
        AdminLevel::Studies,
    ];
}

/// A `{<userId>: true}` reference object, the wire shape administrator
/// documents use for their user lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef(pub String);

impl Serialize for UserRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.0, &true)?;
        map.end()
    }
}

/// Administrator payload: aggregated references over one district.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminData {
    pub administrations_created: Vec<String>,
    pub permissions: Vec<String>,
    pub classes: Vec<String>,
    pub studies: Vec<String>,
    pub districts: String,
    pub schools: Vec<String>,
    pub admin_level: AdminLevel,
    pub users: Vec<UserRef>,
}

impl AdminData {
    /// Builds an administrator payload scoped to one district.
    pub fn generate(
        provider: &mut FakeDataProvider,
        district_id: &str,
        schools: Vec<String>,
        classes: Vec<String>,
        users: Vec<UserRef>,
    ) -> Self {
        let permission_count = provider.count_between((1, 4));
        let studies_count = provider.count_between((10, 20));
        let admin_level = *provider
            .pick(&AdminLevel::ALL)
            .expect("ALL is a non-empty constant");

        Self {
            administrations_created: Vec::new(),
            permissions: (0..permission_count)
                .map(|_| provider.alphanumeric(KEY_LEN))
                .collect(),
            classes,
            studies: provider.doc_ids(studies_count),
            districts: district_id.to_string(),
            schools,
            admin_level,
            users,
        }
    }
}

// ============================================================================
// User
// ============================================================================

/// External rostering placeholder attached to every user.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalData {
    pub clever: Vec<String>,
}

impl Default for ExternalData {
    fn default() -> Self {
        Self {
            clever: vec!["data1".to_string(), "data2".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCollections {
    pub external_data: ExternalData,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub administrations: BTreeMap<String, AdministrationProgress>,
}

impl Default for UserCollections {
    fn default() -> Self {
        Self {
            external_data: ExternalData::default(),
            administrations: BTreeMap::new(),
        }
    }
}

/// A platform user of any type. Exactly one payload variant is populated,
/// and `user_type` always matches it: `generate` derives the former from
/// the latter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_type: UserType,
    pub first_name: String,
    pub last_name: String,
    pub assessment_pid: String,
    pub dob: Timestamp,
    pub assessments_completed: Option<BTreeMap<String, Timestamp>>,
    pub assessments_assigned: Option<BTreeMap<String, Timestamp>>,
    pub administrations_assigned: Option<BTreeMap<String, Timestamp>>,
    pub administrations_started: Option<BTreeMap<String, Timestamp>>,
    pub administrations_completed: Option<BTreeMap<String, Timestamp>>,
    #[serde(flatten)]
    pub payload: UserPayload,
    #[serde(rename = "__collections__")]
    pub collections: UserCollections,
}

impl User {
    /// Creates a user record around a payload. The date of birth is
    /// caller-supplied so mirrored records can share it.
    pub fn generate(
        provider: &mut FakeDataProvider,
        dob: chrono::NaiveDate,
        payload: UserPayload,
    ) -> Self {
        Self {
            user_type: payload.user_type(),
            first_name: provider.first_name(),
            last_name: provider.last_name(),
            assessment_pid: provider.alphanumeric(KEY_LEN),
            dob: Timestamp::from(dob),
            assessments_completed: None,
            assessments_assigned: None,
            administrations_assigned: None,
            administrations_started: None,
            administrations_completed: None,
            payload,
            collections: UserCollections::default(),
        }
    }

    /// Marks the user as assigned to (and started on) an administration.
    pub fn record_administration(&mut self, administration_id: &str, opened: Timestamp) {
        self.administrations_assigned
            .get_or_insert_with(BTreeMap::new)
            .insert(administration_id.to_string(), opened);
        self.administrations_started
            .get_or_insert_with(BTreeMap::new)
            .insert(administration_id.to_string(), opened);
    }
}

// ============================================================================
// Administrations
// ============================================================================

/// One assessment attempt summary, embedded both in per-user progress and
/// mirrored by an engine-side run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub run_id: String,
    pub task_id: String,
    pub completed_on: Option<Timestamp>,
    pub started_on: Timestamp,
    pub reward_shown: bool,
}

impl AssessmentRecord {
    /// A finished attempt. Callers must supply `completed_on` strictly
    /// after `started_on` (the provider's `date_time_between` guarantees
    /// this).
    pub fn finished(
        task_id: &str,
        run_id: String,
        started_on: Timestamp,
        completed_on: Timestamp,
    ) -> Self {
        Self {
            run_id,
            task_id: task_id.to_string(),
            completed_on: Some(completed_on),
            started_on,
            reward_shown: true,
        }
    }

    /// An attempt that was started but never completed.
    pub fn unfinished(task_id: &str, run_id: String, started_on: Timestamp) -> Self {
        Self {
            run_id,
            task_id: task_id.to_string(),
            completed_on: None,
            started_on,
            reward_shown: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.completed_on.is_some()
    }
}

/// Per-user progress for one administration: a map of task id to attempt
/// summary plus an overall completion flag.
#[derive(Debug, Clone, Serialize)]
pub struct AdministrationProgress {
    pub completed: bool,
    pub assessments: BTreeMap<String, AssessmentRecord>,
}

/// The `{taskId, variant}` pair an administration assigns for one task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub task_id: String,
    pub variant: String,
}

/// One assessment-delivery event scoped to a group of classes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Administration {
    pub users: Vec<String>,
    pub classes: Vec<String>,
    pub schools: Vec<String>,
    pub districts: Vec<String>,
    pub grades: Vec<u8>,
    pub date_opened: Timestamp,
    pub date_closed: Timestamp,
    pub assessments: BTreeMap<String, TaskAssignment>,
    pub sequential: bool,
}
