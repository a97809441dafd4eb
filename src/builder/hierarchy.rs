//! Stages 1–6 of the pipeline: the district hierarchy and its people.
//!
//! Each stage only reads entities produced by earlier stages and threads
//! parent ids down explicitly, which is what makes dangling references
//! unrepresentable in the happy path.

use std::collections::BTreeMap;

use tracing::info;

use crate::builder::context::BuildContext;
use crate::error::BuilderError;
use crate::model::{
    AdminData, CaregiverData, Class, District, EducatorData, EngineUser, School, StudentData,
    User, UserPayload, UserRef,
};
use crate::sampler;

/// How many other schools an educator or student may have attended.
const PREVIOUS_SCHOOL_SAMPLE: (usize, usize) = (0, 3);

/// How many retired classes a student carries from the school pool.
const PREVIOUS_CLASS_SAMPLE: (usize, usize) = (1, 3);

/// Stage 1: districts, each owning a fresh batch of school ids.
pub fn generate_districts(ctx: &mut BuildContext) {
    for _ in 0..ctx.config.num_districts {
        let district_id = ctx.provider.doc_id();
        let school_count = ctx.provider.count_between(ctx.config.schools_per_district);
        let school_ids = ctx.provider.doc_ids(school_count);
        let district = District::generate(&mut ctx.provider, school_ids);
        ctx.districts.insert(district_id, district);
    }
    info!(districts = ctx.districts.len(), "generated districts");
}

/// Stage 2: one school per id the districts reserved.
pub fn generate_schools(ctx: &mut BuildContext) {
    let assignments: Vec<(String, Vec<String>)> = ctx
        .districts
        .iter()
        .map(|(id, district)| (id.clone(), district.schools.clone()))
        .collect();

    for (district_id, school_ids) in assignments {
        for school_id in school_ids {
            let school = School::generate(&mut ctx.provider, district_id.clone());
            ctx.schools.insert(school_id, school);
        }
    }
    info!(schools = ctx.schools.len(), "generated schools");
}

/// Stage 3: educators and classes per school, plus each school's pool of
/// retired classes for student history.
pub fn generate_staff_and_classes(ctx: &mut BuildContext) {
    let schools: Vec<(String, String)> = ctx
        .schools
        .iter()
        .map(|(id, school)| (id.clone(), school.district_id.clone()))
        .collect();

    for (school_id, district_id) in schools {
        let educator_count = ctx.provider.count_between(ctx.config.educators_per_school);
        let mut educator_ids = Vec::with_capacity(educator_count);
        for _ in 0..educator_count {
            let candidate_count = ctx.provider.count_between(PREVIOUS_SCHOOL_SAMPLE);
            let previous_schools =
                sampler::sample_distinct(ctx.provider.rng_mut(), &ctx.schools, candidate_count);
            let data = EducatorData::from_candidates(
                &mut ctx.provider,
                &school_id,
                &district_id,
                &previous_schools,
            );
            let educator_id = ctx.provider.doc_id();
            let dob = ctx.provider.date_of_birth();
            let user = User::generate(&mut ctx.provider, dob, UserPayload::EducatorData(data));
            ctx.users.insert(educator_id.clone(), user);
            educator_ids.push(educator_id);
        }
        ctx.educators_by_school
            .insert(school_id.clone(), educator_ids);

        let class_count = ctx.provider.count_between(ctx.config.classes_per_school);
        let mut class_ids = Vec::with_capacity(class_count);
        for _ in 0..class_count {
            let class_id = ctx.provider.doc_id();
            let class = Class::generate(&mut ctx.provider, school_id.clone());
            ctx.classes.insert(class_id.clone(), class);
            class_ids.push(class_id);
        }
        ctx.classes_by_school.insert(school_id.clone(), class_ids);

        // This school's own retired-classes pool; threaded to its students
        // in stage 4, never to another school's.
        let mut finished = BTreeMap::new();
        for _ in 0..ctx.config.finished_classes_per_school {
            let retired_id = ctx.provider.doc_id();
            let retired = Class::generate(&mut ctx.provider, school_id.clone());
            finished.insert(retired_id, retired);
        }
        ctx.finished_classes.insert(school_id, finished);
    }
    info!(
        educators = ctx.educators_by_school.values().map(Vec::len).sum::<usize>(),
        classes = ctx.classes.len(),
        "generated educators and classes"
    );
}

/// Stage 4: students per class, with the engine-side mirror record.
pub fn generate_students(ctx: &mut BuildContext) -> Result<(), BuilderError> {
    let classes: Vec<(String, String, u8)> = ctx
        .classes
        .iter()
        .map(|(id, class)| (id.clone(), class.school_id.clone(), class.grade))
        .collect();

    for (class_id, school_id, grade) in classes {
        let district_id = ctx
            .schools
            .get(&school_id)
            .ok_or_else(|| BuilderError::dangling("classes", "schoolId", &school_id))?
            .district_id
            .clone();

        let student_count = ctx.provider.count_between(ctx.config.students_per_class);
        let mut student_ids = Vec::with_capacity(student_count);
        for _ in 0..student_count {
            let school_candidates = ctx.provider.count_between(PREVIOUS_SCHOOL_SAMPLE);
            let previous_schools =
                sampler::sample_distinct(ctx.provider.rng_mut(), &ctx.schools, school_candidates);

            let class_candidates = ctx.provider.count_between(PREVIOUS_CLASS_SAMPLE);
            let previous_classes = match ctx.finished_classes.get(&school_id) {
                Some(pool) => {
                    sampler::sample_distinct(ctx.provider.rng_mut(), pool, class_candidates)
                }
                None => Vec::new(),
            };

            let data = StudentData::from_candidates(
                &mut ctx.provider,
                &school_id,
                &class_id,
                grade,
                &district_id,
                &previous_schools,
                &previous_classes,
            );

            let student_id = ctx.provider.doc_id();
            let dob = ctx.provider.date_of_birth();
            let user = User::generate(&mut ctx.provider, dob, UserPayload::StudentData(data));
            ctx.users.insert(student_id.clone(), user);
            ctx.engine_users.insert(
                student_id.clone(),
                EngineUser::new(&student_id, dob, &class_id, &school_id, &district_id),
            );
            student_ids.push(student_id);
        }
        ctx.students_by_class.insert(class_id, student_ids);
    }
    info!(students = ctx.engine_users.len(), "generated students");
    Ok(())
}

/// Stage 5: one caregiver per student.
pub fn generate_caregivers(ctx: &mut BuildContext) {
    let student_ids = ctx.student_ids();
    for student_id in student_ids {
        let caregiver_id = ctx.provider.alphanumeric(16);
        let data = CaregiverData::new(vec![student_id]);
        let dob = ctx.provider.date_of_birth();
        let user = User::generate(&mut ctx.provider, dob, UserPayload::CaregiverData(data));
        ctx.users.insert(caregiver_id, user);
    }
    info!(
        caregivers = ctx.count_users(crate::model::UserType::Caregiver),
        "generated caregivers"
    );
}

/// Stage 6: administrator accounts per district, holding aggregated
/// references to everything in their district.
pub fn generate_administrators(ctx: &mut BuildContext) {
    let districts: Vec<(String, Vec<String>)> = ctx
        .districts
        .iter()
        .map(|(id, district)| (id.clone(), district.schools.clone()))
        .collect();

    for (district_id, school_ids) in districts {
        let mut district_classes = Vec::new();
        let mut district_users = Vec::new();
        for school_id in &school_ids {
            if let Some(class_ids) = ctx.classes_by_school.get(school_id) {
                district_classes.extend(class_ids.iter().cloned());
            }
            for educator_id in ctx.educators_by_school.get(school_id).into_iter().flatten() {
                district_users.push(UserRef(educator_id.clone()));
            }
            for class_id in ctx.classes_by_school.get(school_id).into_iter().flatten() {
                for student_id in ctx.students_by_class.get(class_id).into_iter().flatten() {
                    district_users.push(UserRef(student_id.clone()));
                }
            }
        }

        for _ in 0..ctx.config.admins_per_district {
            let admin_id = ctx.provider.alphanumeric(16);
            let data = AdminData::generate(
                &mut ctx.provider,
                &district_id,
                school_ids.clone(),
                district_classes.clone(),
                district_users.clone(),
            );
            let dob = ctx.provider.date_of_birth();
            let user = User::generate(&mut ctx.provider, dob, UserPayload::AdminData(data));
            ctx.users.insert(admin_id, user);
        }
    }
    info!(
        admins = ctx.count_users(crate::model::UserType::Admin),
        "generated administrators"
    );
}

/// Finalization: attach each school's classes as its sub-collection.
pub fn attach_class_collections(ctx: &mut BuildContext) -> Result<(), BuilderError> {
    let by_school: Vec<(String, Vec<String>)> = ctx
        .classes_by_school
        .iter()
        .map(|(school_id, class_ids)| (school_id.clone(), class_ids.clone()))
        .collect();

    for (school_id, class_ids) in by_school {
        let mut attached = BTreeMap::new();
        for class_id in class_ids {
            let class = ctx
                .classes
                .get(&class_id)
                .ok_or_else(|| BuilderError::dangling("schools", "classes", &class_id))?
                .clone();
            attached.insert(class_id, class);
        }
        let school = ctx
            .schools
            .get_mut(&school_id)
            .ok_or_else(|| BuilderError::dangling("classes", "schoolId", &school_id))?;
        school.collections.classes = attached;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::catalog;
    use crate::config::GeneratorConfig;
    use crate::model::UserType;

    fn minimal_config() -> GeneratorConfig {
        GeneratorConfig::default()
            .with_num_districts(1)
            .with_schools_per_district((1, 1))
            .with_educators_per_school((1, 1))
            .with_classes_per_school((1, 1))
            .with_students_per_class((1, 1))
            .with_admins_per_district(1)
            .with_seed(42)
    }

    fn run_hierarchy(config: GeneratorConfig) -> BuildContext {
        let mut ctx = BuildContext::new(config);
        catalog::build_task_catalog(&mut ctx);
        generate_districts(&mut ctx);
        generate_schools(&mut ctx);
        generate_staff_and_classes(&mut ctx);
        generate_students(&mut ctx).expect("student stage should succeed");
        generate_caregivers(&mut ctx);
        generate_administrators(&mut ctx);
        attach_class_collections(&mut ctx).expect("attach should succeed");
        ctx
    }

    #[test]
    fn test_minimal_universe_counts() {
        let ctx = run_hierarchy(minimal_config());

        assert_eq!(ctx.districts.len(), 1);
        assert_eq!(ctx.schools.len(), 1);
        assert_eq!(ctx.classes.len(), 1);
        assert_eq!(ctx.count_users(UserType::Student), 1);
        assert_eq!(ctx.count_users(UserType::Educator), 1);
        assert_eq!(ctx.count_users(UserType::Caregiver), 1);
        assert_eq!(ctx.count_users(UserType::Admin), 1);

        let district = ctx.districts.values().next().expect("one district");
        assert_eq!(district.schools.len(), 1);

        let school = ctx.schools.values().next().expect("one school");
        assert_eq!(school.collections.classes.len(), 1);
    }

    #[test]
    fn test_minimal_universe_student_is_consistent() {
        let ctx = run_hierarchy(minimal_config());

        let (district_id, _) = ctx.districts.iter().next().expect("one district");
        let (school_id, _) = ctx.schools.iter().next().expect("one school");
        let (class_id, class) = ctx.classes.iter().next().expect("one class");

        let student = ctx
            .users
            .values()
            .find_map(|user| user.payload.as_student())
            .expect("one student");

        assert_eq!(&student.class_id, class_id);
        assert_eq!(&student.school_id, school_id);
        assert_eq!(&student.district_id, district_id);
        assert_eq!(student.grade, class.grade);
    }

    #[test]
    fn test_minimal_universe_caregiver_references_student() {
        let ctx = run_hierarchy(minimal_config());

        let student_id = ctx.student_ids().pop().expect("one student");
        let caregiver = ctx
            .users
            .values()
            .find_map(|user| user.payload.as_caregiver())
            .expect("one caregiver");
        assert_eq!(caregiver.students, vec![student_id]);
    }

    #[test]
    fn test_students_draw_from_their_own_school_pool() {
        let config = GeneratorConfig::default()
            .with_num_districts(2)
            .with_schools_per_district((2, 2))
            .with_students_per_class((2, 2))
            .with_seed(7);
        let ctx = run_hierarchy(config);

        for user in ctx.users.values() {
            let Some(student) = user.payload.as_student() else {
                continue;
            };
            let pool = ctx
                .finished_classes
                .get(&student.school_id)
                .expect("every school has a pool");
            for previous in &student.previous_class_ids {
                assert!(
                    pool.contains_key(previous),
                    "previous class {} must come from the student's own school pool",
                    previous
                );
            }
        }
    }

    #[test]
    fn test_previous_ids_have_no_duplicates_and_exclude_self() {
        let config = GeneratorConfig::default().with_seed(11);
        let ctx = run_hierarchy(config);

        for user in ctx.users.values() {
            let (prev_schools, prev_districts, school_id) = match &user.payload {
                UserPayload::StudentData(data) => (
                    &data.previous_school_ids,
                    &data.previous_district_ids,
                    &data.school_id,
                ),
                UserPayload::EducatorData(data) => (
                    &data.previous_school_ids,
                    &data.previous_district_ids,
                    &data.school_id,
                ),
                _ => continue,
            };

            let unique: std::collections::HashSet<_> = prev_schools.iter().collect();
            assert_eq!(unique.len(), prev_schools.len());
            assert!(!prev_schools.contains(school_id));

            let unique: std::collections::HashSet<_> = prev_districts.iter().collect();
            assert_eq!(unique.len(), prev_districts.len());
        }
    }

    #[test]
    fn test_class_grades_in_range() {
        let ctx = run_hierarchy(GeneratorConfig::default().with_seed(13));
        for class in ctx.classes.values() {
            assert!(class.grade <= 12);
        }
    }

    #[test]
    fn test_every_class_has_configured_student_count() {
        let config = GeneratorConfig::default()
            .with_students_per_class((2, 2))
            .with_seed(17);
        let ctx = run_hierarchy(config);

        for class_id in ctx.classes.keys() {
            let students = ctx
                .students_by_class
                .get(class_id)
                .expect("every class has a roster");
            assert_eq!(students.len(), 2);
        }
    }

    #[test]
    fn test_admin_references_cover_district() {
        let ctx = run_hierarchy(GeneratorConfig::default().with_seed(19));

        for user in ctx.users.values() {
            let Some(admin) = user.payload.as_admin() else {
                continue;
            };
            let district = ctx
                .districts
                .get(&admin.districts)
                .expect("admin district exists");
            assert_eq!(admin.schools, district.schools);
            for class_id in &admin.classes {
                assert!(ctx.classes.contains_key(class_id));
            }
            for user_ref in &admin.users {
                assert!(ctx.users.contains_key(&user_ref.0));
            }
        }
    }
}
