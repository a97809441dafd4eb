//! Post-build referential-closure verification.
//!
//! A dangling reference here means a stage broke the generation order;
//! the builder aborts instead of emitting invalid fixtures. Historical
//! `previousClassIds` (retired classes) and `studies` ids are external to
//! the roster by design and are not checked.

use crate::builder::context::BuildContext;
use crate::error::BuilderError;
use crate::model::UserPayload;

type Result<T> = std::result::Result<T, BuilderError>;

/// Walks every reference field of the generated graph and verifies it
/// resolves. Returns the first violation found.
pub fn verify_referential_closure(ctx: &BuildContext) -> Result<()> {
    verify_hierarchy(ctx)?;
    verify_users(ctx)?;
    verify_administrations(ctx)?;
    verify_engine(ctx)?;
    Ok(())
}

fn verify_hierarchy(ctx: &BuildContext) -> Result<()> {
    for district in ctx.districts.values() {
        for school_id in &district.schools {
            if !ctx.schools.contains_key(school_id) {
                return Err(BuilderError::dangling("districts", "schools", school_id));
            }
        }
    }

    for (school_id, school) in &ctx.schools {
        if !ctx.districts.contains_key(&school.district_id) {
            return Err(BuilderError::dangling(
                "schools",
                "districtId",
                &school.district_id,
            ));
        }
        for (class_id, class) in &school.collections.classes {
            if !ctx.classes.contains_key(class_id) {
                return Err(BuilderError::dangling("schools", "classes", class_id));
            }
            if &class.school_id != school_id {
                return Err(BuilderError::dangling("classes", "schoolId", &class.school_id));
            }
        }
    }

    for class in ctx.classes.values() {
        if !ctx.schools.contains_key(&class.school_id) {
            return Err(BuilderError::dangling(
                "classes",
                "schoolId",
                &class.school_id,
            ));
        }
    }

    Ok(())
}

fn verify_users(ctx: &BuildContext) -> Result<()> {
    for (user_id, user) in &ctx.users {
        match &user.payload {
            UserPayload::StudentData(data) => {
                let class = ctx
                    .classes
                    .get(&data.class_id)
                    .ok_or_else(|| BuilderError::dangling("users", "classId", &data.class_id))?;
                let school = ctx
                    .schools
                    .get(&data.school_id)
                    .ok_or_else(|| BuilderError::dangling("users", "schoolId", &data.school_id))?;
                if !ctx.districts.contains_key(&data.district_id) {
                    return Err(BuilderError::dangling(
                        "users",
                        "districtId",
                        &data.district_id,
                    ));
                }
                // The triple must be mutually consistent, not just present.
                if class.school_id != data.school_id {
                    return Err(BuilderError::dangling("users", "classId", &data.class_id));
                }
                if school.district_id != data.district_id {
                    return Err(BuilderError::dangling("users", "schoolId", &data.school_id));
                }
                verify_school_history(ctx, &data.previous_school_ids, &data.previous_district_ids)?;
                if !ctx.engine_users.contains_key(user_id) {
                    return Err(BuilderError::dangling("engine_users", "id", user_id));
                }
            }
            UserPayload::EducatorData(data) => {
                if !ctx.schools.contains_key(&data.school_id) {
                    return Err(BuilderError::dangling("users", "schoolId", &data.school_id));
                }
                if !ctx.districts.contains_key(&data.district_id) {
                    return Err(BuilderError::dangling(
                        "users",
                        "districtId",
                        &data.district_id,
                    ));
                }
                verify_school_history(ctx, &data.previous_school_ids, &data.previous_district_ids)?;
            }
            UserPayload::CaregiverData(data) => {
                for student_id in &data.students {
                    let referenced = ctx.users.get(student_id).ok_or_else(|| {
                        BuilderError::dangling("users", "caregiverData.students", student_id)
                    })?;
                    if referenced.payload.as_student().is_none() {
                        return Err(BuilderError::dangling(
                            "users",
                            "caregiverData.students",
                            student_id,
                        ));
                    }
                }
            }
            UserPayload::AdminData(data) => {
                if !ctx.districts.contains_key(&data.districts) {
                    return Err(BuilderError::dangling(
                        "users",
                        "adminData.districts",
                        &data.districts,
                    ));
                }
                for school_id in &data.schools {
                    if !ctx.schools.contains_key(school_id) {
                        return Err(BuilderError::dangling("users", "adminData.schools", school_id));
                    }
                }
                for class_id in &data.classes {
                    if !ctx.classes.contains_key(class_id) {
                        return Err(BuilderError::dangling("users", "adminData.classes", class_id));
                    }
                }
                for user_ref in &data.users {
                    if !ctx.users.contains_key(&user_ref.0) {
                        return Err(BuilderError::dangling("users", "adminData.users", &user_ref.0));
                    }
                }
            }
        }

        for (administration_id, progress) in &user.collections.administrations {
            if !ctx.administrations.contains_key(administration_id) {
                return Err(BuilderError::dangling(
                    "users",
                    "administrations",
                    administration_id,
                ));
            }
            for (task_id, record) in &progress.assessments {
                if !ctx.tasks.contains_key(task_id) {
                    return Err(BuilderError::dangling("users", "assessments", task_id));
                }
                let engine_user = ctx
                    .engine_users
                    .get(user_id)
                    .ok_or_else(|| BuilderError::dangling("engine_users", "id", user_id))?;
                if !engine_user.collections.runs.contains_key(&record.run_id) {
                    return Err(BuilderError::dangling("users", "runId", &record.run_id));
                }
            }
        }
    }

    Ok(())
}

fn verify_administrations(ctx: &BuildContext) -> Result<()> {
    for administration in ctx.administrations.values() {
        for class_id in &administration.classes {
            if !ctx.classes.contains_key(class_id) {
                return Err(BuilderError::dangling("administrations", "classes", class_id));
            }
        }
        for school_id in &administration.schools {
            if !ctx.schools.contains_key(school_id) {
                return Err(BuilderError::dangling("administrations", "schools", school_id));
            }
        }
        for district_id in &administration.districts {
            if !ctx.districts.contains_key(district_id) {
                return Err(BuilderError::dangling(
                    "administrations",
                    "districts",
                    district_id,
                ));
            }
        }
        for user_id in &administration.users {
            if !ctx.users.contains_key(user_id) {
                return Err(BuilderError::dangling("administrations", "users", user_id));
            }
        }
        for (task_id, assignment) in &administration.assessments {
            let task = ctx
                .tasks
                .get(task_id)
                .ok_or_else(|| BuilderError::dangling("administrations", "assessments", task_id))?;
            if !task.collections.variants.contains_key(&assignment.variant) {
                return Err(BuilderError::dangling(
                    "administrations",
                    "assessments.variant",
                    &assignment.variant,
                ));
            }
        }
    }
    Ok(())
}

fn verify_engine(ctx: &BuildContext) -> Result<()> {
    for engine_user in ctx.engine_users.values() {
        if !ctx.classes.contains_key(&engine_user.class_id) {
            return Err(BuilderError::dangling(
                "engine_users",
                "classId",
                &engine_user.class_id,
            ));
        }
        if !ctx.schools.contains_key(&engine_user.school_id) {
            return Err(BuilderError::dangling(
                "engine_users",
                "schoolId",
                &engine_user.school_id,
            ));
        }
        if !ctx.districts.contains_key(&engine_user.district_id) {
            return Err(BuilderError::dangling(
                "engine_users",
                "districtId",
                &engine_user.district_id,
            ));
        }
        for run in engine_user.collections.runs.values() {
            let task = ctx
                .tasks
                .get(&run.task_id)
                .ok_or_else(|| BuilderError::dangling("engine_users", "runs.taskId", &run.task_id))?;
            if !task.collections.variants.contains_key(&run.variant_id) {
                return Err(BuilderError::dangling(
                    "engine_users",
                    "runs.variantId",
                    &run.variant_id,
                ));
            }
        }
    }
    Ok(())
}

/// Previous school/district ids are sampled from live pools, so closure
/// applies to them too.
fn verify_school_history(
    ctx: &BuildContext,
    previous_school_ids: &[String],
    previous_district_ids: &[String],
) -> Result<()> {
    for school_id in previous_school_ids {
        if !ctx.schools.contains_key(school_id) {
            return Err(BuilderError::dangling("users", "previousSchoolIds", school_id));
        }
    }
    for district_id in previous_district_ids {
        if !ctx.districts.contains_key(district_id) {
            return Err(BuilderError::dangling(
                "users",
                "previousDistrictIds",
                district_id,
            ));
        }
    }
    Ok(())
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
    fn test_generated_graph_is_closed() {
        let ctx = built_context();
        assert!(verify_referential_closure(&ctx).is_ok());
    }

    #[test]
    fn test_detects_dangling_district_school() {
        let mut ctx = built_context();
        let district = ctx.districts.values_mut().next().expect("a district");
        district.schools.push("no-such-school".to_string());

        let err = verify_referential_closure(&ctx).expect_err("must detect");
        assert!(err.to_string().contains("no-such-school"));
    }

    #[test]
    fn test_detects_dangling_student_class() {
        let mut ctx = built_context();
        let student = ctx
            .users
            .values_mut()
            .find_map(|user| match &mut user.payload {
                UserPayload::StudentData(data) => Some(data),
                _ => None,
            })
            .expect("a student");
        student.class_id = "no-such-class".to_string();

        let err = verify_referential_closure(&ctx).expect_err("must detect");
        assert!(err.to_string().contains("no-such-class"));
    }

    #[test]
    fn test_detects_dangling_administration_user() {
        let mut ctx = built_context();
        let administration = ctx
            .administrations
            .values_mut()
            .next()
            .expect("an administration");
        administration.users.push("no-such-user".to_string());

        let err = verify_referential_closure(&ctx).expect_err("must detect");
        assert!(err.to_string().contains("no-such-user"));
    }

    #[test]
    fn test_detects_dangling_run_variant() {
        let mut ctx = built_context();
        let run = ctx
            .engine_users
            .values_mut()
            .next()
            .expect("an engine user")
            .collections
            .runs
            .values_mut()
            .next()
            .expect("a run");
        run.variant_id = "no-such-variant".to_string();

        let err = verify_referential_closure(&ctx).expect_err("must detect");
        assert!(err.to_string().contains("no-such-variant"));
    }
}
