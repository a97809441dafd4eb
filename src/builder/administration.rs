//! Stage 7: administrations over class groups, with per-student progress
//! records and engine-side runs.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::IteratorRandom;
use tracing::info;

use crate::builder::catalog::{TASK_IDS, UNFINISHED_TASK_ID};
use crate::builder::context::BuildContext;
use crate::error::BuilderError;
use crate::model::{
    Administration, AdministrationProgress, AssessmentRecord, Run, RunCollections, TaskAssignment,
    Timestamp, Trial,
};
use crate::sampler;

/// Partitions all classes into groups and creates one administration per
/// group, wiring progress records and engine runs for every student swept
/// into it.
pub fn assemble_administrations(ctx: &mut BuildContext) -> Result<(), BuilderError> {
    let BuildContext {
        config,
        provider,
        classes,
        schools,
        users,
        administrations,
        tasks,
        engine_users,
        students_by_class,
        ..
    } = ctx;

    // One size drawn per build, shared by every group.
    let group_size = provider.count_between(config.class_group_size);
    let groups = sampler::random_group(provider.rng_mut(), classes, group_size);
    info!(
        groups = groups.len(),
        group_size, "assembling administrations"
    );

    for group in groups {
        let administration_id = provider.alphanumeric(16);
        let opened_at = provider.date_time();
        let opened = Timestamp::from(opened_at);

        // One variant pick per catalog task.
        let mut assignments: BTreeMap<String, TaskAssignment> = BTreeMap::new();
        for task_id in TASK_IDS {
            let task = tasks
                .get(task_id)
                .ok_or_else(|| BuilderError::EmptyVariantPool(task_id.to_string()))?;
            let variant_id = task
                .collections
                .variants
                .keys()
                .choose(provider.rng_mut())
                .cloned()
                .ok_or_else(|| BuilderError::EmptyVariantPool(task_id.to_string()))?;
            assignments.insert(
                task_id.to_string(),
                TaskAssignment {
                    task_id: task_id.to_string(),
                    variant: variant_id,
                },
            );
        }

        // Attempt templates copied into each student's progress record.
        // One task stays unfinished as a standing fixture asymmetry.
        let mut templates: BTreeMap<String, AssessmentRecord> = BTreeMap::new();
        for task_id in TASK_IDS {
            let run_id = provider.doc_id();
            let record = if task_id == UNFINISHED_TASK_ID {
                AssessmentRecord::unfinished(task_id, run_id, opened)
            } else {
                let completed = Timestamp::from(provider.date_time_between(opened_at));
                AssessmentRecord::finished(task_id, run_id, opened, completed)
            };
            templates.insert(task_id.to_string(), record);
        }

        // Scope of the group: schools, districts and grades its classes
        // touch, plus every enrolled student.
        let mut group_schools = BTreeSet::new();
        let mut group_districts = BTreeSet::new();
        let mut group_grades = BTreeSet::new();
        let mut group_users = Vec::new();
        for class_id in &group {
            let class = classes
                .get(class_id)
                .ok_or_else(|| BuilderError::dangling("administrations", "classes", class_id))?;
            let school = schools.get(&class.school_id).ok_or_else(|| {
                BuilderError::dangling("classes", "schoolId", &class.school_id)
            })?;
            group_schools.insert(class.school_id.clone());
            group_districts.insert(school.district_id.clone());
            group_grades.insert(class.grade);
            if let Some(students) = students_by_class.get(class_id) {
                group_users.extend(students.iter().cloned());
            }
        }

        for student_id in &group_users {
            let mut progress = AdministrationProgress {
                completed: false,
                assessments: templates.clone(),
            };

            let engine_user = engine_users
                .get_mut(student_id)
                .ok_or_else(|| BuilderError::dangling("administrations", "users", student_id))?;

            engine_user.tasks = TASK_IDS.iter().map(|task| task.to_string()).collect();
            engine_user.variants = TASK_IDS
                .iter()
                .map(|task| assignments[*task].variant.clone())
                .collect();
            engine_user.task_refs = TASK_IDS
                .iter()
                .map(|task| format!("/tasks/{}", task))
                .collect();
            engine_user.variant_refs = TASK_IDS
                .iter()
                .map(|task| format!("/tasks/{}/variant/{}", task, assignments[*task].variant))
                .collect();

            for task_id in TASK_IDS {
                let run_id = provider.prefixed("run-", 16);
                let mut trials = BTreeMap::new();
                for _ in 0..config.trials_per_run {
                    let trial_key = provider.doc_id();
                    let trial = Trial {
                        id: provider.alphanumeric(16),
                    };
                    trials.insert(trial_key, trial);
                }

                let template = &templates[task_id];
                let run = Run {
                    id: run_id.clone(),
                    task_id: task_id.to_string(),
                    variant_id: assignments[task_id].variant.clone(),
                    completed: template.is_finished(),
                    class_id: engine_user.class_id.clone(),
                    district_id: engine_user.district_id.clone(),
                    school_id: engine_user.school_id.clone(),
                    study_id: String::new(),
                    collections: RunCollections { trials },
                };
                engine_user.collections.runs.insert(run_id.clone(), run);

                // Point the roster-side record at the engine-side run.
                if let Some(record) = progress.assessments.get_mut(task_id) {
                    record.run_id = run_id;
                }
            }

            let user = users
                .get_mut(student_id)
                .ok_or_else(|| BuilderError::dangling("administrations", "users", student_id))?;
            user.collections
                .administrations
                .insert(administration_id.clone(), progress);
            user.record_administration(&administration_id, opened);
        }

        let closed = Timestamp::from(provider.date_time_between(opened_at));
        let administration = Administration {
            users: group_users,
            classes: group,
            schools: group_schools.into_iter().collect(),
            districts: group_districts.into_iter().collect(),
            grades: group_grades.into_iter().collect(),
            date_opened: opened,
            date_closed: closed,
            assessments: assignments,
            sequential: provider.flag(),
        };
        administrations.insert(administration_id, administration);
    }

    info!(
        administrations = administrations.len(),
        "assembled administrations"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{catalog, hierarchy};
    use crate::config::GeneratorConfig;

    /// Two classes with one student each, grouped into one administration.
    fn two_class_context() -> BuildContext {
        let config = GeneratorConfig::default()
            .with_num_districts(1)
            .with_schools_per_district((1, 1))
            .with_educators_per_school((1, 1))
            .with_classes_per_school((2, 2))
            .with_students_per_class((1, 1))
            .with_class_group_size((2, 2))
            .with_seed(42);

        let mut ctx = BuildContext::new(config);
        catalog::build_task_catalog(&mut ctx);
        hierarchy::generate_districts(&mut ctx);
        hierarchy::generate_schools(&mut ctx);
        hierarchy::generate_staff_and_classes(&mut ctx);
        hierarchy::generate_students(&mut ctx).expect("student stage should succeed");
        assemble_administrations(&mut ctx).expect("assembly should succeed");
        ctx
    }

    #[test]
    fn test_single_group_administration_scope() {
        let ctx = two_class_context();

        assert_eq!(ctx.administrations.len(), 1);
        let administration = ctx.administrations.values().next().expect("one group");

        let mut expected_classes: Vec<_> = ctx.classes.keys().cloned().collect();
        expected_classes.sort();
        let mut actual_classes = administration.classes.clone();
        actual_classes.sort();
        assert_eq!(actual_classes, expected_classes);

        let school_id = ctx.schools.keys().next().expect("one school");
        let district_id = ctx.districts.keys().next().expect("one district");
        assert_eq!(administration.schools, vec![school_id.clone()]);
        assert_eq!(administration.districts, vec![district_id.clone()]);

        let mut expected_grades: Vec<u8> = ctx.classes.values().map(|class| class.grade).collect();
        expected_grades.sort_unstable();
        expected_grades.dedup();
        assert_eq!(administration.grades, expected_grades);

        assert_eq!(administration.users.len(), 2);
    }

    #[test]
    fn test_each_student_gets_one_run_per_task() {
        let ctx = two_class_context();

        assert_eq!(ctx.engine_users.len(), 2);
        for engine_user in ctx.engine_users.values() {
            assert_eq!(engine_user.collections.runs.len(), TASK_IDS.len());
            for run in engine_user.collections.runs.values() {
                assert_eq!(run.collections.trials.len(), 4);
                assert!(run.id.starts_with("run-"));
            }
            assert_eq!(engine_user.tasks.len(), 4);
            assert_eq!(engine_user.variants.len(), 4);
            assert_eq!(engine_user.task_refs[0], "/tasks/swr");
        }
    }

    #[test]
    fn test_progress_run_ids_match_engine_runs() {
        let ctx = two_class_context();
        let administration_id = ctx.administrations.keys().next().expect("one group");

        for student_id in ctx.student_ids() {
            let user = ctx.users.get(&student_id).expect("student user");
            let progress = user
                .collections
                .administrations
                .get(administration_id)
                .expect("progress attached");
            assert!(!progress.completed);
            assert_eq!(progress.assessments.len(), TASK_IDS.len());

            let engine_user = ctx.engine_users.get(&student_id).expect("engine mirror");
            for (task_id, record) in &progress.assessments {
                let run = engine_user
                    .collections
                    .runs
                    .get(&record.run_id)
                    .expect("progress points at a real run");
                assert_eq!(&run.task_id, task_id);
                assert_eq!(run.completed, record.is_finished());
            }
        }
    }

    #[test]
    fn test_sre_is_the_unfinished_task() {
        let ctx = two_class_context();

        for student_id in ctx.student_ids() {
            let user = ctx.users.get(&student_id).expect("student user");
            for progress in user.collections.administrations.values() {
                for (task_id, record) in &progress.assessments {
                    if task_id == UNFINISHED_TASK_ID {
                        assert!(!record.is_finished());
                        assert!(!record.reward_shown);
                    } else {
                        assert!(record.is_finished(), "{} should be finished", task_id);
                        assert!(record.reward_shown);
                        let completed = record.completed_on.expect("finished record");
                        assert!(completed.seconds() >= record.started_on.seconds());
                    }
                }
            }
        }
    }

    #[test]
    fn test_administration_closes_after_it_opens() {
        let ctx = two_class_context();
        for administration in ctx.administrations.values() {
            assert!(administration.date_closed > administration.date_opened);
        }
    }

    #[test]
    fn test_assigned_variants_exist_in_catalog() {
        let ctx = two_class_context();
        for administration in ctx.administrations.values() {
            for (task_id, assignment) in &administration.assessments {
                let task = ctx.tasks.get(task_id).expect("catalog task");
                assert!(task.collections.variants.contains_key(&assignment.variant));
                assert_eq!(&assignment.task_id, task_id);
            }
        }
    }

    #[test]
    fn test_users_record_administration_timestamps() {
        let ctx = two_class_context();
        let administration_id = ctx.administrations.keys().next().expect("one group");
        let administration = ctx.administrations.values().next().expect("one group");

        for student_id in ctx.student_ids() {
            let user = ctx.users.get(&student_id).expect("student user");
            let assigned = user
                .administrations_assigned
                .as_ref()
                .expect("assigned map present");
            assert_eq!(
                assigned.get(administration_id),
                Some(&administration.date_opened)
            );
            let started = user
                .administrations_started
                .as_ref()
                .expect("started map present");
            assert!(started.contains_key(administration_id));
        }
    }

    #[test]
    fn test_empty_group_yields_empty_reference_lists() {
        // A group whose classes have no students still produces a valid
        // administration with empty user lists.
        let config = GeneratorConfig::default()
            .with_num_districts(1)
            .with_schools_per_district((1, 1))
            .with_educators_per_school((1, 1))
            .with_classes_per_school((1, 1))
            .with_students_per_class((0, 0))
            .with_class_group_size((5, 5))
            .with_seed(3);

        let mut ctx = BuildContext::new(config);
        catalog::build_task_catalog(&mut ctx);
        hierarchy::generate_districts(&mut ctx);
        hierarchy::generate_schools(&mut ctx);
        hierarchy::generate_staff_and_classes(&mut ctx);
        hierarchy::generate_students(&mut ctx).expect("student stage should succeed");
        assemble_administrations(&mut ctx).expect("assembly should succeed");

        assert_eq!(ctx.administrations.len(), 1);
        let administration = ctx.administrations.values().next().expect("one group");
        assert!(administration.users.is_empty());
        assert!(!administration.schools.is_empty());
    }
}
