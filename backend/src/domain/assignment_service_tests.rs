//! Tests for the assignment writer.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    AssignmentQuery, InstructorAssignmentRepository, MockInstructorAssignmentRepository,
};
use crate::domain::service_fixtures::{Campus, course, fixture_timestamp};
use crate::domain::{AssignmentOptions, Role};

fn departments_request(
    campus: &Campus,
    department_ids: Vec<DepartmentId>,
    options: AssignmentOptions,
) -> AssignDepartmentsRequest {
    AssignDepartmentsRequest {
        instructor_id: campus.instructor.id,
        department_ids,
        options,
    }
}

fn courses_request(
    campus: &Campus,
    course_ids: Vec<CourseId>,
    options: AssignmentOptions,
) -> AssignCoursesRequest {
    AssignCoursesRequest {
        instructor_id: campus.instructor.id,
        course_ids,
        options,
    }
}

async fn linked_department_ids(campus: &Campus) -> Vec<DepartmentId> {
    let mut ids: Vec<DepartmentId> = campus
        .store
        .department_links(campus.instructor.id)
        .await
        .expect("links")
        .into_iter()
        .map(|link| link.department_id)
        .collect();
    ids.sort();
    ids
}

#[rstest]
#[tokio::test]
async fn replace_mode_leaves_exactly_the_requested_departments() {
    let campus = Campus::seed().await;
    let service = campus.assignments();
    let replace = AssignmentOptions::replace(campus.admin.id);

    service
        .assign_departments(departments_request(&campus, vec![campus.cs.id], replace))
        .await
        .expect("first assignment");
    let report = service
        .assign_departments(departments_request(
            &campus,
            vec![campus.math.id, campus.math.id],
            replace,
        ))
        .await
        .expect("replacement");

    assert!(report.replaced_existing);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(linked_department_ids(&campus).await, vec![campus.math.id]);
    let links = campus
        .store
        .department_links(campus.instructor.id)
        .await
        .expect("links");
    assert!(links[0].is_primary);
    assert_eq!(links[0].assigned_by, Some(campus.admin.id));
    assert_eq!(links[0].assigned_at, fixture_timestamp());
}

#[rstest]
#[tokio::test]
async fn append_mode_never_creates_a_second_primary() {
    let campus = Campus::seed().await;
    let service = campus.assignments();

    service
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("primary");
    let report = service
        .assign_departments(departments_request(
            &campus,
            vec![campus.math.id, campus.cs.id],
            AssignmentOptions::append(campus.admin.id),
        ))
        .await
        .expect("append");

    assert_eq!(report.assigned().count(), 2);
    let links = campus
        .store
        .department_links(campus.instructor.id)
        .await
        .expect("links");
    let primaries: Vec<DepartmentId> = links
        .iter()
        .filter(|link| link.is_primary)
        .map(|link| link.department_id)
        .collect();
    assert_eq!(primaries, vec![campus.cs.id]);
}

#[rstest]
#[tokio::test]
async fn unknown_departments_reject_the_whole_batch() {
    let campus = Campus::seed().await;
    let ghost = DepartmentId::random();

    let err = campus
        .assignments()
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id, ghost],
            AssignmentOptions::append(campus.admin.id),
        ))
        .await
        .expect_err("missing department");

    assert_eq!(
        err,
        AssignmentError::DepartmentNotFound {
            department_ids: vec![ghost]
        }
    );
    assert!(linked_department_ids(&campus).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn students_cannot_receive_assignments() {
    let campus = Campus::seed().await;
    let request = AssignDepartmentsRequest {
        instructor_id: campus.cs_student.id,
        department_ids: vec![campus.cs.id],
        options: AssignmentOptions::replace(campus.admin.id),
    };

    let err = campus
        .assignments()
        .assign_departments(request)
        .await
        .expect_err("student");

    assert_eq!(
        err,
        AssignmentError::NotAnInstructor {
            user_id: campus.cs_student.id,
            role: Role::Student
        }
    );
}

#[rstest]
#[tokio::test]
async fn unknown_instructors_are_reported() {
    let campus = Campus::seed().await;
    let ghost = UserId::random();
    let err = campus
        .assignments()
        .assign_courses(AssignCoursesRequest {
            instructor_id: ghost,
            course_ids: vec![campus.cs101.id],
            options: AssignmentOptions::append(campus.admin.id),
        })
        .await
        .expect_err("ghost");
    assert_eq!(
        err,
        AssignmentError::InstructorNotFound {
            instructor_id: ghost
        }
    );
}

#[rstest]
#[tokio::test]
async fn empty_id_lists_are_invalid() {
    let campus = Campus::seed().await;
    let err = campus
        .assignments()
        .assign_courses(courses_request(
            &campus,
            Vec::new(),
            AssignmentOptions::append(campus.admin.id),
        ))
        .await
        .expect_err("empty");
    assert_eq!(err.kind(), "invalid_request");
}

#[rstest]
#[tokio::test]
async fn courses_outside_assigned_departments_write_nothing() {
    let campus = Campus::seed().await;
    let service = campus.assignments();
    service
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("cs");

    let err = service
        .assign_courses(courses_request(
            &campus,
            vec![campus.cs101.id, campus.math201.id],
            AssignmentOptions::append(campus.admin.id),
        ))
        .await
        .expect_err("math not covered");

    assert_eq!(
        err,
        AssignmentError::DepartmentNotAssigned {
            departments: vec!["MATH".to_owned()]
        }
    );
    assert!(
        campus
            .store
            .course_links(campus.instructor.id)
            .await
            .expect("links")
            .is_empty()
    );
    let owned = campus
        .queries()
        .courses_assigned_to(campus.instructor.id)
        .await
        .expect("owned");
    assert!(owned.is_empty());
}

#[rstest]
#[tokio::test]
async fn courses_without_department_cannot_be_assigned() {
    let campus = Campus::seed().await;
    let orphan = course("LAB1", None);
    crate::domain::ports::CourseRepository::insert(campus.store.as_ref(), &orphan)
        .await
        .expect("orphan");
    campus
        .assignments()
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("cs");

    let err = campus
        .assignments()
        .assign_courses(courses_request(
            &campus,
            vec![orphan.id],
            AssignmentOptions::append(campus.admin.id),
        ))
        .await
        .expect_err("orphan");

    assert_eq!(err.kind(), "course_department_missing");
}

#[rstest]
#[tokio::test]
async fn assigning_a_course_moves_ownership_between_instructors() {
    let campus = Campus::seed().await;
    let service = campus.assignments();
    let other = crate::domain::service_fixtures::user("hopper@uni.edu", Role::Instructor, None);
    campus.store.seed_user(other.clone());
    for instructor_id in [campus.instructor.id, other.id] {
        service
            .assign_departments(AssignDepartmentsRequest {
                instructor_id,
                department_ids: vec![campus.cs.id],
                options: AssignmentOptions::replace(campus.admin.id),
            })
            .await
            .expect("cs link");
    }

    service
        .assign_courses(courses_request(
            &campus,
            vec![campus.cs101.id],
            AssignmentOptions::append(campus.admin.id),
        ))
        .await
        .expect("first owner");
    service
        .assign_courses(AssignCoursesRequest {
            instructor_id: other.id,
            course_ids: vec![campus.cs101.id],
            options: AssignmentOptions::append(campus.admin.id),
        })
        .await
        .expect("second owner");

    let queries = campus.queries();
    assert!(
        queries
            .courses_assigned_to(campus.instructor.id)
            .await
            .expect("first")
            .is_empty()
    );
    let owned = queries.courses_assigned_to(other.id).await.expect("second");
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].instructor_id, Some(other.id));
}

#[rstest]
#[tokio::test]
async fn unassigning_courses_makes_them_unassigned() {
    let campus = Campus::seed().await;
    let service = campus.assignments();
    service
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("cs");
    service
        .assign_courses(courses_request(
            &campus,
            vec![campus.cs101.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("cs101");

    let removed = service
        .unassign_course(campus.instructor.id, Some(campus.cs101.id))
        .await
        .expect("unassign");

    assert_eq!(removed, 1);
    let unassigned = campus.queries().unassigned_courses().await.expect("list");
    assert!(unassigned.iter().any(|c| c.id == campus.cs101.id));
}

#[rstest]
#[tokio::test]
async fn unassigning_all_departments_returns_the_count() {
    let campus = Campus::seed().await;
    let service = campus.assignments();
    service
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id, campus.math.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("links");

    let removed = service
        .unassign_department(campus.instructor.id, None)
        .await
        .expect("removed");

    assert_eq!(removed, 2);
    assert!(linked_department_ids(&campus).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn append_mode_reports_failed_items_and_keeps_going() {
    let campus = Campus::seed().await;
    let failing = campus.math.id;
    let mut assignments = MockInstructorAssignmentRepository::new();
    assignments
        .expect_department_links()
        .returning(|_| Ok(Vec::new()));
    assignments
        .expect_upsert_department_link()
        .returning(move |link| {
            if link.department_id == failing {
                Err(InstructorAssignmentRepositoryError::connection("reset"))
            } else {
                Ok(link.clone())
            }
        });
    let mut ports = campus.ports();
    ports.assignments = Arc::new(assignments);
    let service = AssignmentService::new(
        ports,
        DependencyPolicy::default(),
        crate::domain::service_fixtures::fixture_clock(),
    );

    let report = service
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id, campus.math.id],
            AssignmentOptions::append(campus.admin.id),
        ))
        .await
        .expect("partial success");

    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.assigned().count(), 1);
    let failed = report
        .items
        .iter()
        .find(|item| item.id == failing)
        .expect("failed item");
    assert!(matches!(
        &failed.outcome,
        ItemOutcome::Failed(error) if error.is_dependency_failure()
    ));
}

#[rstest]
#[tokio::test]
async fn replace_mode_failures_surface_as_dependency_errors() {
    let campus = Campus::seed().await;
    let mut assignments = MockInstructorAssignmentRepository::new();
    assignments
        .expect_replace_department_links()
        .times(1)
        .returning(|_, _| Err(InstructorAssignmentRepositoryError::connection("down")));
    let mut ports = campus.ports();
    ports.assignments = Arc::new(assignments);
    let service = AssignmentService::new(
        ports,
        DependencyPolicy::default(),
        crate::domain::service_fixtures::fixture_clock(),
    );

    let err = service
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect_err("store down");

    assert_eq!(err.kind(), "dependency_unavailable");
}

async fn primary_department_ids(campus: &Campus) -> Vec<DepartmentId> {
    campus
        .store
        .department_links(campus.instructor.id)
        .await
        .expect("links")
        .into_iter()
        .filter(|link| link.is_primary)
        .map(|link| link.department_id)
        .collect()
}

async fn seed_cs_course(campus: &Campus, code: &str) -> Course {
    let extra = course(code, Some(campus.cs.id));
    crate::domain::ports::CourseRepository::insert(campus.store.as_ref(), &extra)
        .await
        .expect("course");
    extra
}

#[rstest]
#[tokio::test]
async fn appending_after_losing_the_primary_promotes_the_first_requested() {
    let campus = Campus::seed().await;
    let service = campus.assignments();
    service
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id, campus.math.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("both");
    service
        .unassign_department(campus.instructor.id, Some(campus.cs.id))
        .await
        .expect("drop primary");
    assert!(primary_department_ids(&campus).await.is_empty());

    service
        .assign_departments(departments_request(
            &campus,
            vec![campus.math.id],
            AssignmentOptions::append(campus.admin.id),
        ))
        .await
        .expect("re-append");

    assert_eq!(primary_department_ids(&campus).await, vec![campus.math.id]);
}

#[rstest]
#[tokio::test]
async fn repeating_an_append_leaves_the_same_links() {
    let campus = Campus::seed().await;
    let service = campus.assignments();
    let append = AssignmentOptions::append(campus.admin.id);

    for _ in 0..2 {
        service
            .assign_departments(departments_request(
                &campus,
                vec![campus.cs.id, campus.math.id],
                append,
            ))
            .await
            .expect("append");
    }

    let mut expected = vec![campus.cs.id, campus.math.id];
    expected.sort();
    assert_eq!(linked_department_ids(&campus).await, expected);
    assert_eq!(primary_department_ids(&campus).await, vec![campus.cs.id]);
}

#[rstest]
#[tokio::test]
async fn assigned_courses_are_exactly_the_requested_set() {
    let campus = Campus::seed().await;
    let service = campus.assignments();
    let cs102 = seed_cs_course(&campus, "CS102").await;
    service
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("cs");

    service
        .assign_courses(courses_request(
            &campus,
            vec![campus.cs101.id, cs102.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("courses");

    let mut owned: Vec<CourseId> = campus
        .queries()
        .courses_assigned_to(campus.instructor.id)
        .await
        .expect("owned")
        .into_iter()
        .map(|c| c.id)
        .collect();
    owned.sort();
    let mut expected = vec![campus.cs101.id, cs102.id];
    expected.sort();
    assert_eq!(owned, expected);
}

#[rstest]
#[tokio::test]
async fn unassigning_every_course_empties_the_instructor() {
    let campus = Campus::seed().await;
    let service = campus.assignments();
    let cs102 = seed_cs_course(&campus, "CS102").await;
    service
        .assign_departments(departments_request(
            &campus,
            vec![campus.cs.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("cs");
    service
        .assign_courses(courses_request(
            &campus,
            vec![campus.cs101.id, cs102.id],
            AssignmentOptions::replace(campus.admin.id),
        ))
        .await
        .expect("courses");

    let removed = service
        .unassign_course(campus.instructor.id, None)
        .await
        .expect("unassign all");

    assert_eq!(removed, 2);
    assert!(
        campus
            .queries()
            .courses_assigned_to(campus.instructor.id)
            .await
            .expect("owned")
            .is_empty()
    );
}
