//! Regression coverage for the in-memory store.

use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::{CatalogName, DisplayName, Semester};

fn department(code: &str) -> Department {
    Department {
        id: DepartmentId::random(),
        code: DepartmentCode::new(code).expect("code"),
        name: CatalogName::new(code).expect("name"),
        description: None,
    }
}

fn course(code: &str, department_id: Option<DepartmentId>) -> Course {
    Course {
        id: CourseId::random(),
        code: CourseCode::new(code).expect("code"),
        name: CatalogName::new(code).expect("name"),
        department_id,
        instructor_id: None,
        semester: Semester::Fall,
        year: 2026,
        is_active: true,
    }
}

fn course_link(instructor_id: UserId, course_id: CourseId) -> CourseAssignment {
    CourseAssignment {
        instructor_id,
        course_id,
        is_primary: true,
        assigned_by: None,
        assigned_at: Utc::now(),
    }
}

fn user(email: &str, role: Role) -> User {
    User {
        id: UserId::random(),
        email: EmailAddress::new(email).expect("email"),
        display_name: DisplayName::new(email).expect("name"),
        role,
        student_number: None,
        department_id: None,
    }
}

struct Seeded {
    store: InMemoryStore,
    cs: Department,
    cs101: Course,
    cs102: Course,
}

async fn seeded() -> Seeded {
    let store = InMemoryStore::new();
    let cs = department("CS");
    let cs101 = course("CS101", Some(cs.id));
    let cs102 = course("CS102", Some(cs.id));
    DepartmentRepository::insert(&store, &cs).await.expect("cs");
    CourseRepository::insert(&store, &cs101).await.expect("cs101");
    CourseRepository::insert(&store, &cs102).await.expect("cs102");
    Seeded {
        store,
        cs,
        cs101,
        cs102,
    }
}

async fn owner_of(store: &InMemoryStore, id: CourseId) -> Option<UserId> {
    CourseRepository::find_by_ids(store, &[id])
        .await
        .expect("courses")
        .first()
        .and_then(|course| course.instructor_id)
}

#[rstest]
#[tokio::test]
async fn upserting_a_course_link_moves_ownership() {
    let seeded = seeded().await;
    let first = UserId::random();
    let second = UserId::random();

    seeded
        .store
        .upsert_course_link(&course_link(first, seeded.cs101.id))
        .await
        .expect("first owner");
    seeded
        .store
        .upsert_course_link(&course_link(second, seeded.cs101.id))
        .await
        .expect("second owner");

    assert_eq!(owner_of(&seeded.store, seeded.cs101.id).await, Some(second));
    assert!(seeded.store.course_links(first).await.expect("links").is_empty());
    assert_eq!(seeded.store.course_links(second).await.expect("links").len(), 1);
}

#[rstest]
#[tokio::test]
async fn replacing_course_links_releases_dropped_courses() {
    let seeded = seeded().await;
    let instructor = UserId::random();
    seeded
        .store
        .replace_course_links(
            instructor,
            &[
                course_link(instructor, seeded.cs101.id),
                course_link(instructor, seeded.cs102.id),
            ],
        )
        .await
        .expect("initial set");

    seeded
        .store
        .replace_course_links(instructor, &[course_link(instructor, seeded.cs102.id)])
        .await
        .expect("replacement");

    assert_eq!(owner_of(&seeded.store, seeded.cs101.id).await, None);
    assert_eq!(owner_of(&seeded.store, seeded.cs102.id).await, Some(instructor));
}

#[rstest]
#[tokio::test]
async fn removing_course_links_clears_ownership() {
    let seeded = seeded().await;
    let instructor = UserId::random();
    seeded
        .store
        .upsert_course_link(&course_link(instructor, seeded.cs101.id))
        .await
        .expect("owner");

    let removed = seeded
        .store
        .remove_course_links(instructor, None)
        .await
        .expect("removed");

    assert_eq!(removed, 1);
    assert_eq!(owner_of(&seeded.store, seeded.cs101.id).await, None);
}

#[rstest]
#[tokio::test]
async fn deleting_a_department_detaches_courses_and_links() {
    let seeded = seeded().await;
    let instructor = UserId::random();
    seeded
        .store
        .upsert_department_link(&DepartmentAssignment {
            instructor_id: instructor,
            department_id: seeded.cs.id,
            is_primary: true,
            assigned_by: None,
            assigned_at: Utc::now(),
        })
        .await
        .expect("link");

    let deleted = DepartmentRepository::delete(&seeded.store, seeded.cs.id)
        .await
        .expect("delete");

    assert!(deleted);
    assert!(
        seeded
            .store
            .department_links(instructor)
            .await
            .expect("links")
            .is_empty()
    );
    let orphans = CourseRepository::list(&seeded.store, &CourseFilter::missing_department())
        .await
        .expect("orphans");
    assert_eq!(orphans.len(), 2);
}

#[rstest]
#[tokio::test]
async fn duplicate_codes_are_rejected() {
    let seeded = seeded().await;
    let err = DepartmentRepository::insert(&seeded.store, &department("cs"))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, DepartmentRepositoryError::DuplicateCode { .. }));
}

#[rstest]
#[tokio::test]
async fn duplicate_emails_are_rejected() {
    let store = InMemoryStore::new();
    let first = NewUser {
        user: user("ada@uni.edu", Role::Admin),
        password_hash: "hash".to_owned(),
    };
    let second = NewUser {
        user: user("ADA@uni.edu", Role::Student),
        password_hash: "hash".to_owned(),
    };
    store.create(&first).await.expect("first");
    let err = store.create(&second).await.expect_err("duplicate");
    assert!(matches!(err, UserDirectoryError::DuplicateEmail { .. }));
    assert_eq!(store.count_admins().await.expect("count"), 1);
}

#[rstest]
#[tokio::test]
async fn duplicate_enrollments_are_rejected() {
    let seeded = seeded().await;
    let enrollment = Enrollment {
        student_id: UserId::random(),
        course_id: seeded.cs101.id,
        status: crate::domain::EnrollmentStatus::Active,
        grade: None,
        enrolled_at: Utc::now(),
    };
    EnrollmentRepository::insert(&seeded.store, &enrollment)
        .await
        .expect("first");
    let err = EnrollmentRepository::insert(&seeded.store, &enrollment)
        .await
        .expect_err("duplicate");
    assert_eq!(err, EnrollmentRepositoryError::Duplicate);
}

#[rstest]
#[tokio::test]
async fn settings_saves_check_the_revision() {
    let store = InMemoryStore::new();
    let mut settings = SystemSettings::defaults(2026).expect("defaults");
    settings.revision = 1;
    store.save(&settings, 0).await.expect("first save");

    let err = store.save(&settings, 0).await.expect_err("stale");
    assert_eq!(err, SettingsRepositoryError::revision_mismatch(0_u32, 1_u32));
    assert_eq!(store.load().await.expect("load").map(|s| s.revision), Some(1));
}
