//! Shared fixtures for the domain service tests.
//!
//! The campus fixture seeds the in-memory store with two departments (CS and
//! MATH), one course in each, an administrator, an instructor without links
//! and one student per department.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{CourseRepository, DepartmentRepository, StorePorts};
use crate::domain::{
    AssignmentQueryService, AssignmentService, CatalogName, CatalogService, Course, CourseCode,
    CourseId, DependencyPolicy, Department, DepartmentCode, DepartmentId, DisplayName,
    EmailAddress, Role, Semester, SettingsService, User, UserId,
};
use crate::outbound::memory::InMemoryStore;

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn user(email: &str, role: Role, department_id: Option<DepartmentId>) -> User {
    User {
        id: UserId::random(),
        email: EmailAddress::new(email).expect("fixture email"),
        display_name: DisplayName::new(email).expect("fixture name"),
        role,
        student_number: None,
        department_id,
    }
}

pub(crate) fn department(code: &str) -> Department {
    Department {
        id: DepartmentId::random(),
        code: DepartmentCode::new(code).expect("fixture department code"),
        name: CatalogName::new(format!("{code} department")).expect("fixture name"),
        description: None,
    }
}

pub(crate) fn course(code: &str, department_id: Option<DepartmentId>) -> Course {
    Course {
        id: CourseId::random(),
        code: CourseCode::new(code).expect("fixture course code"),
        name: CatalogName::new(format!("{code} lectures")).expect("fixture name"),
        department_id,
        instructor_id: None,
        semester: Semester::Fall,
        year: 2026,
        is_active: true,
    }
}

pub(crate) struct Campus {
    pub store: Arc<InMemoryStore>,
    pub admin: User,
    pub instructor: User,
    pub cs_student: User,
    pub math_student: User,
    pub cs: Department,
    pub math: Department,
    pub cs101: Course,
    pub math201: Course,
}

impl Campus {
    pub(crate) async fn seed() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let cs = department("CS");
        let math = department("MATH");
        let cs101 = course("CS101", Some(cs.id));
        let math201 = course("MATH201", Some(math.id));
        for department in [&cs, &math] {
            DepartmentRepository::insert(store.as_ref(), department)
                .await
                .expect("seed department");
        }
        for course in [&cs101, &math201] {
            CourseRepository::insert(store.as_ref(), course)
                .await
                .expect("seed course");
        }

        let admin = user("admin@uni.edu", Role::Admin, None);
        let instructor = user("turing@uni.edu", Role::Instructor, None);
        let cs_student = user("ada@uni.edu", Role::Student, Some(cs.id));
        let math_student = user("emmy@uni.edu", Role::Student, Some(math.id));
        for person in [&admin, &instructor, &cs_student, &math_student] {
            store.seed_user(person.clone());
        }

        Self {
            store,
            admin,
            instructor,
            cs_student,
            math_student,
            cs,
            math,
            cs101,
            math201,
        }
    }

    pub(crate) fn ports(&self) -> StorePorts {
        StorePorts::from_store(self.store.clone())
    }

    pub(crate) fn assignments(&self) -> AssignmentService {
        AssignmentService::new(self.ports(), DependencyPolicy::default(), fixture_clock())
    }

    pub(crate) fn queries(&self) -> AssignmentQueryService {
        AssignmentQueryService::new(self.ports(), DependencyPolicy::default(), fixture_clock())
    }

    pub(crate) fn catalog(&self) -> CatalogService {
        CatalogService::new(self.ports(), DependencyPolicy::default(), fixture_clock())
    }

    pub(crate) fn settings(&self) -> SettingsService {
        SettingsService::new(self.ports(), DependencyPolicy::default(), fixture_clock())
    }
}
