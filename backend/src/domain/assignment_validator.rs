//! Pure checks run before any assignment write.
//!
//! Nothing here performs I/O: callers load the records and pass them in, so
//! each check is callable on its own in tests. Every check is all-or-nothing
//! for the request it guards.

use std::collections::{BTreeMap, HashSet};

use super::{
    AssignmentError, Course, CourseId, Department, DepartmentAssignment, DepartmentId, User,
};

/// Reject empty id lists and drop repeated ids, keeping first-seen order.
pub fn normalize_requested_ids<T>(ids: &[T], field: &str) -> Result<Vec<T>, AssignmentError>
where
    T: Copy + Eq + std::hash::Hash,
{
    if ids.is_empty() {
        return Err(AssignmentError::invalid_request(format!(
            "{field} must contain at least one id"
        )));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    Ok(ids.iter().copied().filter(|id| seen.insert(*id)).collect())
}

/// Fail unless the user may teach.
pub fn validate_instructor_role(user: &User) -> Result<(), AssignmentError> {
    if user.role.can_teach() {
        Ok(())
    } else {
        Err(AssignmentError::NotAnInstructor {
            user_id: user.id,
            role: user.role,
        })
    }
}

/// Fail with every requested department id that was not found.
pub fn validate_departments_exist(
    requested: &[DepartmentId],
    found: &[Department],
) -> Result<(), AssignmentError> {
    let known: HashSet<DepartmentId> = found.iter().map(|department| department.id).collect();
    let missing: Vec<DepartmentId> = requested
        .iter()
        .copied()
        .filter(|id| !known.contains(id))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AssignmentError::DepartmentNotFound {
            department_ids: missing,
        })
    }
}

/// Fail with every requested course id that was not found; otherwise return
/// each requested course's department, in request order.
pub fn validate_courses_exist(
    requested: &[CourseId],
    found: &[Course],
) -> Result<Vec<(CourseId, Option<DepartmentId>)>, AssignmentError> {
    let by_id: BTreeMap<CourseId, &Course> =
        found.iter().map(|course| (course.id, course)).collect();
    let mut missing = Vec::new();
    let mut departments = Vec::with_capacity(requested.len());
    for id in requested {
        match by_id.get(id) {
            Some(course) => departments.push((*id, course.department_id)),
            None => missing.push(*id),
        }
    }
    if missing.is_empty() {
        Ok(departments)
    } else {
        Err(AssignmentError::CourseNotFound {
            course_ids: missing,
        })
    }
}

/// Fail unless every course's department is among the instructor's links.
///
/// Courses without a department fail with
/// [`AssignmentError::CourseDepartmentMissing`]. Otherwise the lacking
/// departments are reported by code, falling back to the id when a code is
/// not known.
pub fn validate_instructor_covers_course_departments(
    assigned: &[DepartmentAssignment],
    courses: &[Course],
    departments: &[Department],
) -> Result<(), AssignmentError> {
    let without_department: Vec<String> = courses
        .iter()
        .filter(|course| course.department_id.is_none())
        .map(|course| course.code.to_string())
        .collect();
    if !without_department.is_empty() {
        return Err(AssignmentError::CourseDepartmentMissing {
            course_codes: without_department,
        });
    }

    let covered: HashSet<DepartmentId> = assigned.iter().map(|link| link.department_id).collect();
    let mut lacking: Vec<DepartmentId> = Vec::new();
    for department_id in courses.iter().filter_map(|course| course.department_id) {
        if !covered.contains(&department_id) && !lacking.contains(&department_id) {
            lacking.push(department_id);
        }
    }
    if lacking.is_empty() {
        return Ok(());
    }

    let codes: BTreeMap<DepartmentId, String> = departments
        .iter()
        .map(|department| (department.id, department.code.to_string()))
        .collect();
    let departments = lacking
        .into_iter()
        .map(|id| codes.get(&id).cloned().unwrap_or_else(|| id.to_string()))
        .collect();
    Err(AssignmentError::DepartmentNotAssigned { departments })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{
        CatalogName, CourseCode, DepartmentCode, DisplayName, EmailAddress, Role, Semester,
        UserId,
    };
    use chrono::Utc;
    use rstest::{fixture, rstest};

    fn department(code: &str) -> Department {
        Department {
            id: DepartmentId::random(),
            code: DepartmentCode::new(code).expect("code"),
            name: CatalogName::new(format!("{code} department")).expect("name"),
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

    fn link(instructor_id: UserId, department_id: DepartmentId) -> DepartmentAssignment {
        DepartmentAssignment {
            instructor_id,
            department_id,
            is_primary: true,
            assigned_by: None,
            assigned_at: Utc::now(),
        }
    }

    fn user(role: Role) -> User {
        User {
            id: UserId::random(),
            email: EmailAddress::new("u@uni.edu").expect("email"),
            display_name: DisplayName::new("U").expect("name"),
            role,
            student_number: None,
            department_id: None,
        }
    }

    struct Catalog {
        cs: Department,
        math: Department,
        cs101: Course,
        math201: Course,
    }

    #[fixture]
    fn catalog() -> Catalog {
        let cs = department("CS");
        let math = department("MATH");
        let cs101 = course("CS101", Some(cs.id));
        let math201 = course("MATH201", Some(math.id));
        Catalog {
            cs,
            math,
            cs101,
            math201,
        }
    }

    #[rstest]
    fn normalize_rejects_empty_lists() {
        let err = normalize_requested_ids::<CourseId>(&[], "courseIds").expect_err("empty");
        assert_eq!(err.kind(), "invalid_request");
        assert!(err.to_string().contains("courseIds"));
    }

    #[rstest]
    fn normalize_drops_duplicates_in_order() {
        let a = CourseId::random();
        let b = CourseId::random();
        let ids = normalize_requested_ids(&[b, a, b, a], "courseIds").expect("ids");
        assert_eq!(ids, vec![b, a]);
    }

    #[rstest]
    #[case(Role::Student, false)]
    #[case(Role::Instructor, true)]
    #[case(Role::Admin, true)]
    fn role_check(#[case] role: Role, #[case] ok: bool) {
        let result = validate_instructor_role(&user(role));
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(err.kind(), "not_an_instructor");
        }
    }

    #[rstest]
    fn missing_departments_are_all_listed(catalog: Catalog) {
        let ghost_a = DepartmentId::random();
        let ghost_b = DepartmentId::random();
        let err = validate_departments_exist(
            &[catalog.cs.id, ghost_a, ghost_b],
            std::slice::from_ref(&catalog.cs),
        )
        .expect_err("missing");
        assert_eq!(
            err,
            AssignmentError::DepartmentNotFound {
                department_ids: vec![ghost_a, ghost_b]
            }
        );
    }

    #[rstest]
    fn course_lookup_returns_departments_in_request_order(catalog: Catalog) {
        let found = vec![catalog.math201.clone(), catalog.cs101.clone()];
        let departments =
            validate_courses_exist(&[catalog.cs101.id, catalog.math201.id], &found).expect("ok");
        assert_eq!(
            departments,
            vec![
                (catalog.cs101.id, Some(catalog.cs.id)),
                (catalog.math201.id, Some(catalog.math.id)),
            ]
        );
    }

    #[rstest]
    fn missing_courses_fail(catalog: Catalog) {
        let ghost = CourseId::random();
        let err = validate_courses_exist(&[ghost], &[catalog.cs101]).expect_err("missing");
        assert_eq!(err.kind(), "course_not_found");
    }

    #[rstest]
    fn coverage_passes_for_assigned_department(catalog: Catalog) {
        let instructor = UserId::random();
        let assigned = [link(instructor, catalog.cs.id)];
        let departments = [catalog.cs.clone(), catalog.math.clone()];
        assert!(
            validate_instructor_covers_course_departments(
                &assigned,
                &[catalog.cs101],
                &departments
            )
            .is_ok()
        );
    }

    #[rstest]
    fn coverage_names_the_lacking_department(catalog: Catalog) {
        let instructor = UserId::random();
        let assigned = [link(instructor, catalog.cs.id)];
        let departments = [catalog.cs.clone(), catalog.math.clone()];
        let err = validate_instructor_covers_course_departments(
            &assigned,
            &[catalog.cs101, catalog.math201],
            &departments,
        )
        .expect_err("math not covered");
        assert_eq!(
            err,
            AssignmentError::DepartmentNotAssigned {
                departments: vec!["MATH".to_owned()]
            }
        );
    }

    #[rstest]
    fn courses_without_department_cannot_be_covered(catalog: Catalog) {
        let instructor = UserId::random();
        let orphan = course("LAB1", None);
        let err = validate_instructor_covers_course_departments(
            &[link(instructor, catalog.cs.id)],
            &[catalog.cs101, orphan],
            &[catalog.cs],
        )
        .expect_err("orphan course");
        assert_eq!(
            err,
            AssignmentError::CourseDepartmentMissing {
                course_codes: vec!["LAB1".to_owned()]
            }
        );
    }
}
