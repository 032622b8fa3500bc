//! Derived-query engine.
//!
//! Answers "who may this instructor see" style questions from the current
//! store contents. Nothing is cached; each call reads the stores afresh.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{
    AssignmentQuery, CourseRepositoryError, DepartmentRepositoryError, EnrollmentRepositoryError,
    InstructorAssignmentRepositoryError, InstructorDepartment, RosterScope, RosterStudent,
    StorePorts, StudentRoster, UserDirectoryError,
};
use crate::domain::{
    AssignmentError, Course, CourseCode, CourseFilter, DependencyPolicy, DepartmentId,
    DepartmentMatch, EnrolledCourse, User, UserFilter, UserId, assignment_validator as validator,
    department_matcher, settings_service,
};

/// Domain service implementing [`AssignmentQuery`].
#[derive(Clone)]
pub struct AssignmentQueryService {
    stores: StorePorts,
    policy: DependencyPolicy,
    clock: Arc<dyn Clock>,
}

impl AssignmentQueryService {
    /// Create the service over the shared store ports.
    pub fn new(stores: StorePorts, policy: DependencyPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            stores,
            policy,
            clock,
        }
    }

    async fn find_instructor(&self, instructor_id: UserId) -> Result<User, AssignmentError> {
        let instructor = self
            .policy
            .call(
                UserDirectoryError::DEPENDENCY,
                self.stores.users.find_by_id(instructor_id),
            )
            .await?
            .ok_or(AssignmentError::InstructorNotFound { instructor_id })?;
        validator::validate_instructor_role(&instructor)?;
        Ok(instructor)
    }

    /// Departments whose students the instructor may see.
    async fn roster_departments(
        &self,
        instructor: &User,
    ) -> Result<(RosterScope, Vec<DepartmentId>), AssignmentError> {
        let links = self
            .policy
            .call(
                InstructorAssignmentRepositoryError::DEPENDENCY,
                self.stores.assignments.department_links(instructor.id),
            )
            .await?;
        if !links.is_empty() {
            let ids = links.into_iter().map(|link| link.department_id).collect();
            return Ok((RosterScope::AssignedDepartments, ids));
        }
        Ok(match instructor.department_id {
            Some(home) => (RosterScope::HomeDepartment, vec![home]),
            None => (RosterScope::NoDepartmentAssigned, Vec::new()),
        })
    }

    /// Group enrollments by student, or `None` when they could not be loaded.
    async fn enrollments_by_student(
        &self,
        students: &[User],
    ) -> Option<BTreeMap<UserId, Vec<EnrolledCourse>>> {
        let ids: Vec<UserId> = students.iter().map(|student| student.id).collect();
        match self
            .policy
            .call(
                EnrollmentRepositoryError::DEPENDENCY,
                self.stores.enrollments.list_for_students(&ids),
            )
            .await
        {
            Ok(rows) => {
                let mut grouped: BTreeMap<UserId, Vec<EnrolledCourse>> = BTreeMap::new();
                for row in rows {
                    grouped.entry(row.student_id).or_default().push(row);
                }
                Some(grouped)
            }
            Err(error) => {
                warn!(%error, "roster enrichment failed; returning students without courses");
                None
            }
        }
    }
}

#[async_trait]
impl AssignmentQuery for AssignmentQueryService {
    async fn students_visible_to(
        &self,
        instructor_id: UserId,
        include_courses: bool,
    ) -> Result<StudentRoster, AssignmentError> {
        let instructor = self.find_instructor(instructor_id).await?;
        let (scope, department_ids) = self.roster_departments(&instructor).await?;
        if scope == RosterScope::NoDepartmentAssigned {
            debug!(%instructor_id, "instructor has no departments; roster is empty");
            return Ok(StudentRoster {
                instructor_id,
                scope,
                department_ids,
                students: Vec::new(),
                courses_included: include_courses,
                enrichment_failed: false,
            });
        }

        let students = self
            .policy
            .call(
                UserDirectoryError::DEPENDENCY,
                self.stores
                    .users
                    .list(&UserFilter::students_in(department_ids.clone())),
            )
            .await?;

        let (mut courses, enrichment_failed) = if include_courses && !students.is_empty() {
            match self.enrollments_by_student(&students).await {
                Some(grouped) => (grouped, false),
                None => (BTreeMap::new(), true),
            }
        } else {
            (BTreeMap::new(), false)
        };

        let students = students
            .into_iter()
            .map(|student| RosterStudent {
                courses: courses.remove(&student.id).unwrap_or_default(),
                student,
            })
            .collect();

        Ok(StudentRoster {
            instructor_id,
            scope,
            department_ids,
            students,
            courses_included: include_courses,
            enrichment_failed,
        })
    }

    async fn courses_assigned_to(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<Course>, AssignmentError> {
        self.find_instructor(instructor_id).await?;
        self.policy
            .call(
                CourseRepositoryError::DEPENDENCY,
                self.stores
                    .courses
                    .list(&CourseFilter::assigned_to(instructor_id)),
            )
            .await
    }

    async fn departments_assigned_to(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<InstructorDepartment>, AssignmentError> {
        self.find_instructor(instructor_id).await?;
        let links = self
            .policy
            .call(
                InstructorAssignmentRepositoryError::DEPENDENCY,
                self.stores.assignments.department_links(instructor_id),
            )
            .await?;
        if links.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DepartmentId> = links.iter().map(|link| link.department_id).collect();
        let departments = self
            .policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.find_by_ids(&ids),
            )
            .await?;
        Ok(links
            .into_iter()
            .filter_map(|link| {
                let department = departments
                    .iter()
                    .find(|department| department.id == link.department_id)?
                    .clone();
                Some(InstructorDepartment { link, department })
            })
            .collect())
    }

    async fn unassigned_courses(&self) -> Result<Vec<Course>, AssignmentError> {
        self.policy
            .call(
                CourseRepositoryError::DEPENDENCY,
                self.stores.courses.list(&CourseFilter::unassigned()),
            )
            .await
    }

    async fn department_for(
        &self,
        course_code: &CourseCode,
    ) -> Result<Option<DepartmentMatch>, AssignmentError> {
        let settings =
            settings_service::current_settings(&self.stores, &self.policy, self.clock.as_ref())
                .await?;
        let departments = self
            .policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.list(),
            )
            .await?;
        Ok(department_matcher::best_effort_department(
            course_code,
            &departments,
            &settings.default_department_code,
        ))
    }
}

#[cfg(test)]
#[path = "assignment_query_service_tests.rs"]
mod tests;
