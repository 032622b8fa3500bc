//! Assignment writer.
//!
//! Links instructors to departments and makes them owners of courses. Every
//! request is validated in full before the first write: a missing record or
//! an uncovered course department rejects the whole request. Replace-mode
//! batches are handed to the store as one atomic operation; append-mode
//! batches upsert item by item and report each outcome.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AssignCoursesRequest, AssignDepartmentsRequest, AssignmentCommand, CourseAssignmentReport,
    CourseRepositoryError, DepartmentAssignmentReport, DepartmentRepositoryError,
    InstructorAssignmentRepositoryError, ItemOutcome, ItemResult, StorePorts, UserDirectoryError,
};
use crate::domain::{
    AssignmentError, Course, CourseAssignment, CourseId, DependencyPolicy, DepartmentAssignment,
    DepartmentId, User, UserId, assignment_validator as validator,
};

/// Domain service implementing [`AssignmentCommand`].
#[derive(Clone)]
pub struct AssignmentService {
    stores: StorePorts,
    policy: DependencyPolicy,
    clock: Arc<dyn Clock>,
}

impl AssignmentService {
    /// Create the service over the shared store ports.
    pub fn new(stores: StorePorts, policy: DependencyPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            stores,
            policy,
            clock,
        }
    }

    async fn find_instructor(&self, instructor_id: UserId) -> Result<User, AssignmentError> {
        self.policy
            .call(
                UserDirectoryError::DEPENDENCY,
                self.stores.users.find_by_id(instructor_id),
            )
            .await?
            .ok_or(AssignmentError::InstructorNotFound { instructor_id })
    }

    async fn find_teaching_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<User, AssignmentError> {
        let instructor = self.find_instructor(instructor_id).await?;
        validator::validate_instructor_role(&instructor)?;
        Ok(instructor)
    }

    async fn department_links(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<DepartmentAssignment>, AssignmentError> {
        self.policy
            .call(
                InstructorAssignmentRepositoryError::DEPENDENCY,
                self.stores.assignments.department_links(instructor_id),
            )
            .await
    }

    /// Load the requested courses in request order, failing on any missing id.
    async fn load_courses(&self, course_ids: &[CourseId]) -> Result<Vec<Course>, AssignmentError> {
        let found = self
            .policy
            .call(
                CourseRepositoryError::DEPENDENCY,
                self.stores.courses.find_by_ids(course_ids),
            )
            .await?;
        validator::validate_courses_exist(course_ids, &found)?;
        Ok(course_ids
            .iter()
            .filter_map(|id| found.iter().find(|course| course.id == *id).cloned())
            .collect())
    }

    async fn check_coverage(
        &self,
        instructor_id: UserId,
        courses: &[Course],
    ) -> Result<(), AssignmentError> {
        let links = self.department_links(instructor_id).await?;
        let mut department_ids: Vec<DepartmentId> = Vec::new();
        for id in courses.iter().filter_map(|course| course.department_id) {
            if !department_ids.contains(&id) {
                department_ids.push(id);
            }
        }
        let departments = if department_ids.is_empty() {
            Vec::new()
        } else {
            self.policy
                .call(
                    DepartmentRepositoryError::DEPENDENCY,
                    self.stores.departments.find_by_ids(&department_ids),
                )
                .await?
        };
        validator::validate_instructor_covers_course_departments(&links, courses, &departments)
    }

    async fn append_department_links(
        &self,
        links: Vec<DepartmentAssignment>,
    ) -> Vec<ItemResult<DepartmentId, DepartmentAssignment>> {
        let mut items = Vec::with_capacity(links.len());
        for link in links {
            let outcome = match self
                .policy
                .call_idempotent(InstructorAssignmentRepositoryError::DEPENDENCY, || {
                    self.stores.assignments.upsert_department_link(&link)
                })
                .await
            {
                Ok(written) => ItemOutcome::Assigned(written),
                Err(error) => {
                    warn!(
                        instructor_id = %link.instructor_id,
                        department_id = %link.department_id,
                        %error,
                        "department link upsert failed"
                    );
                    ItemOutcome::Failed(error)
                }
            };
            items.push(ItemResult {
                id: link.department_id,
                outcome,
            });
        }
        items
    }

    async fn append_course_links(
        &self,
        links: Vec<CourseAssignment>,
    ) -> Vec<ItemResult<CourseId, CourseAssignment>> {
        let mut items = Vec::with_capacity(links.len());
        for link in links {
            let outcome = match self
                .policy
                .call_idempotent(InstructorAssignmentRepositoryError::DEPENDENCY, || {
                    self.stores.assignments.upsert_course_link(&link)
                })
                .await
            {
                Ok(written) => ItemOutcome::Assigned(written),
                Err(error) => {
                    warn!(
                        instructor_id = %link.instructor_id,
                        course_id = %link.course_id,
                        %error,
                        "course link upsert failed"
                    );
                    ItemOutcome::Failed(error)
                }
            };
            items.push(ItemResult {
                id: link.course_id,
                outcome,
            });
        }
        items
    }
}

fn assigned_items<Id, L>(links: Vec<L>, id_of: impl Fn(&L) -> Id) -> Vec<ItemResult<Id, L>> {
    links
        .into_iter()
        .map(|link| ItemResult {
            id: id_of(&link),
            outcome: ItemOutcome::Assigned(link),
        })
        .collect()
}

#[async_trait]
impl AssignmentCommand for AssignmentService {
    async fn assign_departments(
        &self,
        request: AssignDepartmentsRequest,
    ) -> Result<DepartmentAssignmentReport, AssignmentError> {
        let AssignDepartmentsRequest {
            instructor_id,
            department_ids,
            options,
        } = request;
        let department_ids =
            validator::normalize_requested_ids(&department_ids, "departmentIds")?;
        self.find_teaching_instructor(instructor_id).await?;
        let found = self
            .policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.find_by_ids(&department_ids),
            )
            .await?;
        validator::validate_departments_exist(&department_ids, &found)?;

        let now = self.clock.utc();
        let items = if options.replace_existing {
            let links: Vec<DepartmentAssignment> = department_ids
                .iter()
                .enumerate()
                .map(|(index, department_id)| DepartmentAssignment {
                    instructor_id,
                    department_id: *department_id,
                    is_primary: index == 0,
                    assigned_by: Some(options.assigned_by),
                    assigned_at: now,
                })
                .collect();
            let written = self
                .policy
                .call(
                    InstructorAssignmentRepositoryError::DEPENDENCY,
                    self.stores
                        .assignments
                        .replace_department_links(instructor_id, &links),
                )
                .await?;
            assigned_items(written, |link| link.department_id)
        } else {
            let existing = self.department_links(instructor_id).await?;
            let has_primary = existing.iter().any(|link| link.is_primary);
            let links = department_ids
                .iter()
                .enumerate()
                .map(|(index, department_id)| {
                    let already_primary = existing.iter().any(|link| {
                        link.department_id == *department_id && link.is_primary
                    });
                    DepartmentAssignment {
                        instructor_id,
                        department_id: *department_id,
                        is_primary: already_primary || (!has_primary && index == 0),
                        assigned_by: Some(options.assigned_by),
                        assigned_at: now,
                    }
                })
                .collect();
            self.append_department_links(links).await
        };

        let report = DepartmentAssignmentReport {
            instructor_id,
            replaced_existing: options.replace_existing,
            items,
        };
        info!(
            %instructor_id,
            assigned_by = %options.assigned_by,
            replace_existing = options.replace_existing,
            requested = department_ids.len(),
            failed = report.failed_count(),
            "departments assigned"
        );
        Ok(report)
    }

    async fn assign_courses(
        &self,
        request: AssignCoursesRequest,
    ) -> Result<CourseAssignmentReport, AssignmentError> {
        let AssignCoursesRequest {
            instructor_id,
            course_ids,
            options,
        } = request;
        let course_ids = validator::normalize_requested_ids(&course_ids, "courseIds")?;
        self.find_teaching_instructor(instructor_id).await?;
        let courses = self.load_courses(&course_ids).await?;
        self.check_coverage(instructor_id, &courses).await?;

        let now = self.clock.utc();
        let links: Vec<CourseAssignment> = course_ids
            .iter()
            .map(|course_id| CourseAssignment {
                instructor_id,
                course_id: *course_id,
                is_primary: true,
                assigned_by: Some(options.assigned_by),
                assigned_at: now,
            })
            .collect();
        let items = if options.replace_existing {
            let written = self
                .policy
                .call(
                    InstructorAssignmentRepositoryError::DEPENDENCY,
                    self.stores
                        .assignments
                        .replace_course_links(instructor_id, &links),
                )
                .await?;
            assigned_items(written, |link| link.course_id)
        } else {
            self.append_course_links(links).await
        };

        let report = CourseAssignmentReport {
            instructor_id,
            replaced_existing: options.replace_existing,
            items,
        };
        info!(
            %instructor_id,
            assigned_by = %options.assigned_by,
            replace_existing = options.replace_existing,
            requested = course_ids.len(),
            failed = report.failed_count(),
            "courses assigned"
        );
        Ok(report)
    }

    async fn unassign_department(
        &self,
        instructor_id: UserId,
        department_id: Option<DepartmentId>,
    ) -> Result<usize, AssignmentError> {
        self.find_instructor(instructor_id).await?;
        let removed = self
            .policy
            .call(
                InstructorAssignmentRepositoryError::DEPENDENCY,
                self.stores
                    .assignments
                    .remove_department_links(instructor_id, department_id),
            )
            .await?;
        info!(%instructor_id, ?department_id, removed, "department links removed");
        Ok(removed)
    }

    async fn unassign_course(
        &self,
        instructor_id: UserId,
        course_id: Option<CourseId>,
    ) -> Result<usize, AssignmentError> {
        self.find_instructor(instructor_id).await?;
        let removed = self
            .policy
            .call(
                InstructorAssignmentRepositoryError::DEPENDENCY,
                self.stores
                    .assignments
                    .remove_course_links(instructor_id, course_id),
            )
            .await?;
        info!(%instructor_id, ?course_id, removed, "course links removed");
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "assignment_service_tests.rs"]
mod tests;
