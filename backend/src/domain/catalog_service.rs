//! Catalog administration service.
//!
//! Maintains departments, courses, directory roles and enrollments. Course
//! edits never touch the instructor; ownership only changes through the
//! assignment writer so the department coverage check cannot be bypassed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    BackfillReport, BackfilledCourse, CatalogCommand, CatalogQuery, CourseRepositoryError,
    DepartmentRepositoryError, EnrollmentRepositoryError, StorePorts, UserDirectoryError,
};
use crate::domain::{
    AssignmentError, Course, CourseDraft, CourseFilter, CourseId, DependencyPolicy, Department,
    DepartmentDraft, DepartmentId, Enrollment, EnrollmentStatus, Role, User, UserFilter, UserId,
    UserPatch, department_matcher,
};

/// Domain service implementing the catalog driving ports.
#[derive(Clone)]
pub struct CatalogService {
    stores: StorePorts,
    policy: DependencyPolicy,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    /// Create the service over the shared store ports.
    pub fn new(stores: StorePorts, policy: DependencyPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            stores,
            policy,
            clock,
        }
    }

    async fn require_department(&self, id: DepartmentId) -> Result<Department, AssignmentError> {
        self.policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.find_by_ids(&[id]),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AssignmentError::DepartmentNotFound {
                department_ids: vec![id],
            })
    }

    async fn require_course(&self, id: CourseId) -> Result<Course, AssignmentError> {
        self.policy
            .call(
                CourseRepositoryError::DEPENDENCY,
                self.stores.courses.find_by_ids(&[id]),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AssignmentError::CourseNotFound {
                course_ids: vec![id],
            })
    }

    async fn require_user(&self, user_id: UserId) -> Result<User, AssignmentError> {
        self.policy
            .call(
                UserDirectoryError::DEPENDENCY,
                self.stores.users.find_by_id(user_id),
            )
            .await?
            .ok_or(AssignmentError::UserNotFound { user_id })
    }

    async fn ensure_department_code_free(
        &self,
        draft: &DepartmentDraft,
        except: Option<DepartmentId>,
    ) -> Result<(), AssignmentError> {
        let existing = self
            .policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.find_by_code(&draft.code),
            )
            .await?;
        match existing {
            Some(department) if Some(department.id) != except => Err(AssignmentError::conflict(
                format!("department code {} is already in use", draft.code),
            )),
            _ => Ok(()),
        }
    }

    async fn ensure_course_draft_valid(
        &self,
        draft: &CourseDraft,
        except: Option<CourseId>,
    ) -> Result<(), AssignmentError> {
        if let Some(department_id) = draft.department_id {
            self.require_department(department_id).await?;
        }
        let existing = self
            .policy
            .call(
                CourseRepositoryError::DEPENDENCY,
                self.stores.courses.find_by_code(&draft.code),
            )
            .await?;
        match existing {
            Some(course) if Some(course.id) != except => Err(AssignmentError::conflict(format!(
                "course code {} is already in use",
                draft.code
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogCommand for CatalogService {
    async fn create_department(
        &self,
        draft: DepartmentDraft,
    ) -> Result<Department, AssignmentError> {
        self.ensure_department_code_free(&draft, None).await?;
        let department = draft.into_department(DepartmentId::random());
        let created = self
            .policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.insert(&department),
            )
            .await?;
        info!(department_id = %created.id, code = %created.code, "department created");
        Ok(created)
    }

    async fn update_department(
        &self,
        id: DepartmentId,
        draft: DepartmentDraft,
    ) -> Result<Department, AssignmentError> {
        self.require_department(id).await?;
        self.ensure_department_code_free(&draft, Some(id)).await?;
        let department = draft.into_department(id);
        let updated = self
            .policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.update(&department),
            )
            .await?
            .ok_or_else(|| AssignmentError::DepartmentNotFound {
                department_ids: vec![id],
            })?;
        info!(department_id = %id, code = %updated.code, "department updated");
        Ok(updated)
    }

    async fn delete_department(&self, id: DepartmentId) -> Result<(), AssignmentError> {
        let deleted = self
            .policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.delete(id),
            )
            .await?;
        if !deleted {
            return Err(AssignmentError::DepartmentNotFound {
                department_ids: vec![id],
            });
        }
        info!(department_id = %id, "department deleted");
        Ok(())
    }

    async fn create_course(&self, draft: CourseDraft) -> Result<Course, AssignmentError> {
        self.ensure_course_draft_valid(&draft, None).await?;
        let course = draft.into_course(CourseId::random());
        let created = self
            .policy
            .call(
                CourseRepositoryError::DEPENDENCY,
                self.stores.courses.insert(&course),
            )
            .await?;
        info!(course_id = %created.id, code = %created.code, "course created");
        Ok(created)
    }

    async fn update_course(
        &self,
        id: CourseId,
        draft: CourseDraft,
    ) -> Result<Course, AssignmentError> {
        let mut course = self.require_course(id).await?;
        self.ensure_course_draft_valid(&draft, Some(id)).await?;
        draft.apply_to(&mut course);
        let updated = self
            .policy
            .call(
                CourseRepositoryError::DEPENDENCY,
                self.stores.courses.update(&course),
            )
            .await?
            .ok_or_else(|| AssignmentError::CourseNotFound {
                course_ids: vec![id],
            })?;
        info!(course_id = %id, code = %updated.code, "course updated");
        Ok(updated)
    }

    async fn backfill_course_departments(&self) -> Result<BackfillReport, AssignmentError> {
        let orphans = self
            .policy
            .call(
                CourseRepositoryError::DEPENDENCY,
                self.stores.courses.list(&CourseFilter::missing_department()),
            )
            .await?;
        if orphans.is_empty() {
            return Ok(BackfillReport::default());
        }
        let departments = self
            .policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.list(),
            )
            .await?;

        let mut report = BackfillReport::default();
        for course in orphans {
            match department_matcher::match_by_prefix(&course.code, &departments) {
                Some(department) => report.updated.push(BackfilledCourse {
                    course_id: course.id,
                    course_code: course.code,
                    department_id: department.id,
                    department_code: department.code.clone(),
                }),
                None => report.unmatched.push(course.code),
            }
        }

        let pairs: Vec<(CourseId, DepartmentId)> = report
            .updated
            .iter()
            .map(|entry| (entry.course_id, entry.department_id))
            .collect();
        if !pairs.is_empty() {
            let written = self
                .policy
                .call(
                    CourseRepositoryError::DEPENDENCY,
                    self.stores.courses.fill_missing_departments(&pairs),
                )
                .await?;
            info!(
                matched = pairs.len(),
                written,
                unmatched = report.unmatched.len(),
                "course departments backfilled"
            );
        }
        Ok(report)
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, AssignmentError> {
        if patch.is_empty() {
            return Err(AssignmentError::invalid_request(
                "patch must change at least one field",
            ));
        }
        if let Some(Some(department_id)) = patch.department_id {
            self.require_department(department_id).await?;
        }
        let updated = self
            .policy
            .call(
                UserDirectoryError::DEPENDENCY,
                self.stores.users.update(id, &patch),
            )
            .await?
            .ok_or(AssignmentError::UserNotFound { user_id: id })?;
        info!(user_id = %id, role = %updated.role, "directory user updated");
        Ok(updated)
    }

    async fn enroll(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<Enrollment, AssignmentError> {
        let student = self.require_user(student_id).await?;
        if student.role != Role::Student {
            return Err(AssignmentError::NotAStudent {
                user_id: student_id,
                role: student.role,
            });
        }
        self.require_course(course_id).await?;
        let enrollment = Enrollment {
            student_id,
            course_id,
            status: EnrollmentStatus::Active,
            grade: None,
            enrolled_at: self.clock.utc(),
        };
        let created = self
            .policy
            .call(
                EnrollmentRepositoryError::DEPENDENCY,
                self.stores.enrollments.insert(&enrollment),
            )
            .await?;
        info!(%student_id, %course_id, "student enrolled");
        Ok(created)
    }
}

#[async_trait]
impl CatalogQuery for CatalogService {
    async fn list_departments(&self) -> Result<Vec<Department>, AssignmentError> {
        self.policy
            .call(
                DepartmentRepositoryError::DEPENDENCY,
                self.stores.departments.list(),
            )
            .await
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AssignmentError> {
        self.policy
            .call(
                CourseRepositoryError::DEPENDENCY,
                self.stores.courses.list(filter),
            )
            .await
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, AssignmentError> {
        self.policy
            .call(
                UserDirectoryError::DEPENDENCY,
                self.stores.users.list(filter),
            )
            .await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, AssignmentError> {
        self.policy
            .call(UserDirectoryError::DEPENDENCY, self.stores.users.find_by_id(id))
            .await
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
