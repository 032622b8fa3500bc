//! Driving port for instructor assignment writes.
//!
//! Inbound adapters call [`AssignmentCommand`] to link instructors to
//! departments and courses. Implementations validate the whole request
//! before writing anything; append-mode batches then report an outcome per
//! requested id.

use async_trait::async_trait;

use crate::domain::{
    AssignmentError, AssignmentOptions, CourseAssignment, CourseId, DepartmentAssignment,
    DepartmentId, UserId,
};

/// Request to link an instructor to departments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignDepartmentsRequest {
    pub instructor_id: UserId,
    pub department_ids: Vec<DepartmentId>,
    pub options: AssignmentOptions,
}

/// Request to make an instructor the owner of courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignCoursesRequest {
    pub instructor_id: UserId,
    pub course_ids: Vec<CourseId>,
    pub options: AssignmentOptions,
}

/// Result of writing one requested link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome<L> {
    /// The link was written.
    Assigned(L),
    /// The write failed; other items may still have succeeded.
    Failed(AssignmentError),
}

/// Outcome for one requested id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult<Id, L> {
    pub id: Id,
    pub outcome: ItemOutcome<L>,
}

/// Report returned by the assign operations.
///
/// Replace-mode reports never contain failures: the batch either committed
/// as a whole or the operation returned an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentReport<Id, L> {
    pub instructor_id: UserId,
    pub replaced_existing: bool,
    pub items: Vec<ItemResult<Id, L>>,
}

impl<Id, L> AssignmentReport<Id, L> {
    /// Links that were written.
    pub fn assigned(&self) -> impl Iterator<Item = &L> {
        self.items.iter().filter_map(|item| match &item.outcome {
            ItemOutcome::Assigned(link) => Some(link),
            ItemOutcome::Failed(_) => None,
        })
    }

    /// Number of items that failed.
    pub fn failed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, ItemOutcome::Failed(_)))
            .count()
    }
}

/// Report for department assignment.
pub type DepartmentAssignmentReport = AssignmentReport<DepartmentId, DepartmentAssignment>;

/// Report for course assignment.
pub type CourseAssignmentReport = AssignmentReport<CourseId, CourseAssignment>;

/// Driving port for assignment writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentCommand: Send + Sync {
    /// Link an instructor to departments.
    ///
    /// # Errors
    ///
    /// Fails without writing when the instructor is missing or cannot teach,
    /// when any department is missing, or when the id list is empty.
    async fn assign_departments(
        &self,
        request: AssignDepartmentsRequest,
    ) -> Result<DepartmentAssignmentReport, AssignmentError>;

    /// Make an instructor the owner of courses.
    ///
    /// # Errors
    ///
    /// Fails without writing when any course is missing or belongs to a
    /// department the instructor is not linked to.
    async fn assign_courses(
        &self,
        request: AssignCoursesRequest,
    ) -> Result<CourseAssignmentReport, AssignmentError>;

    /// Remove one department link, or all of them when `department_id` is
    /// `None`. Returns the number of links removed.
    async fn unassign_department(
        &self,
        instructor_id: UserId,
        department_id: Option<DepartmentId>,
    ) -> Result<usize, AssignmentError>;

    /// Release one owned course, or all of them when `course_id` is `None`.
    /// Released courses become unassigned.
    async fn unassign_course(
        &self,
        instructor_id: UserId,
        course_id: Option<CourseId>,
    ) -> Result<usize, AssignmentError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;

    #[test]
    fn report_counts_failures_and_lists_assigned_links() {
        let instructor_id = UserId::random();
        let ok = DepartmentId::random();
        let link = DepartmentAssignment {
            instructor_id,
            department_id: ok,
            is_primary: true,
            assigned_by: None,
            assigned_at: Utc::now(),
        };
        let report = DepartmentAssignmentReport {
            instructor_id,
            replaced_existing: false,
            items: vec![
                ItemResult {
                    id: ok,
                    outcome: ItemOutcome::Assigned(link.clone()),
                },
                ItemResult {
                    id: DepartmentId::random(),
                    outcome: ItemOutcome::Failed(AssignmentError::conflict("boom")),
                },
            ],
        };
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.assigned().collect::<Vec<_>>(), vec![&link]);
    }
}
