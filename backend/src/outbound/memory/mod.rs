//! In-process catalog and directory store.
//!
//! Implements every driven port over a single mutex-guarded state so that
//! multi-record writes (replace-existing batches, ownership moves, cascades)
//! apply atomically. The server falls back to it when no database URL is
//! configured, and the service and behavioural tests run against it.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    CourseRepository, CourseRepositoryError, DepartmentRepository, DepartmentRepositoryError,
    EnrollmentRepository, EnrollmentRepositoryError, InstructorAssignmentRepository,
    InstructorAssignmentRepositoryError, SettingsRepository, SettingsRepositoryError,
    UserDirectory, UserDirectoryError,
};
use crate::domain::{
    Course, CourseAssignment, CourseCode, CourseFilter, CourseId, Department, DepartmentAssignment,
    DepartmentCode, DepartmentId, EmailAddress, EnrolledCourse, Enrollment, NewUser, Role,
    StoredCredentials, SystemSettings, User, UserFilter, UserId, UserPatch,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, StoredUser>,
    departments: BTreeMap<DepartmentId, Department>,
    courses: BTreeMap<CourseId, Course>,
    department_links: Vec<DepartmentAssignment>,
    course_links: Vec<CourseAssignment>,
    enrollments: Vec<Enrollment>,
    settings: Option<SystemSettings>,
}

impl State {
    fn code_taken(&self, code: &DepartmentCode, except: Option<DepartmentId>) -> bool {
        self.departments
            .values()
            .any(|department| &department.code == code && Some(department.id) != except)
    }

    fn course_code_taken(&self, code: &CourseCode, except: Option<CourseId>) -> bool {
        self.courses
            .values()
            .any(|course| &course.code == code && Some(course.id) != except)
    }

    /// Give `link.course_id` to `link.instructor_id`, dropping other owners.
    fn take_ownership(&mut self, link: &CourseAssignment) {
        self.course_links.retain(|existing| {
            existing.course_id != link.course_id || existing.instructor_id == link.instructor_id
        });
        match self.course_links.iter_mut().find(|existing| {
            existing.course_id == link.course_id && existing.instructor_id == link.instructor_id
        }) {
            Some(existing) => *existing = link.clone(),
            None => self.course_links.push(link.clone()),
        }
        if let Some(course) = self.courses.get_mut(&link.course_id) {
            course.instructor_id = Some(link.instructor_id);
        }
    }

    /// Drop the instructor's links for the matching courses and clear
    /// ownership on them.
    fn release_courses(&mut self, instructor_id: UserId, course_id: Option<CourseId>) -> usize {
        let mut released = Vec::new();
        self.course_links.retain(|link| {
            let matches = link.instructor_id == instructor_id
                && course_id.is_none_or(|id| id == link.course_id);
            if matches {
                released.push(link.course_id);
            }
            !matches
        });
        for course in self
            .courses
            .values_mut()
            .filter(|course| released.contains(&course.id))
        {
            if course.instructor_id == Some(instructor_id) {
                course.instructor_id = None;
            }
        }
        released.len()
    }
}

/// Store holding every catalog and directory record in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a directory user without a password.
    pub fn seed_user(&self, user: User) {
        self.lock().users.insert(
            user.id,
            StoredUser {
                user,
                password_hash: None,
            },
        );
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserDirectoryError> {
        Ok(self.lock().users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|stored| &stored.user.email == email)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserDirectoryError> {
        Ok(self.lock().users.values().find_map(|stored| {
            let hash = stored.password_hash.as_ref()?;
            (&stored.user.email == email).then(|| StoredCredentials {
                user_id: stored.user.id,
                password_hash: hash.clone(),
            })
        }))
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserDirectoryError> {
        let mut users: Vec<User> = self
            .lock()
            .users
            .values()
            .filter(|stored| filter.matches(&stored.user))
            .map(|stored| stored.user.clone())
            .collect();
        users.sort_by(|a, b| a.email.as_ref().cmp(b.email.as_ref()));
        Ok(users)
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserDirectoryError> {
        let mut state = self.lock();
        Ok(state.users.get_mut(&id).map(|stored| {
            patch.apply_to(&mut stored.user);
            stored.user.clone()
        }))
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, UserDirectoryError> {
        let mut state = self.lock();
        if state
            .users
            .values()
            .any(|stored| stored.user.email == new_user.user.email)
        {
            return Err(UserDirectoryError::duplicate_email(
                new_user.user.email.as_ref(),
            ));
        }
        state.users.insert(
            new_user.user.id,
            StoredUser {
                user: new_user.user.clone(),
                password_hash: Some(new_user.password_hash.clone()),
            },
        );
        Ok(new_user.user.clone())
    }

    async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<bool, UserDirectoryError> {
        let mut state = self.lock();
        Ok(state
            .users
            .get_mut(&id)
            .map(|stored| stored.password_hash = Some(password_hash.to_owned()))
            .is_some())
    }

    async fn count_admins(&self) -> Result<u64, UserDirectoryError> {
        let count = self
            .lock()
            .users
            .values()
            .filter(|stored| stored.user.role == Role::Admin)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Department>, DepartmentRepositoryError> {
        let mut departments: Vec<Department> = self.lock().departments.values().cloned().collect();
        departments.sort_by(|a, b| a.code.as_ref().cmp(b.code.as_ref()));
        Ok(departments)
    }

    async fn find_by_ids(
        &self,
        ids: &[DepartmentId],
    ) -> Result<Vec<Department>, DepartmentRepositoryError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.departments.get(id).cloned())
            .collect())
    }

    async fn find_by_code(
        &self,
        code: &DepartmentCode,
    ) -> Result<Option<Department>, DepartmentRepositoryError> {
        Ok(self
            .lock()
            .departments
            .values()
            .find(|department| &department.code == code)
            .cloned())
    }

    async fn insert(
        &self,
        department: &Department,
    ) -> Result<Department, DepartmentRepositoryError> {
        let mut state = self.lock();
        if state.code_taken(&department.code, None) {
            return Err(DepartmentRepositoryError::duplicate_code(
                department.code.as_ref(),
            ));
        }
        state.departments.insert(department.id, department.clone());
        Ok(department.clone())
    }

    async fn update(
        &self,
        department: &Department,
    ) -> Result<Option<Department>, DepartmentRepositoryError> {
        let mut state = self.lock();
        if !state.departments.contains_key(&department.id) {
            return Ok(None);
        }
        if state.code_taken(&department.code, Some(department.id)) {
            return Err(DepartmentRepositoryError::duplicate_code(
                department.code.as_ref(),
            ));
        }
        state.departments.insert(department.id, department.clone());
        Ok(Some(department.clone()))
    }

    async fn delete(&self, id: DepartmentId) -> Result<bool, DepartmentRepositoryError> {
        let mut state = self.lock();
        if state.departments.remove(&id).is_none() {
            return Ok(false);
        }
        for course in state.courses.values_mut() {
            if course.department_id == Some(id) {
                course.department_id = None;
            }
        }
        for stored in state.users.values_mut() {
            if stored.user.department_id == Some(id) {
                stored.user.department_id = None;
            }
        }
        state.department_links.retain(|link| link.department_id != id);
        Ok(true)
    }
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut courses: Vec<Course> = self
            .lock()
            .courses
            .values()
            .filter(|course| filter.matches(course))
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.code.as_ref().cmp(b.code.as_ref()));
        Ok(courses)
    }

    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, CourseRepositoryError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.courses.get(id).cloned())
            .collect())
    }

    async fn find_by_code(
        &self,
        code: &CourseCode,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(self
            .lock()
            .courses
            .values()
            .find(|course| &course.code == code)
            .cloned())
    }

    async fn insert(&self, course: &Course) -> Result<Course, CourseRepositoryError> {
        let mut state = self.lock();
        if state.course_code_taken(&course.code, None) {
            return Err(CourseRepositoryError::duplicate_code(course.code.as_ref()));
        }
        state.courses.insert(course.id, course.clone());
        Ok(course.clone())
    }

    async fn update(&self, course: &Course) -> Result<Option<Course>, CourseRepositoryError> {
        let mut state = self.lock();
        let Some(instructor_id) = state.courses.get(&course.id).map(|c| c.instructor_id) else {
            return Ok(None);
        };
        if state.course_code_taken(&course.code, Some(course.id)) {
            return Err(CourseRepositoryError::duplicate_code(course.code.as_ref()));
        }
        let stored = Course {
            instructor_id,
            ..course.clone()
        };
        state.courses.insert(course.id, stored.clone());
        Ok(Some(stored))
    }

    async fn fill_missing_departments(
        &self,
        assignments: &[(CourseId, DepartmentId)],
    ) -> Result<usize, CourseRepositoryError> {
        let mut state = self.lock();
        let mut updated = 0;
        for (course_id, department_id) in assignments {
            if !state.departments.contains_key(department_id) {
                continue;
            }
            let Some(course) = state.courses.get_mut(course_id) else {
                continue;
            };
            if course.department_id.is_none() {
                course.department_id = Some(*department_id);
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl InstructorAssignmentRepository for InMemoryStore {
    async fn department_links(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<DepartmentAssignment>, InstructorAssignmentRepositoryError> {
        Ok(self
            .lock()
            .department_links
            .iter()
            .filter(|link| link.instructor_id == instructor_id)
            .cloned()
            .collect())
    }

    async fn upsert_department_link(
        &self,
        link: &DepartmentAssignment,
    ) -> Result<DepartmentAssignment, InstructorAssignmentRepositoryError> {
        let mut state = self.lock();
        if !state.departments.contains_key(&link.department_id) {
            return Err(InstructorAssignmentRepositoryError::query(format!(
                "department {} does not exist",
                link.department_id
            )));
        }
        match state.department_links.iter_mut().find(|existing| {
            existing.instructor_id == link.instructor_id
                && existing.department_id == link.department_id
        }) {
            Some(existing) => *existing = link.clone(),
            None => state.department_links.push(link.clone()),
        }
        Ok(link.clone())
    }

    async fn replace_department_links(
        &self,
        instructor_id: UserId,
        links: &[DepartmentAssignment],
    ) -> Result<Vec<DepartmentAssignment>, InstructorAssignmentRepositoryError> {
        let mut state = self.lock();
        if let Some(missing) = links
            .iter()
            .find(|link| !state.departments.contains_key(&link.department_id))
        {
            return Err(InstructorAssignmentRepositoryError::query(format!(
                "department {} does not exist",
                missing.department_id
            )));
        }
        state
            .department_links
            .retain(|link| link.instructor_id != instructor_id);
        state.department_links.extend_from_slice(links);
        Ok(links.to_vec())
    }

    async fn remove_department_links(
        &self,
        instructor_id: UserId,
        department_id: Option<DepartmentId>,
    ) -> Result<usize, InstructorAssignmentRepositoryError> {
        let mut state = self.lock();
        let before = state.department_links.len();
        state.department_links.retain(|link| {
            link.instructor_id != instructor_id
                || department_id.is_some_and(|id| id != link.department_id)
        });
        Ok(before - state.department_links.len())
    }

    async fn course_links(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<CourseAssignment>, InstructorAssignmentRepositoryError> {
        Ok(self
            .lock()
            .course_links
            .iter()
            .filter(|link| link.instructor_id == instructor_id)
            .cloned()
            .collect())
    }

    async fn upsert_course_link(
        &self,
        link: &CourseAssignment,
    ) -> Result<CourseAssignment, InstructorAssignmentRepositoryError> {
        let mut state = self.lock();
        if !state.courses.contains_key(&link.course_id) {
            return Err(InstructorAssignmentRepositoryError::query(format!(
                "course {} does not exist",
                link.course_id
            )));
        }
        state.take_ownership(link);
        Ok(link.clone())
    }

    async fn replace_course_links(
        &self,
        instructor_id: UserId,
        links: &[CourseAssignment],
    ) -> Result<Vec<CourseAssignment>, InstructorAssignmentRepositoryError> {
        let mut state = self.lock();
        if let Some(missing) = links
            .iter()
            .find(|link| !state.courses.contains_key(&link.course_id))
        {
            return Err(InstructorAssignmentRepositoryError::query(format!(
                "course {} does not exist",
                missing.course_id
            )));
        }
        state.release_courses(instructor_id, None);
        for link in links {
            state.take_ownership(link);
        }
        Ok(links.to_vec())
    }

    async fn remove_course_links(
        &self,
        instructor_id: UserId,
        course_id: Option<CourseId>,
    ) -> Result<usize, InstructorAssignmentRepositoryError> {
        Ok(self.lock().release_courses(instructor_id, course_id))
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    async fn list_for_students(
        &self,
        student_ids: &[UserId],
    ) -> Result<Vec<EnrolledCourse>, EnrollmentRepositoryError> {
        let state = self.lock();
        let mut rows: Vec<EnrolledCourse> = state
            .enrollments
            .iter()
            .filter(|enrollment| student_ids.contains(&enrollment.student_id))
            .filter_map(|enrollment| {
                let course = state.courses.get(&enrollment.course_id)?;
                Some(EnrolledCourse {
                    student_id: enrollment.student_id,
                    course_id: course.id,
                    code: course.code.clone(),
                    name: course.name.clone(),
                    status: enrollment.status,
                    grade: enrollment.grade.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            a.student_id
                .cmp(&b.student_id)
                .then_with(|| a.code.as_ref().cmp(b.code.as_ref()))
        });
        Ok(rows)
    }

    async fn insert(
        &self,
        enrollment: &Enrollment,
    ) -> Result<Enrollment, EnrollmentRepositoryError> {
        let mut state = self.lock();
        if state.enrollments.iter().any(|existing| {
            existing.student_id == enrollment.student_id
                && existing.course_id == enrollment.course_id
        }) {
            return Err(EnrollmentRepositoryError::duplicate());
        }
        state.enrollments.push(enrollment.clone());
        Ok(enrollment.clone())
    }
}

#[async_trait]
impl SettingsRepository for InMemoryStore {
    async fn load(&self) -> Result<Option<SystemSettings>, SettingsRepositoryError> {
        Ok(self.lock().settings.clone())
    }

    async fn save(
        &self,
        settings: &SystemSettings,
        expected_revision: u32,
    ) -> Result<(), SettingsRepositoryError> {
        let mut state = self.lock();
        let actual = state.settings.as_ref().map_or(0, |stored| stored.revision);
        if actual != expected_revision {
            return Err(SettingsRepositoryError::revision_mismatch(
                expected_revision,
                actual,
            ));
        }
        state.settings = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests;
