//! Persisted system settings.
//!
//! A single record shared by every server instance. Writers use optimistic
//! concurrency: each save names the revision it read and bumps it by one.

use chrono::{DateTime, Utc};

use super::{DepartmentCode, Semester, UserId};

/// Department code used by the best-effort matcher when no prefix matches.
pub const DEFAULT_DEPARTMENT_CODE: &str = "CS";

/// System-wide settings record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSettings {
    pub default_department_code: DepartmentCode,
    pub current_semester: Semester,
    pub current_year: i32,
    pub allow_self_enrollment: bool,
    /// Zero until the record is first saved.
    pub revision: u32,
    pub updated_by: Option<UserId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SystemSettings {
    /// Settings reported before anything has been stored.
    ///
    /// # Errors
    /// Never fails in practice; the default code is a valid literal.
    pub fn defaults(current_year: i32) -> Result<Self, super::CatalogValidationError> {
        Ok(Self {
            default_department_code: DepartmentCode::new(DEFAULT_DEPARTMENT_CODE)?,
            current_semester: Semester::Fall,
            current_year,
            allow_self_enrollment: false,
            revision: 0,
            updated_by: None,
            updated_at: None,
        })
    }
}

/// Partial settings update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub default_department_code: Option<DepartmentCode>,
    pub current_semester: Option<Semester>,
    pub current_year: Option<i32>,
    pub allow_self_enrollment: Option<bool>,
}

impl SettingsPatch {
    /// Apply the patch to `settings` without touching revision metadata.
    pub fn apply_to(&self, settings: &mut SystemSettings) {
        if let Some(code) = &self.default_department_code {
            settings.default_department_code = code.clone();
        }
        if let Some(semester) = self.current_semester {
            settings.current_semester = semester;
        }
        if let Some(year) = self.current_year {
            settings.current_year = year;
        }
        if let Some(allow) = self.allow_self_enrollment {
            settings.allow_self_enrollment = allow;
        }
    }
}
