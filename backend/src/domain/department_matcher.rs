//! Best-effort department matcher.
//!
//! Guesses a course's department from its code: the longest department code
//! that prefixes the course code wins. This is a heuristic, not a guarantee.
//! `Course::department_id` is the source of truth; the matcher only serves
//! the `departmentFor` lookup and the one-off backfill of courses recorded
//! without a department.

use super::{CourseCode, Department, DepartmentCode};

/// How a department was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    /// A department code prefixes the course code.
    Prefix,
    /// Nothing matched; the configured default department was used.
    Fallback,
}

impl MatchSource {
    /// Stable lowercase label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Fallback => "fallback",
        }
    }
}

/// Department picked by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentMatch {
    pub department: Department,
    pub source: MatchSource,
}

/// Longest department code that prefixes `course_code`.
///
/// Codes are unique, so two candidates of equal length cannot both match.
pub fn match_by_prefix<'a>(
    course_code: &CourseCode,
    departments: &'a [Department],
) -> Option<&'a Department> {
    departments
        .iter()
        .filter(|department| course_code.as_ref().starts_with(department.code.as_ref()))
        .max_by_key(|department| department.code.len())
}

/// Prefix match with the default department as the fallback.
///
/// Returns `None` when neither a prefix nor the default department exists.
pub fn best_effort_department(
    course_code: &CourseCode,
    departments: &[Department],
    default_code: &DepartmentCode,
) -> Option<DepartmentMatch> {
    if let Some(department) = match_by_prefix(course_code, departments) {
        return Some(DepartmentMatch {
            department: department.clone(),
            source: MatchSource::Prefix,
        });
    }
    departments
        .iter()
        .find(|department| &department.code == default_code)
        .map(|department| DepartmentMatch {
            department: department.clone(),
            source: MatchSource::Fallback,
        })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{CatalogName, DepartmentId};
    use rstest::{fixture, rstest};

    fn department(code: &str) -> Department {
        Department {
            id: DepartmentId::random(),
            code: DepartmentCode::new(code).expect("code"),
            name: CatalogName::new(code).expect("name"),
            description: None,
        }
    }

    #[fixture]
    fn departments() -> Vec<Department> {
        vec![department("CS"), department("CSE"), department("MATH")]
    }

    fn code(raw: &str) -> CourseCode {
        CourseCode::new(raw).expect("course code")
    }

    #[rstest]
    #[case("CS101", "CS")]
    #[case("cse210", "CSE")]
    #[case("MATH201", "MATH")]
    fn longest_prefix_wins(
        departments: Vec<Department>,
        #[case] course: &str,
        #[case] expected: &str,
    ) {
        let matched = match_by_prefix(&code(course), &departments).expect("match");
        assert_eq!(matched.code.as_ref(), expected);
    }

    #[rstest]
    fn unmatched_codes_fall_back(departments: Vec<Department>) {
        let fallback = DepartmentCode::new("CS").expect("code");
        let matched =
            best_effort_department(&code("HIST100"), &departments, &fallback).expect("fallback");
        assert_eq!(matched.source, MatchSource::Fallback);
        assert_eq!(matched.department.code.as_ref(), "CS");
    }

    #[rstest]
    fn prefix_matches_report_their_source(departments: Vec<Department>) {
        let fallback = DepartmentCode::new("CS").expect("code");
        let matched =
            best_effort_department(&code("MATH9"), &departments, &fallback).expect("match");
        assert_eq!(matched.source, MatchSource::Prefix);
    }

    #[rstest]
    fn missing_fallback_department_yields_none(departments: Vec<Department>) {
        let fallback = DepartmentCode::new("BIO").expect("code");
        assert!(best_effort_department(&code("HIST100"), &departments, &fallback).is_none());
    }
}
