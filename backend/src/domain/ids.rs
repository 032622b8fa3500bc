//! UUID-backed identifiers for catalog and directory records.
//!
//! Each identifier is a distinct type so a department id can never be passed
//! where a course id is expected. They serialise as plain UUID strings.

use thiserror::Error;

/// Raised when a string does not parse as an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} id must be a valid UUID")]
pub struct InvalidIdError {
    kind: &'static str,
}

impl InvalidIdError {
    /// Entity label of the identifier that failed to parse.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = InvalidIdError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(value.trim())
                    .map(Self)
                    .map_err(|_| InvalidIdError { kind: $kind })
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(value: ::uuid::Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_uuid_id! {
    /// Identifier of a directory user (student, instructor or admin).
    UserId => "user"
}

define_uuid_id! {
    /// Identifier of a department.
    DepartmentId => "department"
}

define_uuid_id! {
    /// Identifier of a course.
    CourseId => "course"
}
