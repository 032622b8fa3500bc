//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed stores using Diesel ORM
//! - **memory**: in-process store used when no database is configured and in
//!   tests
//! - **auth**: Argon2 password hashing and the login adapter
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod auth;
pub mod memory;
pub mod persistence;
