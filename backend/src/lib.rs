//! Coursework backend library modules.
//!
//! Keeps instructor department and course assignments consistent with the
//! catalog and derives which students an instructor may see.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
