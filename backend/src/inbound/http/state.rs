//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AssignmentCommand, AssignmentQuery, CatalogCommand, CatalogQuery, LoginService,
    SettingsCommand, SettingsQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub catalog: Arc<dyn CatalogCommand>,
    pub catalog_query: Arc<dyn CatalogQuery>,
    pub assignments: Arc<dyn AssignmentCommand>,
    pub assignment_query: Arc<dyn AssignmentQuery>,
    pub settings: Arc<dyn SettingsCommand>,
    pub settings_query: Arc<dyn SettingsQuery>,
}
