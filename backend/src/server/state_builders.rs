//! Builders wiring domain services onto the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use coursework::domain::ports::StorePorts;
use coursework::domain::{
    AssignmentQueryService, AssignmentService, CatalogService, DependencyPolicy, SettingsService,
};
use coursework::inbound::http::state::HttpState;
use coursework::outbound::auth::Argon2LoginService;

/// Build the handler state from the store adapters.
///
/// Every service shares the same stores, timeout policy and wall clock.
pub(crate) fn build_http_state(stores: &StorePorts, policy: DependencyPolicy) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let catalog = Arc::new(CatalogService::new(stores.clone(), policy, clock.clone()));
    let settings = Arc::new(SettingsService::new(stores.clone(), policy, clock.clone()));
    web::Data::new(HttpState {
        login: Arc::new(Argon2LoginService::new(stores.users.clone(), policy)),
        catalog: catalog.clone(),
        catalog_query: catalog,
        assignments: Arc::new(AssignmentService::new(stores.clone(), policy, clock.clone())),
        assignment_query: Arc::new(AssignmentQueryService::new(stores.clone(), policy, clock)),
        settings: settings.clone(),
        settings_query: settings,
    })
}
