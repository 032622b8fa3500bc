//! System settings handlers.
//!
//! ```text
//! GET /api/v1/settings
//! PUT /api/v1/settings {"expectedRevision":0,"currentSemester":"spring"}
//! ```

use actix_web::{get, put, web};
use tracing::info;

use crate::domain::ports::UpdateSettingsRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_actor, require_admin};
use crate::inbound::http::dto::{SettingsRequest, SettingsResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Current settings; defaults at revision 0 until first written.
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Settings", body = SettingsResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "getSettings"
)]
#[get("/settings")]
pub async fn get_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SettingsResponse>> {
    current_actor(&state, &session).await?;
    let settings = state.settings_query.fetch_settings().await?;
    Ok(web::Json(SettingsResponse::from(&settings)))
}

/// Update settings against the revision the caller last read.
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = SettingsRequest,
    responses(
        (status = 200, description = "Updated settings", body = SettingsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Stale revision", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "updateSettings"
)]
#[put("/settings")]
pub async fn update_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SettingsRequest>,
) -> ApiResult<web::Json<SettingsResponse>> {
    let actor = require_admin(&state, &session).await?;
    let (expected_revision, patch) = payload.into_inner().into_patch()?;
    let settings = state
        .settings
        .update_settings(UpdateSettingsRequest {
            patch,
            expected_revision,
            updated_by: actor.id,
        })
        .await?;
    info!(actor = %actor.id, revision = settings.revision, "settings changed via api");
    Ok(web::Json(SettingsResponse::from(&settings)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::inbound::http::test_utils::{TestCampus, api_app, login_as};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn defaults_are_served_at_revision_zero() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.cs_student).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/settings")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: SettingsResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.revision, 0);
        assert_eq!(body.default_department_code, "CS");
        assert_eq!(body.updated_by, None);
    }

    #[actix_web::test]
    async fn stale_revisions_conflict() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.admin).await;
        let update = |revision: u32| {
            actix_test::TestRequest::put()
                .uri("/api/v1/settings")
                .cookie(cookie.clone())
                .set_json(json!({
                    "expectedRevision": revision,
                    "currentSemester": "spring",
                }))
                .to_request()
        };

        let first = actix_test::call_service(&app, update(0)).await;
        assert_eq!(first.status(), StatusCode::OK);
        let saved: SettingsResponse = actix_test::read_body_json(first).await;
        assert_eq!(saved.revision, 1);
        assert_eq!(saved.current_semester, "spring");
        assert_eq!(saved.updated_by, Some(*campus.admin.id.as_uuid()));

        let stale = actix_test::call_service(&app, update(0)).await;
        assert_eq!(stale.status(), StatusCode::CONFLICT);
        let body: Value = actix_test::read_body_json(stale).await;
        assert_eq!(body["details"]["actualRevision"], 1);
    }

    #[actix_web::test]
    async fn instructors_cannot_change_settings() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.instructor).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/api/v1/settings")
                .cookie(cookie)
                .set_json(json!({ "expectedRevision": 0, "allowSelfEnrollment": true }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
