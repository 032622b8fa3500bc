//! Test helpers for inbound HTTP components.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use async_trait::async_trait;

use crate::domain::ports::LoginService;
use crate::domain::service_fixtures::Campus;
use crate::domain::{Error, LoginCredentials, User, UserId};

use super::auth::current_actor;
use super::session::SessionContext;
use super::state::HttpState;

/// Password accepted for every seeded campus user.
pub const TEST_PASSWORD: &str = "password";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Login stub keyed by email; skips password hashing.
struct StubLoginService {
    users: HashMap<String, UserId>,
}

#[async_trait]
impl LoginService for StubLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        match self.users.get(credentials.email().as_ref()) {
            Some(id) if credentials.password() == TEST_PASSWORD => Ok(*id),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}

/// Seeded campus wired to real services over the in-memory store.
pub(crate) struct TestCampus(Campus);

impl Deref for TestCampus {
    type Target = Campus;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TestCampus {
    pub async fn seed() -> Self {
        Self(Campus::seed().await)
    }

    /// Handler state backed by the campus store.
    pub fn state(&self) -> HttpState {
        let users = [
            &self.admin,
            &self.instructor,
            &self.cs_student,
            &self.math_student,
        ]
        .into_iter()
        .map(|user| (user.email.as_ref().to_owned(), user.id))
        .collect();
        let catalog = Arc::new(self.catalog());
        let settings = Arc::new(self.settings());
        HttpState {
            login: Arc::new(StubLoginService { users }),
            catalog: catalog.clone(),
            catalog_query: catalog,
            assignments: Arc::new(self.assignments()),
            assignment_query: Arc::new(self.queries()),
            settings: settings.clone(),
            settings_query: settings,
        }
    }

    /// Obtain a session cookie for `user` through an app exposing
    /// [`session_probe_app`]'s forge route.
    pub async fn forged_session<S>(&self, app: &S, user_id: UserId) -> Cookie<'static>
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri(&format!("/test/session/{user_id}"))
                .to_request(),
        )
        .await;
        session_cookie(&res)
    }
}

/// Log `user` in through `POST /api/v1/login` and return the session cookie.
pub async fn login_as<S>(app: &S, user: &User) -> Cookie<'static>
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({
                "email": user.email.as_ref(),
                "password": TEST_PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    session_cookie(&res)
}

fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Full API surface under `/api/v1` with test session handling.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(super::configure))
}

/// Minimal app with a session forge route and a `/whoami` probe that
/// reports the caller's directory role.
pub fn session_probe_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route(
            "/test/session/{id}",
            web::post().to(
                |session: SessionContext, path: web::Path<String>| async move {
                    let id: UserId = path
                        .into_inner()
                        .parse()
                        .map_err(|_| Error::invalid_request("bad id"))?;
                    session.sign_in(&id)?;
                    Ok::<_, Error>(HttpResponse::Ok().finish())
                },
            ),
        )
        .route(
            "/whoami",
            web::get().to(
                |state: web::Data<HttpState>, session: SessionContext| async move {
                    let actor = current_actor(&state, &session).await?;
                    Ok::<_, Error>(HttpResponse::Ok().body(actor.role.as_str()))
                },
            ),
        )
}
