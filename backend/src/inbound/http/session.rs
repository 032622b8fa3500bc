//! Cookie session access for handlers.
//!
//! The encrypted cookie carries one value: the signed-in user's id. Roles
//! are never cached in the cookie; see [`super::auth`].

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "uid";

/// Handler-facing view of the request's cookie session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Record `user_id` as signed in and rotate the cookie.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|err| Error::internal(format!("session write failed: {err}")))
    }

    /// Forget the caller and expire the cookie.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// The signed-in user id, or `None` for anonymous callers.
    ///
    /// An unparsable id is treated as anonymous.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|err| Error::internal(format!("session read failed: {err}")))?;
        Ok(raw.and_then(|value| {
            value
                .parse::<UserId>()
                .inspect_err(|err| warn!(error = %err, "discarding malformed session user id"))
                .ok()
        }))
    }

    /// The signed-in user id or `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.get_session())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    const ADA: &str = "5b0c6f0e-8d1f-4a57-9a55-3e1f7c2b9d10";

    async fn sign_in(session: SessionContext, path: web::Path<String>) -> Result<HttpResponse, Error> {
        let id: UserId = path.parse().map_err(|_| Error::invalid_request("bad id"))?;
        session.sign_in(&id)?;
        Ok(HttpResponse::NoContent().finish())
    }

    async fn sign_out(session: SessionContext) -> HttpResponse {
        session.sign_out();
        HttpResponse::NoContent().finish()
    }

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user_id()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    async fn plant(session: actix_session::Session, path: web::Path<String>) -> HttpResponse {
        session
            .insert(USER_ID_KEY, path.into_inner())
            .expect("raw session write");
        HttpResponse::NoContent().finish()
    }

    fn probe() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route("/sign-in/{id}", web::post().to(sign_in))
            .route("/plant/{raw}", web::post().to(plant))
            .route("/sign-out", web::post().to(sign_out))
            .route("/whoami", web::get().to(whoami))
    }

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn signed_in_user_is_read_back() {
        let app = test::init_service(probe()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/sign-in/{ADA}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(session_cookie(&res))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, ADA);
    }

    #[actix_web::test]
    async fn signing_out_expires_the_cookie() {
        let app = test::init_service(probe()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/sign-in/{ADA}"))
                .to_request(),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/sign-out")
                .cookie(session_cookie(&res))
                .to_request(),
        )
        .await;

        assert_eq!(session_cookie(&res).value(), "");
    }

    #[rstest]
    #[case::anonymous(None)]
    #[case::malformed(Some("registrar"))]
    #[actix_web::test]
    async fn unknown_callers_are_unauthorised(#[case] planted: Option<&str>) {
        let app = test::init_service(probe()).await;
        let mut request = test::TestRequest::get().uri("/whoami");
        if let Some(raw) = planted {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri(&format!("/plant/{raw}"))
                    .to_request(),
            )
            .await;
            request = request.cookie(session_cookie(&res));
        }

        let res = test::call_service(&app, request.to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
