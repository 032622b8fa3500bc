//! Caller resolution for HTTP handlers.
//!
//! The session only stores a user id. Every request re-reads the directory
//! record so a role change or deletion takes effect immediately.

use tracing::debug;

use crate::domain::{Actor, Error, User};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Load the directory record of the authenticated caller.
///
/// A session naming a user that no longer exists is purged and treated as
/// logged out.
pub async fn current_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let user_id = session.require_user_id()?;
    match state.catalog_query.find_user(user_id).await? {
        Some(user) => Ok(user),
        None => {
            debug!(%user_id, "session names a user that no longer exists");
            session.sign_out();
            Err(Error::unauthorized("login required"))
        }
    }
}

/// Resolve the authenticated caller.
pub async fn current_actor(state: &HttpState, session: &SessionContext) -> ApiResult<Actor> {
    current_user(state, session)
        .await
        .map(|user| Actor::from(&user))
}

/// Resolve the caller and require the administrator role.
pub async fn require_admin(state: &HttpState, session: &SessionContext) -> ApiResult<Actor> {
    let actor = current_actor(state, session).await?;
    actor.require_admin()?;
    Ok(actor)
}
