//! Session guard for protected routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::debug;
use uuid::Uuid;

use crate::{error::TrackerError, state::AppState};

pub const SESSION_COOKIE: &str = "session_id";

/// The account resolved from the request's session
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

/// Resolve the session cookie to an account, or redirect to the login page
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, TrackerError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(TrackerError::Unauthorized)?;

    let user_id = state
        .sessions
        .get(&token)
        .await?
        .ok_or(TrackerError::Unauthorized)?;

    let Some(user) = state.users.find_by_id(user_id).await? else {
        debug!("Session points at missing user {}", user_id);
        state.sessions.clear(&token).await?;
        return Err(TrackerError::Unauthorized);
    };

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(req).await)
}
