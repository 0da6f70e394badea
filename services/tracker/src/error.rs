//! Error taxonomy of the tracker and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use thiserror::Error;
use tracing::error;

use crate::{
    auth::INVALID_CREDENTIALS,
    flash::{self, Flash},
    forms::FieldErrors,
    routes::LOGIN_PATH,
    views,
};

/// Errors surfaced by tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Missing or malformed form input
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// No interval with the requested id for this user
    #[error("not found")]
    NotFound,

    /// Unknown username or wrong password; the two are not told apart
    #[error("{}", INVALID_CREDENTIALS)]
    AuthenticationFailure,

    /// No valid session on a guarded route
    #[error("login required")]
    Unauthorized,

    /// Persistence or session backend failure, passed through unchanged
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Type alias for tracker results
pub type TrackerResult<T> = Result<T, TrackerError>;

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        match self {
            TrackerError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                views::error_page("Invalid input", &errors.to_string()),
            )
                .into_response(),
            TrackerError::NotFound => (
                StatusCode::NOT_FOUND,
                views::error_page("Not found", "The requested interval does not exist."),
            )
                .into_response(),
            TrackerError::AuthenticationFailure => (
                StatusCode::UNAUTHORIZED,
                views::error_page("Unauthorized", INVALID_CREDENTIALS),
            )
                .into_response(),
            TrackerError::Unauthorized => (
                flash::set(CookieJar::new(), Flash::LoginRequired),
                Redirect::to(LOGIN_PATH),
            )
                .into_response(),
            TrackerError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    views::error_page("Internal server error", "Please try again later."),
                )
                    .into_response()
            }
        }
    }
}
