//! HTTP routes of the tracker

use axum::{
    Extension, Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Local;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    auth::INVALID_CREDENTIALS,
    error::{TrackerError, TrackerResult},
    flash::{self, Flash},
    forms::{FieldErrors, IntervalForm, LoginForm},
    middleware::{CurrentUser, SESSION_COOKIE, require_session},
    state::AppState,
    views,
};

pub const LOGIN_PATH: &str = "/login/show";

/// Create the router for the tracker
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/", get(index))
        .route("/interval/toggle", post(toggle_interval))
        .route("/interval/edit/:id", get(edit_interval))
        .route("/interval/save/:id", post(save_interval))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route(LOGIN_PATH, get(show_login))
        .route("/login/check", post(check_login))
        .route("/login/disable", get(logout))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Interval ids that do not parse cannot exist
fn parse_id(raw: &str) -> TrackerResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| TrackerError::NotFound)
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.secure_cookies)
        .build()
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db_pool {
        Some(pool) => match common::database::health_check(pool).await {
            Ok(true) => "ok",
            Ok(false) => "unavailable",
            Err(e) => {
                error!("Database health check errored: {}", e);
                "unavailable"
            }
        },
        None => "not configured",
    };

    let (status, label) = if database == "unavailable" {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "flowtime",
            "database": database,
        })),
    )
}

pub async fn show_login(jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    (
        jar,
        views::login_page(flash, &LoginForm::default(), &FieldErrors::default(), None),
    )
}

pub async fn check_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> TrackerResult<Response> {
    match state.authenticator.login(&form).await {
        Ok(user) => {
            if let Some(previous) = jar.get(SESSION_COOKIE) {
                state.sessions.clear(previous.value()).await?;
            }

            let token = state.sessions.create(user.id).await?;
            let jar = jar.add(session_cookie(&state, token));
            Ok((flash::set(jar, Flash::LoggedIn), Redirect::to("/")).into_response())
        }
        Err(TrackerError::Validation(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            views::login_page(None, &form, &errors, None),
        )
            .into_response()),
        Err(TrackerError::AuthenticationFailure) => Ok((
            StatusCode::UNAUTHORIZED,
            views::login_page(
                None,
                &form,
                &FieldErrors::default(),
                Some(INVALID_CREDENTIALS),
            ),
        )
            .into_response()),
        Err(e) => Err(e),
    }
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> TrackerResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.clear(cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((flash::set(jar, Flash::LoggedOut), Redirect::to(LOGIN_PATH)))
}

pub async fn index(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> TrackerResult<impl IntoResponse> {
    let summary = state.tracker.daily_summary(user.id).await?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, views::index_page(&user, &summary, flash)))
}

pub async fn toggle_interval(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> TrackerResult<impl IntoResponse> {
    let interval = state.tracker.toggle(user.id).await?;
    let flash = if interval.is_open() {
        Flash::ClockedIn
    } else {
        Flash::ClockedOut
    };
    Ok((flash::set(jar, flash), Redirect::to("/")))
}

pub async fn edit_interval(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> TrackerResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let interval = state.tracker.find_interval(user.id, id).await?;
    let form = IntervalForm::from_interval(&interval, &Local);

    let (jar, flash) = flash::take(jar);
    Ok((jar, views::edit_page(id, &form, &FieldErrors::default(), flash)))
}

pub async fn save_interval(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<IntervalForm>,
) -> TrackerResult<Response> {
    let id = parse_id(&id)?;
    state.tracker.find_interval(user.id, id).await?;

    match form.validate(&Local) {
        Ok(edit) => {
            state.tracker.edit_interval(user.id, id, edit).await?;
            Ok((flash::set(jar, Flash::IntervalSaved), Redirect::to("/")).into_response())
        }
        Err(TrackerError::Validation(errors)) => {
            debug!("Rejected edit of interval {}: {}", id, errors);
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                views::edit_page(id, &form, &errors, None),
            )
                .into_response())
        }
        Err(e) => Err(e),
    }
}
