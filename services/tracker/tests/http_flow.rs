//! End-to-end checks of the HTTP surface against the in-memory backend

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use rstest::{fixture, rstest};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use tracker::{
    AppState,
    clock::FixedClock,
    config::AppConfig,
    models::NewUser,
    repositories::{
        InMemoryIntervalRepository, InMemoryUserRepository, IntervalRepository, UserRepository,
    },
    routes::create_router,
    session::InMemorySessionStore,
};

struct TestApp {
    router: Router,
    intervals: Arc<InMemoryIntervalRepository>,
    clock: Arc<FixedClock>,
    user_id: Uuid,
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, cookies: &str) -> Response {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookies)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn post_form(&self, uri: &str, cookies: &str, form: &str) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::COOKIE, cookies)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Log in as alice and return the session cookie
    async fn login(&self) -> String {
        let response = self
            .post_form("/login/check", "", "username=alice&password=secret")
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let session = set_cookies(&response)
            .into_iter()
            .find(|(name, _)| name == "session_id")
            .expect("session cookie");
        format!("{}={}", session.0, session.1)
    }

    async fn interval_count(&self) -> u64 {
        self.intervals.count_for_owner(self.user_id).await.unwrap()
    }
}

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Non-empty cookies set by a response
fn set_cookies(response: &Response) -> Vec<(String, String)> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| {
            let pair = value.to_str().ok()?.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            (!value.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}

fn flash_of(response: &Response) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|(name, _)| name == "flash")
        .map(|(_, value)| value)
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[fixture]
async fn app() -> TestApp {
    let intervals = Arc::new(InMemoryIntervalRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let clock = Arc::new(FixedClock::new(at("2011-04-04T08:00:00Z")));

    let user = users
        .create(&NewUser {
            username: "alice".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    let state = AppState::new(
        intervals.clone(),
        users,
        Arc::new(InMemorySessionStore::new()),
        clock.clone(),
        AppConfig::default(),
    );

    TestApp {
        router: create_router(state),
        intervals,
        clock,
        user_id: user.id,
    }
}

#[rstest]
#[tokio::test]
async fn test_health_reports_ok_without_database(#[future] app: TestApp) {
    let app = app.await;
    let response = app.get("/health", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "flowtime");
}

#[rstest]
#[tokio::test]
async fn test_login_form_is_public(#[future] app: TestApp) {
    let app = app.await;
    let response = app.get("/login/show", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"action="/login/check""#));
}

#[rstest]
#[tokio::test]
async fn test_successful_login_redirects_home_with_flash(#[future] app: TestApp) {
    let app = app.await;
    let response = app
        .post_form("/login/check", "", "username=alice&password=secret")
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(flash_of(&response).as_deref(), Some("logged_in"));

    let cookies = set_cookies(&response)
        .into_iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ");
    let response = app.get("/", &cookies).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("logged in successfully."));
    assert!(body.contains("not working"));
    assert!(body.contains("0:00:00"));
}

#[rstest]
#[case("username=alice&password=wrong")]
#[case("username=bob&password=secret")]
#[tokio::test]
async fn test_bad_credentials_are_rejected(#[future] app: TestApp, #[case] form: &str) {
    let app = app.await;
    let response = app.post_form("/login/check", "", form).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    assert!(body_text(response).await.contains("user/pw invalid."));
}

#[rstest]
#[case("username=&password=secret")]
#[case("username=alice&password=")]
#[case("")]
#[tokio::test]
async fn test_missing_fields_are_required(#[future] app: TestApp, #[case] form: &str) {
    let app = app.await;
    let response = app.post_form("/login/check", "", form).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("This field is required."));
    assert!(!body.contains("user/pw invalid."));
}

#[rstest]
#[case("/")]
#[case("/interval/edit/00000000-0000-0000-0000-000000000000")]
#[tokio::test]
async fn test_guarded_pages_redirect_to_login(#[future] app: TestApp, #[case] uri: &str) {
    let app = app.await;

    for cookies in ["", "session_id=forged"] {
        let response = app.get(uri, cookies).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login/show");
        assert_eq!(flash_of(&response).as_deref(), Some("login_required"));
    }
}

#[rstest]
#[tokio::test]
async fn test_toggle_without_session_creates_nothing(#[future] app: TestApp) {
    let app = app.await;
    let response = app.post_form("/interval/toggle", "", "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login/show");
    assert_eq!(app.interval_count().await, 0);
}

#[rstest]
#[tokio::test]
async fn test_toggling_clocks_in_and_out(#[future] app: TestApp) {
    let app = app.await;
    let session = app.login().await;

    let response = app.post_form("/interval/toggle", &session, "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(flash_of(&response).as_deref(), Some("clocked_in"));
    assert_eq!(app.interval_count().await, 1);

    let body = body_text(app.get("/", &session).await).await;
    assert!(body.contains(r#"<strong class="state">working</strong>"#));
    assert!(body.contains("running"));

    app.clock.advance(Duration::minutes(90));

    let response = app.post_form("/interval/toggle", &session, "").await;
    assert_eq!(flash_of(&response).as_deref(), Some("clocked_out"));
    assert_eq!(app.interval_count().await, 1);

    let body = body_text(app.get("/", &session).await).await;
    assert!(body.contains("not working"));
    assert!(body.contains(r#"<strong class="total">1:30:00</strong>"#));

    app.post_form("/interval/toggle", &session, "").await;
    assert_eq!(app.interval_count().await, 2);
}

#[rstest]
#[tokio::test]
async fn test_editing_unknown_intervals_is_not_found(#[future] app: TestApp) {
    let app = app.await;
    let session = app.login().await;

    let response = app
        .get(&format!("/interval/edit/{}", Uuid::new_v4()), &session)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/interval/edit/not-an-id", &session).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_form(
            &format!("/interval/save/{}", Uuid::new_v4()),
            &session,
            "start=2011-04-04+08%3A00%3A00&stop=",
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_editing_an_interval_updates_it_in_place(#[future] app: TestApp) {
    let app = app.await;
    let session = app.login().await;

    app.post_form("/interval/toggle", &session, "").await;
    let interval = app
        .intervals
        .find_most_recent(app.user_id)
        .await
        .unwrap()
        .unwrap();

    let response = app
        .get(&format!("/interval/edit/{}", interval.id), &session)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"name="start""#));

    let response = app
        .post_form(
            &format!("/interval/save/{}", interval.id),
            &session,
            "start=2011-04-04+07%3A00%3A00&stop=2011-04-04+07%3A45%3A00",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(flash_of(&response).as_deref(), Some("interval_saved"));
    assert_eq!(app.interval_count().await, 1);

    let saved = app.intervals.find_by_id(interval.id).await.unwrap().unwrap();
    assert_eq!(saved.duration(), Duration::minutes(45));
}

#[rstest]
#[tokio::test]
async fn test_invalid_edits_are_rerendered(#[future] app: TestApp) {
    let app = app.await;
    let session = app.login().await;

    app.post_form("/interval/toggle", &session, "").await;
    let interval = app
        .intervals
        .find_most_recent(app.user_id)
        .await
        .unwrap()
        .unwrap();

    let response = app
        .post_form(
            &format!("/interval/save/{}", interval.id),
            &session,
            "start=yesterday&stop=",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Not a valid datetime value."));

    let unchanged = app.intervals.find_by_id(interval.id).await.unwrap().unwrap();
    assert_eq!(unchanged, interval);
}

#[rstest]
#[tokio::test]
async fn test_logout_ends_the_session(#[future] app: TestApp) {
    let app = app.await;
    let session = app.login().await;

    let response = app.get("/login/disable", &session).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login/show");
    assert_eq!(flash_of(&response).as_deref(), Some("logged_out"));

    let response = app.get("/", &session).await;
    assert_eq!(location(&response), "/login/show");
}
