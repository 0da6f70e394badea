//! One-shot messages carried across a redirect in a cookie

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const FLASH_COOKIE: &str = "flash";

/// Messages shown once on the next rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    LoginRequired,
    LoggedIn,
    LoggedOut,
    ClockedIn,
    ClockedOut,
    IntervalSaved,
}

impl Flash {
    const ALL: [Flash; 6] = [
        Flash::LoginRequired,
        Flash::LoggedIn,
        Flash::LoggedOut,
        Flash::ClockedIn,
        Flash::ClockedOut,
        Flash::IntervalSaved,
    ];

    /// Cookie-safe identifier
    pub fn code(self) -> &'static str {
        match self {
            Flash::LoginRequired => "login_required",
            Flash::LoggedIn => "logged_in",
            Flash::LoggedOut => "logged_out",
            Flash::ClockedIn => "clocked_in",
            Flash::ClockedOut => "clocked_out",
            Flash::IntervalSaved => "interval_saved",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::LoginRequired => "login required.",
            Flash::LoggedIn => "logged in successfully.",
            Flash::LoggedOut => "logged out successfully.",
            Flash::ClockedIn => "clocked in.",
            Flash::ClockedOut => "clocked out.",
            Flash::IntervalSaved => "interval edit successfully.",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.code() == code)
    }
}

/// Queue `flash` for the next page
pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.code()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Pop the pending message, if any. Unknown codes are dropped silently.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| Flash::from_code(cookie.value()));

    if jar.get(FLASH_COOKIE).is_some() {
        (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
    } else {
        (jar, flash)
    }
}
