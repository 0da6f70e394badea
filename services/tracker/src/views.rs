//! Server-rendered pages

use axum::response::Html;
use chrono::Local;
use uuid::Uuid;

use crate::{
    durations::{format_clock, format_duration},
    flash::Flash,
    forms::{FieldErrors, IntervalForm, LoginForm},
    middleware::CurrentUser,
    tracker::DailySummary,
};

/// Escape text for use in element content and quoted attributes
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, flash: Option<Flash>, body: &str) -> Html<String> {
    let flash = flash
        .map(|f| format!(r#"<p class="flash">{}</p>"#, escape(f.message())))
        .unwrap_or_default();

    Html(format!(
        concat!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">",
            "<title>{title} - flowtime</title></head>\n",
            "<body>\n{flash}\n{body}\n</body></html>\n"
        ),
        title = escape(title),
        flash = flash,
        body = body,
    ))
}

fn field_error(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .map(|message| format!(r#"<span class="error">{}</span>"#, escape(message)))
        .unwrap_or_default()
}

pub fn login_page(
    flash: Option<Flash>,
    form: &LoginForm,
    errors: &FieldErrors,
    failure: Option<&str>,
) -> Html<String> {
    let failure = failure
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();

    let body = format!(
        r#"<h1>Login</h1>
{failure}
<form method="post" action="/login/check">
<label>username <input type="text" name="username" value="{username}"></label>{username_error}
<label>password <input type="password" name="password"></label>{password_error}
<button type="submit">login</button>
</form>"#,
        failure = failure,
        username = escape(&form.username),
        username_error = field_error(errors, "username"),
        password_error = field_error(errors, "password"),
    );

    layout("Login", flash, &body)
}

pub fn index_page(user: &CurrentUser, summary: &DailySummary, flash: Option<Flash>) -> Html<String> {
    let mut rows = String::new();
    for interval in &summary.intervals {
        let stop = interval
            .stop
            .map(|stop| format_clock(stop, &Local))
            .unwrap_or_else(|| "running".to_string());
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td><a href=\"/interval/edit/{}\">edit</a></td></tr>\n",
            format_clock(interval.start, &Local),
            stop,
            format_duration(interval.duration_at(summary.as_of)),
            interval.id,
        ));
    }

    let (state, action) = if summary.working {
        ("working", "stop")
    } else {
        ("not working", "start")
    };

    let body = format!(
        r#"<h1>{day}</h1>
<p>Hello {username}, you are <strong class="state">{state}</strong>. <a href="/login/disable">logout</a></p>
<form method="post" action="/interval/toggle"><button type="submit">{action}</button></form>
<table>
<tr><th>start</th><th>stop</th><th>duration</th><th></th></tr>
{rows}</table>
<p>total: <strong class="total">{total}</strong></p>"#,
        day = summary.day.format("%Y-%m-%d"),
        username = escape(&user.username),
        state = state,
        action = action,
        rows = rows,
        total = format_duration(summary.total),
    );

    layout("Today", flash, &body)
}

pub fn edit_page(
    id: Uuid,
    form: &IntervalForm,
    errors: &FieldErrors,
    flash: Option<Flash>,
) -> Html<String> {
    let body = format!(
        r#"<h1>Edit interval</h1>
<form method="post" action="/interval/save/{id}">
<label>start <input type="text" name="start" value="{start}"></label>{start_error}
<label>stop <input type="text" name="stop" value="{stop}"></label>{stop_error}
<button type="submit">save</button>
</form>
<p><a href="/">back</a></p>"#,
        id = id,
        start = escape(&form.start),
        start_error = field_error(errors, "start"),
        stop = escape(&form.stop),
        stop_error = field_error(errors, "stop"),
    );

    layout("Edit interval", flash, &body)
}

pub fn error_page(title: &str, message: &str) -> Html<String> {
    let body = format!(
        r#"<h1>{}</h1>
<p>{}</p>
<p><a href="/">back</a></p>"#,
        escape(title),
        escape(message)
    );
    layout(title, None, &body)
}
