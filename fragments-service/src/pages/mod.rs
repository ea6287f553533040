//! Server-rendered HTML pages.
//!
//! Pages are plain `format!` templates. Everything user supplied goes through
//! [`escape`]. [`layout`] adds the navigation bar and the pending flash
//! message, and clears the flash cookie once it has been shown.

mod accounts;
mod fragments;
mod search;

pub use accounts::{error_page, home_page, login_page, register_page};
pub use fragments::{
    confirm_page, dashboard_page, delete_page, fragment_form_page, list_page, not_found_page,
    show_page, FormTarget,
};
pub use search::{search_page, SearchOutcome};

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use fragments_types::Fragment;

use crate::auth::{append_cookie, clear_flash_cookie, Viewer};
use crate::forms::FieldErrors;

pub struct HtmlPage {
    status: StatusCode,
    html: String,
    clear_flash: bool,
}

impl HtmlPage {
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for HtmlPage {
    fn into_response(self) -> Response {
        let mut response = (self.status, Html(self.html)).into_response();
        if self.clear_flash {
            append_cookie(&mut response, &clear_flash_cookie());
        }
        response
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(viewer: &Viewer, title: &str, content: &str) -> HtmlPage {
    let account_links = match viewer.username() {
        Some(username) => format!(
            r#"<a href="/dashboard">Dashboard</a> <a href="/add">Add</a> <span class="user">{}</span> <a href="/logout">Logout</a>"#,
            escape(username)
        ),
        None => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_string(),
    };
    let flash = viewer
        .flash
        .as_ref()
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Fragments</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<nav><a class="brand" href="/">Fragments</a> <a href="/fragments">Browse</a> <a href="/pages/search">Search</a> <span class="spacer"></span>{account_links}</nav>
<main>
{flash}
{content}
</main>
</body>
</html>"#,
        title = escape(title),
    );

    HtmlPage {
        status: StatusCode::OK,
        html,
        clear_flash: viewer.flash.is_some(),
    }
}

fn field_error(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .map(|msg| format!(r#"<span class="field-error">{}</span>"#, escape(msg)))
        .unwrap_or_default()
}

fn input(label: &str, name: &str, kind: &str, value: &str, errors: &FieldErrors) -> String {
    format!(
        r#"<label for="{name}">{label}</label>
<input id="{name}" name="{name}" type="{kind}" value="{value}">
{error}"#,
        value = escape(value),
        error = field_error(errors, name),
    )
}

fn tag_list(fragment: &Fragment) -> String {
    fragment
        .tags
        .iter()
        .map(|tag| format!(r#"<span class="tag">{}</span>"#, escape(tag)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compact card used by listings and search results.
fn fragment_card(fragment: &Fragment) -> String {
    format!(
        r#"<article class="fragment">
<h3><a href="/{id}">{title}</a></h3>
<p class="meta">{date} {tags}</p>
<p>{text}</p>
</article>"#,
        id = fragment.id,
        title = escape(&fragment.title),
        date = fragment.date,
        tags = tag_list(fragment),
        text = escape(&fragment.text),
    )
}
