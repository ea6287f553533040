//! Session cookies, flash messages and the auth gate.
//!
//! [`load_session`] resolves the session cookie against the store once per
//! request and reissues the cookie with the extended expiry. [`Viewer`] reads
//! what it found. [`RequireAuth`] is the gate in front of protected handlers:
//! without a live session it rejects with a redirect to `/login`, so the
//! handler body never runs.

use std::convert::Infallible;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::{DateTime, Utc};

use crate::db::Session;
use crate::routes::AppState;

pub const SESSION_COOKIE: &str = "fragments_session";
const FLASH_COOKIE: &str = "flash";

/// Value of the first cookie called `name`.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Session cookie that lives exactly as long as the server-side session.
pub fn session_cookie(token: &str, expires_at: DateTime<Utc>) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        (expires_at - Utc::now()).num_seconds().max(0)
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

pub fn clear_flash_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", FLASH_COOKIE)
}

pub fn append_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => log::error!("Refusing to set malformed cookie: {}", e),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Danger,
    Warning,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(Self::Success),
            "danger" => Some(Self::Danger),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Warning,
            message: message.into(),
        }
    }

    fn to_cookie(&self) -> String {
        let payload = format!("{}|{}", self.level.as_str(), self.message);
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            FLASH_COOKIE,
            urlencoding::encode(&payload)
        )
    }

    fn from_cookie(raw: &str) -> Option<Self> {
        let payload = urlencoding::decode(raw).ok()?;
        let (level, message) = payload.split_once('|')?;
        Some(Self {
            level: FlashLevel::parse(level)?,
            message: message.to_string(),
        })
    }
}

pub fn redirect_with_flash(to: &str, flash: FlashMessage) -> Response {
    let mut response = Redirect::to(to).into_response();
    append_cookie(&mut response, &flash.to_cookie());
    response
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|value| value.to_str().is_ok_and(|cookie| cookie.starts_with(&prefix)))
}

/// Middleware: validate the session cookie, which slides the server-side
/// expiry, and refresh the cookie's `Max-Age` to match. Handlers that set or
/// clear the cookie themselves win.
pub async fn load_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match cookie_value(request.headers(), SESSION_COOKIE) {
        Some(token) if !token.is_empty() => {
            match state.db.validate_session(token, state.session_ttl()) {
                Ok(session) => session,
                Err(e) => {
                    log::error!("Session validation error: {}", e);
                    None
                }
            }
        }
        _ => None,
    };
    if let Some(session) = &session {
        request.extensions_mut().insert(session.clone());
    }

    let mut response = next.run(request).await;

    if let Some(session) = session {
        if !sets_session_cookie(&response) {
            append_cookie(&mut response, &session_cookie(&session.token, session.expires_at));
        }
    }
    response
}

/// Who is asking, and the flash message waiting for them. Never rejects.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub session: Option<Session>,
    pub flash: Option<FlashMessage>,
}

impl Viewer {
    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username.as_str())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flash = cookie_value(&parts.headers, FLASH_COOKIE).and_then(FlashMessage::from_cookie);
        let session = parts.extensions.get::<Session>().cloned();
        Ok(Self { session, flash })
    }
}

/// A viewer with a live session.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Viewer);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequireAuth {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let viewer = match Viewer::from_request_parts(parts, state).await {
            Ok(viewer) => viewer,
            Err(never) => match never {},
        };

        if viewer.session.is_some() {
            Ok(Self(viewer))
        } else {
            log::info!("Unauthenticated request to {} sent to login", parts.uri.path());
            Err(redirect_with_flash(
                "/login",
                FlashMessage::warning("Unauthorized, please login"),
            ))
        }
    }
}
