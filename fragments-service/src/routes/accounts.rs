//! Registration, login and logout.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use fragments_types::NewUser;

use super::{internal_error, AppState};
use crate::auth::{
    append_cookie, clear_session_cookie, cookie_value, redirect_with_flash, session_cookie,
    FlashMessage, Viewer, SESSION_COOKIE,
};
use crate::error::StoreError;
use crate::forms::{FieldErrors, LoginForm, RegisterForm};
use crate::pages::{self, HtmlPage};
use crate::password;

// GET /register
pub async fn register_form(viewer: Viewer) -> HtmlPage {
    pages::register_page(&viewer, &RegisterForm::default(), &FieldErrors::new())
}

// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Form(form): Form<RegisterForm>,
) -> Response {
    let errors = form.validate(&state.registration_code);
    if !errors.is_empty() {
        return pages::register_page(&viewer, &form, &errors)
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .into_response();
    }

    let password_hash = match password::hash_password(&form.password, state.config.password_rounds) {
        Ok(hash) => hash,
        Err(e) => {
            log::error!("Failed to hash password: {}", e);
            return pages::error_page(&viewer, "Something went wrong, please try again.")
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
                .into_response();
        }
    };
    let new_user = NewUser {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        username: form.username.clone(),
        password_hash,
    };

    match state.db.create_user(&new_user) {
        Ok(user) => {
            log::info!("Registered user {}", user.username);
            Redirect::to("/").into_response()
        }
        Err(StoreError::Conflict(_)) => pages::error_page(&viewer, "Username already exists")
            .with_status(StatusCode::CONFLICT)
            .into_response(),
        Err(e) => internal_error(&viewer, "register user", e),
    }
}

// GET /login
pub async fn login_form(viewer: Viewer) -> HtmlPage {
    pages::login_page(&viewer, "", None)
}

// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match state.db.find_user_by_username(&form.username) {
        Ok(Some(user)) => user,
        Ok(None) => {
            return pages::login_page(&viewer, &form.username, Some("Username not found"))
                .with_status(StatusCode::UNAUTHORIZED)
                .into_response();
        }
        Err(e) => return internal_error(&viewer, "look up user", e),
    };

    if !password::verify_password(&form.password, &user.password) {
        log::warn!("Invalid login attempt for {}", user.username);
        return pages::login_page(&viewer, &form.username, Some("Invalid login"))
            .with_status(StatusCode::UNAUTHORIZED)
            .into_response();
    }

    let ttl = state.session_ttl();
    match state.db.create_session(&user, ttl) {
        Ok(session) => {
            log::info!("User {} logged in", user.username);
            let mut response =
                redirect_with_flash("/dashboard", FlashMessage::success("You are logged in"));
            append_cookie(&mut response, &session_cookie(&session.token, session.expires_at));
            response
        }
        Err(e) => internal_error(&viewer, "create session", e),
    }
}

// GET /logout
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        if let Err(e) = state.db.delete_session(token) {
            log::error!("Failed to delete session: {}", e);
        }
    }

    let mut response =
        redirect_with_flash("/login", FlashMessage::success("you are now logged out"));
    append_cookie(&mut response, &clear_session_cookie());
    response
}
