//! Axum router and route handlers.

mod accounts;
mod fragments;
mod search;
mod status;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use regex::Regex;
use tower_http::services::ServeDir;

use crate::auth::{load_session, Viewer};
use crate::config::Config;
use crate::db::Db;
use crate::error::StoreError;
use crate::forms::registration_code_pattern;
use crate::pages;

pub struct AppState {
    pub db: Arc<Db>,
    pub config: Config,
    pub registration_code: Regex,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: Arc<Db>, config: Config) -> Result<Self, regex::Error> {
        Ok(Self {
            registration_code: registration_code_pattern(&config.registration_code)?,
            db,
            config,
            start_time: Instant::now(),
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.config.session_ttl_hours)
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(fragments::home))
        // Accounts
        .route("/register", get(accounts::register_form).post(accounts::register))
        .route("/login", get(accounts::login_form).post(accounts::login))
        .route("/logout", get(accounts::logout))
        // Browsing
        .route("/fragments", get(fragments::first_page))
        .route("/pages/search", get(search::search))
        .route("/pages/:page", get(fragments::list_page))
        .route("/:id", get(fragments::show))
        // Authoring
        .route("/dashboard", get(fragments::dashboard))
        .route("/add", get(fragments::add_form).post(fragments::add))
        .route("/edit/:id", get(fragments::edit_form).post(fragments::edit))
        .route("/delete/:id", get(fragments::delete_form).post(fragments::delete))
        .route("/confirm", get(fragments::confirm))
        // Service
        .route("/api/status", get(status::status))
        .nest_service("/static", static_files)
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} {} {:?}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

fn internal_error(viewer: &Viewer, action: &str, err: StoreError) -> Response {
    log::error!("Failed to {}: {}", action, err);
    pages::error_page(viewer, "Something went wrong, please try again.")
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)
        .into_response()
}

fn not_found(viewer: &Viewer) -> Response {
    pages::not_found_page(viewer)
        .with_status(StatusCode::NOT_FOUND)
        .into_response()
}
