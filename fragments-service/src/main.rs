//! Fragments service: a small site of short, tagged, dated text fragments.
//!
//! Anyone can browse and search; registered users write, edit and delete.
//! Default: http://127.0.0.1:9103/

mod auth;
mod config;
mod db;
mod error;
mod forms;
mod pages;
mod password;
mod routes;

use std::sync::Arc;

use config::Config;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;

    log::info!("Opening database at: {}", config.database_url);
    let database = Arc::new(db::Db::open(&config.database_url)?);

    match database.purge_expired_sessions() {
        Ok(0) => {}
        Ok(n) => log::info!("Removed {} expired sessions", n),
        Err(e) => log::warn!("Could not purge expired sessions: {}", e),
    }

    let addr = format!("{}:{}", config.bind_address, config.port);
    let state = Arc::new(AppState::new(database, config)?);
    let app = routes::build_router(state);

    log::info!("Fragments service listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
