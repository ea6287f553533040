use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::password;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid number, got '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Prefix of the access code a visitor must enter to register.
    pub registration_code: String,
    pub bind_address: String,
    pub port: u16,
    pub session_ttl_hours: i64,
    pub password_rounds: u32,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "./fragments.db".to_string()),
            registration_code: env::var("REGISTRATION_CODE")
                .map_err(|_| ConfigError::Missing("REGISTRATION_CODE"))?,
            bind_address: env::var("FRAGMENTS_BIND").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed_var("FRAGMENTS_PORT", 9103)?,
            session_ttl_hours: parsed_var("SESSION_TTL_HOURS", 24)?,
            password_rounds: parsed_var("PASSWORD_ROUNDS", password::DEFAULT_ROUNDS)?,
            static_dir: env::var("FRAGMENTS_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))),
        })
    }
}

fn parsed_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
