use std::env;

use crate::error::AppError;

pub struct Config {
    /// Postgres connection string. When unset the server runs on the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let server_port = match env::var("SERVER_PORT") {
            Ok(raw) => raw.parse().map_err(|e| {
                AppError::InternalServerError(format!("SERVER_PORT must be a number: {}", e))
            })?,
            Err(_) => 8080,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            server_port,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
