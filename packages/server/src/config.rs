use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use uuid::Uuid;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// When unset, the server runs on the in-memory store
    pub database_url: Option<String>,
    pub jobs_api_url: String,
    pub jobs_api_token: String,
    /// Scraper bridge command; scraping source disabled when unset
    pub scraper_command: Option<String>,
    pub port: u16,
    /// Cron expression for the scheduled-import sweep
    pub import_cron: String,
    /// Recipient for import-completed notifications; none stored when unset
    pub admin_recipient: Option<Uuid>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok(),
            jobs_api_url: env::var("JOBS_API_URL").context("JOBS_API_URL must be set")?,
            jobs_api_token: env::var("JOBS_API_TOKEN").context("JOBS_API_TOKEN must be set")?,
            scraper_command: env::var("SCRAPER_COMMAND").ok(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            import_cron: env::var("IMPORT_CRON").unwrap_or_else(|_| "0 0 * * * *".to_string()),
            admin_recipient: match env::var("ADMIN_RECIPIENT") {
                Ok(raw) => Some(
                    raw.parse()
                        .context("ADMIN_RECIPIENT must be a valid UUID")?,
                ),
                Err(_) => None,
            },
        })
    }
}
