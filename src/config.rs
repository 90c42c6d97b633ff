use anyhow::{Context, Result};

pub const DEFAULT_TRANSLATE_API_URL: &str =
    "https://translation.googleapis.com/language/translate/v2";
pub const DEFAULT_MAIL_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // HTTP server
    pub port: u16,

    // Translation service
    pub translate_api_key: String,
    pub translate_api_url: String,

    // Mail service
    pub mail_api_key: String,
    pub mail_api_url: String,

    // Outbound HTTP
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Database
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            // HTTP server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            // Translation service
            translate_api_key: std::env::var("TRANSLATE_API_KEY")
                .context("TRANSLATE_API_KEY not set")?,
            translate_api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATE_API_URL.to_string()),

            // Mail service
            mail_api_key: std::env::var("MAIL_API_KEY").context("MAIL_API_KEY not set")?,
            mail_api_url: std::env::var("MAIL_API_URL")
                .unwrap_or_else(|_| DEFAULT_MAIL_API_URL.to_string()),

            // Outbound HTTP
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"***")
            .field("database_max_connections", &self.database_max_connections)
            .field("port", &self.port)
            .field("translate_api_key", &"***")
            .field("translate_api_url", &self.translate_api_url)
            .field("mail_api_key", &"***")
            .field("mail_api_url", &self.mail_api_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
