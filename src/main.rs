use anyhow::{Context, Result};
use message_relay::config::Config;
use message_relay::db::PgMessageStore;
use message_relay::mail::SendGridMailer;
use message_relay::routes;
use message_relay::service::MessageService;
use message_relay::translation::GoogleTranslateClient;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("message_relay=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);

    // Database pool lives for the whole process
    let store = PgMessageStore::connect(&config.database_url, config.database_max_connections)
        .await?;
    store.ensure_schema().await?;
    info!("✓ Database ready");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let translator = GoogleTranslateClient::new(
        http.clone(),
        config.translate_api_key.clone(),
        config.translate_api_url.clone(),
    );
    let mailer = SendGridMailer::new(http, config.mail_api_key.clone(), config.mail_api_url.clone());

    let service = MessageService::new(Arc::new(store), Arc::new(translator), Arc::new(mailer));
    let app = routes::router(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    info!("Message relay listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
