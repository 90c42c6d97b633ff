//! Translate preview binary - shows the mail body a foreign message would get,
//! without sending mail or touching the database
//!
//! Usage:
//!   cargo run --bin translate-preview -- French "Hello there"
//!   cargo run --bin translate-preview -- ALL "Hello there"
//!
//! Required environment variables:
//! - TRANSLATE_API_KEY
//!
//! Optional:
//! - TRANSLATE_API_URL (defaults to the Google Cloud Translation v2 endpoint)

use anyhow::{Context, Result};
use message_relay::config::DEFAULT_TRANSLATE_API_URL;
use message_relay::i18n::{LanguageRegistry, TranslationTarget};
use message_relay::mail::relay_subject;
use message_relay::translation::{translate_for_target, GoogleTranslateClient, Translator};
use tracing::info;

fn usage() -> String {
    let names: Vec<&str> = LanguageRegistry::get()
        .list_all()
        .iter()
        .map(|lang| lang.name)
        .collect();
    format!(
        "Usage: translate-preview <language|ALL> <text...>\nLanguages: {}",
        names.join(", ")
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("message_relay=info".parse()?),
        )
        .init();

    // Parse CLI arguments
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (language, words) = match args.split_first() {
        Some((language, words)) if !words.is_empty() => (language, words),
        _ => anyhow::bail!(usage()),
    };
    let text = words.join(" ");

    let target = TranslationTarget::from_name(language).context(usage())?;

    let api_key = std::env::var("TRANSLATE_API_KEY").context("TRANSLATE_API_KEY not set")?;
    let api_url = std::env::var("TRANSLATE_API_URL")
        .unwrap_or_else(|_| DEFAULT_TRANSLATE_API_URL.to_string());
    let client = GoogleTranslateClient::new(reqwest::Client::new(), api_key, api_url);

    info!("Detecting source language...");
    let detected = client.detect_language(&text).await?;

    info!("Translating into {}...", language);
    let body = translate_for_target(&client, &text, target).await?;

    println!("\n{}", "=".repeat(60));
    println!("Detected language: {}", detected.language);
    println!("Subject: {}", relay_subject("<sender>"));
    println!("{}", "=".repeat(60));
    println!("{}", body);
    println!("{}", "=".repeat(60));

    Ok(())
}
