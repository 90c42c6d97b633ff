use crate::i18n::TranslationTarget;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Language detected for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    /// ISO 639-1 code reported by the service (e.g., "en")
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Language detection and translation provided by an external service.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Identify the dominant language of `text`.
    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage>;

    /// Translate `text` into the language identified by `target_code`.
    async fn translate_text(&self, text: &str, target_code: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    data: DetectData,
}

#[derive(Debug, Deserialize)]
struct DetectData {
    detections: Vec<Vec<DetectedLanguage>>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Client for the Google Cloud Translation v2 REST API.
#[derive(Clone)]
pub struct GoogleTranslateClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleTranslateClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<Req, Resp>(&self, url: &str, body: &Req, operation: &str) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .context(format!("Failed to send {} request to translation API", operation))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("Translation API error during {} ({}): {}", operation, status, body);
        }

        response
            .json()
            .await
            .context(format!("Failed to parse translation API {} response", operation))
    }
}

impl std::fmt::Debug for GoogleTranslateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage> {
        let url = format!("{}/detect", self.base_url);
        let response: DetectResponse = self
            .post(&url, &DetectRequest { q: text }, "detection")
            .await?;

        response
            .data
            .detections
            .into_iter()
            .next()
            .and_then(|candidates| candidates.into_iter().next())
            .context("Translation API detection response contained no detections")
    }

    async fn translate_text(&self, text: &str, target_code: &str) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            target: target_code,
            format: "text",
        };
        let response: TranslateResponse = self.post(&self.base_url, &request, "translation").await?;

        response
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .context("Translation API response contained no translations")
    }
}

/// Translate `text` for a request's target and compose the mail body.
///
/// A single language yields its translation as-is. `All` translates into
/// every dictionary language concurrently and joins the results in
/// dictionary order, each followed by a line break. The first failed
/// translation aborts the whole operation.
pub async fn translate_for_target(
    translator: &dyn Translator,
    text: &str,
    target: TranslationTarget,
) -> Result<String> {
    match target {
        TranslationTarget::Single(language) => translator
            .translate_text(text, language.code)
            .await
            .context(format!("Translation to {} failed", language.name)),
        TranslationTarget::All => {
            let languages = target.languages();
            debug!("Translating into {} languages", languages.len());

            let translations = try_join_all(languages.iter().map(|language| async move {
                translator
                    .translate_text(text, language.code)
                    .await
                    .context(format!("Translation to {} failed", language.name))
            }))
            .await?;

            Ok(translations.iter().fold(String::new(), |mut body, translated| {
                body.push_str(translated);
                body.push('\n');
                body
            }))
        }
    }
}
