use crate::db::{Message, MessageStore, NewMessage, WriteResult};
use crate::error::{AppError, AppResult};
use crate::i18n::TranslationTarget;
use crate::mail::{Mailer, OutgoingMail};
use crate::translation::{translate_for_target, Translator};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Message fields as sent by a client. Every field is optional here so that
/// missing values surface as validation errors instead of parse failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub sender_name: Option<String>,
    pub sender_mail: Option<String>,
    pub receiver_mail: Option<String>,
    pub message_content: Option<String>,
    pub language: Option<String>,
}

fn required(value: &Option<String>) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(AppError::missing_parameters()),
    }
}

impl MessagePayload {
    /// The four stored fields, all required. `language` is ignored.
    pub fn to_new_message(&self) -> AppResult<NewMessage> {
        Ok(NewMessage {
            sender_name: required(&self.sender_name)?,
            sender_mail: required(&self.sender_mail)?,
            receiver_mail: required(&self.receiver_mail)?,
            message_content: required(&self.message_content)?,
        })
    }
}

/// Parse a path id. Anything but a positive integer counts as missing.
pub fn parse_entry_id(raw: &str) -> AppResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::missing_parameters()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationData {
    pub original_language: String,
    pub translated_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignMessageOutcome {
    pub data: WriteResult,
    pub translation_data: TranslationData,
}

/// The message operations behind the HTTP routes.
#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    translator: Arc<dyn Translator>,
    mailer: Arc<dyn Mailer>,
}

impl MessageService {
    pub fn new(
        store: Arc<dyn MessageStore>,
        translator: Arc<dyn Translator>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            translator,
            mailer,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Message>> {
        self.store.list_messages().await.map_err(AppError::Storage)
    }

    pub async fn get(&self, entry_id: i64) -> AppResult<Message> {
        self.store
            .get_message(entry_id)
            .await
            .map_err(AppError::Storage)?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, payload: &MessagePayload) -> AppResult<WriteResult> {
        let message = payload.to_new_message()?;
        let result = self
            .store
            .insert_message(&message)
            .await
            .map_err(AppError::Storage)?;

        info!("Stored message {:?}", result.insert_id);
        Ok(result)
    }

    pub async fn update(&self, entry_id: i64, payload: &MessagePayload) -> AppResult<WriteResult> {
        let message = payload.to_new_message()?;
        let result = self
            .store
            .update_message(entry_id, &message)
            .await
            .map_err(AppError::Storage)?;

        if !result.matched_any() {
            return Err(AppError::NotFound);
        }
        Ok(result)
    }

    pub async fn delete(&self, entry_id: i64) -> AppResult<WriteResult> {
        let result = self
            .store
            .delete_message(entry_id)
            .await
            .map_err(AppError::Storage)?;

        if !result.matched_any() {
            return Err(AppError::NotFound);
        }
        info!("Deleted message {}", entry_id);
        Ok(result)
    }

    /// Translate a message, mail the translation, then store the original.
    ///
    /// Steps run strictly in order: detection, translation(s), mail, insert.
    /// A failure at any step aborts the rest. Earlier steps are not undone, so
    /// a mail can go out even when the insert then fails.
    pub async fn create_foreign(&self, payload: &MessagePayload) -> AppResult<ForeignMessageOutcome> {
        let message = payload.to_new_message()?;
        let language = required(&payload.language)?;
        let target = TranslationTarget::from_name(&language).map_err(|e| {
            warn!("Rejected translation request: {}", e);
            AppError::UnsupportedLanguage(language.clone())
        })?;

        let detected = self
            .translator
            .detect_language(&message.message_content)
            .await
            .context("Language detection failed")
            .map_err(AppError::Relay)?;

        let translated_text =
            translate_for_target(self.translator.as_ref(), &message.message_content, target)
                .await
                .map_err(AppError::Relay)?;

        let mail = OutgoingMail::relay(
            &message.sender_name,
            &message.sender_mail,
            &message.receiver_mail,
            translated_text.clone(),
        );
        let receipt = self
            .mailer
            .send_mail(&mail)
            .await
            .context("Mail delivery failed")
            .map_err(AppError::Relay)?;
        info!(
            "Relayed message in {} to {} (mail status {}, id {:?})",
            language, message.receiver_mail, receipt.status, receipt.message_id
        );

        let data = self
            .store
            .insert_message(&message)
            .await
            .context("Storing relayed message failed")
            .map_err(AppError::Relay)?;

        Ok(ForeignMessageOutcome {
            data,
            translation_data: TranslationData {
                original_language: detected.language,
                translated_text,
            },
        })
    }
}
