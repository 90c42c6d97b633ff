//! Shared helpers for the integration tests: an in-memory message store and
//! a router wired to mock translation and mail services.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use message_relay::db::{Message, MessageStore, NewMessage, WriteResult};
use message_relay::mail::SendGridMailer;
use message_relay::routes;
use message_relay::service::MessageService;
use message_relay::translation::GoogleTranslateClient;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TRANSLATE_PATH: &str = "/language/translate/v2";
pub const MAIL_PATH: &str = "/v3/mail/send";

/// Address nothing listens on; any call to it fails.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

// ==================== In-memory store ====================

#[derive(Default)]
struct StoreState {
    rows: BTreeMap<i64, Message>,
    next_id: i64,
    mutations: usize,
}

/// `MessageStore` backed by a map, with a switch to make every call fail.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    failing: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<Message> {
        self.state.lock().unwrap().rows.values().cloned().collect()
    }

    /// Number of successful inserts, updates and deletes.
    pub fn mutations(&self) -> usize {
        self.state.lock().unwrap().mutations
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("connection to server at \"db.internal\" (10.0.0.5), port 5432 failed");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn list_messages(&self) -> Result<Vec<Message>> {
        self.check()?;
        Ok(self.rows())
    }

    async fn get_message(&self, entry_id: i64) -> Result<Option<Message>> {
        self.check()?;
        Ok(self.state.lock().unwrap().rows.get(&entry_id).cloned())
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<WriteResult> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let entry_id = state.next_id;
        state.rows.insert(
            entry_id,
            Message {
                entry_id,
                sender_name: message.sender_name.clone(),
                sender_mail: message.sender_mail.clone(),
                receiver_mail: message.receiver_mail.clone(),
                message_content: message.message_content.clone(),
            },
        );
        state.mutations += 1;
        Ok(WriteResult::inserted(entry_id))
    }

    async fn update_message(&self, entry_id: i64, message: &NewMessage) -> Result<WriteResult> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let Some(row) = state.rows.get_mut(&entry_id) else {
            return Ok(WriteResult::affected(0));
        };
        row.sender_name = message.sender_name.clone();
        row.sender_mail = message.sender_mail.clone();
        row.receiver_mail = message.receiver_mail.clone();
        row.message_content = message.message_content.clone();
        state.mutations += 1;
        Ok(WriteResult::affected(1))
    }

    async fn delete_message(&self, entry_id: i64) -> Result<WriteResult> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let removed = state.rows.remove(&entry_id).is_some();
        if removed {
            state.mutations += 1;
        }
        Ok(WriteResult::affected(removed as u64))
    }
}

// ==================== App wiring ====================

/// Router over `store`, with the external services at the given base URLs.
pub fn build_app(store: Arc<InMemoryStore>, translate_base: &str, mail_base: &str) -> Router {
    let http = reqwest::Client::new();
    let translator = GoogleTranslateClient::new(
        http.clone(),
        "test-translate-key".to_string(),
        format!("{}{}", translate_base, TRANSLATE_PATH),
    );
    let mailer = SendGridMailer::new(
        http,
        "test-mail-key".to_string(),
        format!("{}{}", mail_base, MAIL_PATH),
    );

    routes::router(MessageService::new(store, Arc::new(translator), Arc::new(mailer)))
}

/// Router whose external services cannot be reached.
pub fn build_offline_app(store: Arc<InMemoryStore>) -> Router {
    build_app(store, UNREACHABLE, UNREACHABLE)
}

// ==================== Requests ====================

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("body is not JSON ({}): {}", e, self.body))
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");

    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    send(app, request).await
}

pub async fn send_empty(app: &Router, method: Method, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    send(app, request).await
}

pub fn alice_payload() -> serde_json::Value {
    serde_json::json!({
        "senderName": "Alice",
        "senderMail": "a@x.com",
        "receiverMail": "b@x.com",
        "messageContent": "hi"
    })
}

pub fn foreign_payload(language: &str) -> serde_json::Value {
    let mut payload = alice_payload();
    payload["language"] = serde_json::Value::String(language.to_string());
    payload
}
