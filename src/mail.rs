use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

/// An outgoing plain-text mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    /// Mail relaying a message from `sender_name` to `to`.
    pub fn relay(sender_name: &str, from: &str, to: &str, body: String) -> Self {
        Self {
            to: to.to_string(),
            from: from.to_string(),
            subject: relay_subject(sender_name),
            body,
        }
    }
}

/// Subject line used for relayed messages.
pub fn relay_subject(sender_name: &str) -> String {
    format!("{} sent you a message", sender_name)
}

/// What the mail service reported on acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub message_id: Option<String>,
}

/// Sends mail through an external transactional-mail service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_mail(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt>;
}

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

impl<'a> From<&'a OutgoingMail> for SendMailRequest<'a> {
    fn from(mail: &'a OutgoingMail) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Address { email: &mail.to }],
            }],
            from: Address { email: &mail.from },
            subject: &mail.subject,
            content: vec![Content {
                kind: "text/plain",
                value: &mail.body,
            }],
        }
    }
}

/// Client for the SendGrid v3 mail-send API.
#[derive(Clone)]
pub struct SendGridMailer {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl SendGridMailer {
    pub fn new(client: reqwest::Client, api_key: String, api_url: String) -> Self {
        Self {
            client,
            api_key,
            api_url,
        }
    }
}

impl std::fmt::Debug for SendGridMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridMailer")
            .field("api_key", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send_mail(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt> {
        let request = SendMailRequest::from(mail);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to mail API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Mail API error ({}): {}", status, body);
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(DeliveryReceipt {
            status: response.status().as_u16(),
            message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_mailer(server: &MockServer) -> SendGridMailer {
        SendGridMailer::new(
            reqwest::Client::new(),
            "test-mail-key".to_string(),
            format!("{}/v3/mail/send", server.uri()),
        )
    }

    fn sample_mail() -> OutgoingMail {
        OutgoingMail::relay("Alice", "a@x.com", "b@x.com", "Bonjour".to_string())
    }

    #[test]
    fn test_relay_subject() {
        assert_eq!(relay_subject("Alice"), "Alice sent you a message");
    }

    #[test]
    fn test_relay_mail_fields() {
        let mail = sample_mail();
        assert_eq!(mail.to, "b@x.com");
        assert_eq!(mail.from, "a@x.com");
        assert_eq!(mail.subject, "Alice sent you a message");
        assert_eq!(mail.body, "Bonjour");
    }

    #[test]
    fn test_request_serialization() {
        let mail = sample_mail();
        let json = serde_json::to_value(SendMailRequest::from(&mail)).expect("serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "personalizations": [{ "to": [{ "email": "b@x.com" }] }],
                "from": { "email": "a@x.com" },
                "subject": "Alice sent you a message",
                "content": [{ "type": "text/plain", "value": "Bonjour" }]
            })
        );
    }

    #[tokio::test]
    async fn test_send_mail_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(header("Authorization", "Bearer test-mail-key"))
            .and(body_json(serde_json::json!({
                "personalizations": [{ "to": [{ "email": "b@x.com" }] }],
                "from": { "email": "a@x.com" },
                "subject": "Alice sent you a message",
                "content": [{ "type": "text/plain", "value": "Bonjour" }]
            })))
            .respond_with(ResponseTemplate::new(202).insert_header("X-Message-Id", "msg-123"))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = create_mailer(&server)
            .send_mail(&sample_mail())
            .await
            .expect("Should send");

        assert_eq!(receipt.status, 202);
        assert_eq!(receipt.message_id, Some("msg-123".to_string()));
    }

    #[tokio::test]
    async fn test_send_mail_without_message_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let receipt = create_mailer(&server)
            .send_mail(&sample_mail())
            .await
            .expect("Should send");

        assert!(receipt.message_id.is_none());
    }

    #[tokio::test]
    async fn test_send_mail_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"errors":[{"message":"bad key"}]}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = create_mailer(&server).send_mail(&sample_mail()).await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("401"));
        assert!(err.contains("bad key"));
    }

    #[tokio::test]
    async fn test_send_mail_unreachable() {
        let mailer = SendGridMailer::new(
            reqwest::Client::new(),
            "key".to_string(),
            "http://127.0.0.1:1/v3/mail/send".to_string(),
        );

        let result = mailer.send_mail(&sample_mail()).await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to send request to mail API"));
    }
}
