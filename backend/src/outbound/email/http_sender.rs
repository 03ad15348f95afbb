//! Reqwest-backed email provider adapter.
//!
//! Owns transport details only: payload serialisation, bearer authentication,
//! timeout and HTTP status mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::EmailMessage;
use crate::domain::ports::{EmailError, EmailSender};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const PREVIEW_CHAR_LIMIT: usize = 160;

/// Provider endpoint, credentials and sender address.
pub struct HttpEmailConfig {
    pub endpoint: Url,
    pub api_key: Zeroizing<String>,
    pub from: String,
    pub timeout: Duration,
}

impl HttpEmailConfig {
    /// Configuration with the default ten second timeout.
    pub fn new(endpoint: Url, api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            endpoint,
            api_key: Zeroizing::new(api_key.into()),
            from: from.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for HttpEmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmailConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendEmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

impl<'a> SendEmailPayload<'a> {
    fn new(from: &'a str, message: &'a EmailMessage) -> Self {
        Self {
            from,
            to: [message.to.as_ref()],
            subject: &message.subject,
            text: &message.text_body,
        }
    }
}

/// Sends each message with one HTTP POST.
pub struct HttpEmailSender {
    client: Client,
    config: HttpEmailConfig,
}

impl HttpEmailSender {
    /// Build the sender with a client honouring the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: HttpEmailConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let payload = SendEmailPayload::new(&self.config.from, message);
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(self.config.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|err| EmailError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(subject = %message.subject, "email accepted by provider");
            return Ok(());
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| EmailError::transport(err.to_string()))?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EmailError {
    let preview = body_preview(body);
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        EmailError::transport(format!("status {}: {preview}", status.as_u16()))
    } else {
        EmailError::rejected(status.as_u16(), preview)
    }
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.
    use super::*;
    use crate::domain::EmailAddress;
    use rstest::rstest;

    fn message() -> EmailMessage {
        EmailMessage {
            to: EmailAddress::new("student@example.org").expect("email"),
            subject: "Welcome to edUmeetup".into(),
            text_body: "Hi".into(),
        }
    }

    #[rstest]
    fn payload_shape() {
        let message = message();
        let payload = SendEmailPayload::new("edUmeetup <no-reply@edumeetup.example>", &message);
        let json = serde_json::to_value(&payload).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "from": "edUmeetup <no-reply@edumeetup.example>",
                "to": ["student@example.org"],
                "subject": "Welcome to edUmeetup",
                "text": "Hi",
            })
        );
    }

    #[rstest]
    #[case(StatusCode::UNPROCESSABLE_ENTITY, false)]
    #[case(StatusCode::UNAUTHORIZED, false)]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::BAD_GATEWAY, true)]
    fn statuses(#[case] status: StatusCode, #[case] transport: bool) {
        let err = map_status_error(status, b"{\"message\": \"bad\"}");
        assert_eq!(matches!(err, EmailError::Transport { .. }), transport);
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
    }

    #[rstest]
    fn debug_hides_the_key() {
        let endpoint = Url::parse("https://api.mail.example/emails").expect("url");
        let config = HttpEmailConfig::new(endpoint, "sk_live_secret", "no-reply@edumeetup.example");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk_live_secret"));
    }
}
