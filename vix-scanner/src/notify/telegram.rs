//! Telegram bot notifier.

use reqwest::Client;
use serde::Deserialize;

use super::{Notifier, NotifyError};

/// Telegram Bot API base URL.
const BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts messages to one chat through a bot.
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            client: Client::new(),
            token,
            chat_id,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

impl Notifier for TelegramNotifier {
    async fn send(&mut self, text: &str) -> Result<(), NotifyError> {
        let params = [("chat_id", self.chat_id.as_str()), ("text", text)];
        let response = self.client.post(self.send_url()).form(&params).send().await?;

        let status = response.status();
        let body: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Rejected(format!("{}: unreadable response ({})", status, e)))?;

        if !status.is_success() || !body.ok {
            return Err(NotifyError::Rejected(format!(
                "{}: {}",
                status,
                body.description.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_url() {
        let notifier = TelegramNotifier::new("123:abc".to_string(), "42".to_string());
        assert_eq!(notifier.send_url(), "https://api.telegram.org/bot123:abc/sendMessage");

        let local = notifier.with_base_url("http://127.0.0.1:8081");
        assert_eq!(local.send_url(), "http://127.0.0.1:8081/bot123:abc/sendMessage");
    }

    #[test]
    fn test_response_parsing() {
        let ok: SendMessageResponse = serde_json::from_str(r#"{"ok":true,"result":{}}"#).unwrap();
        assert!(ok.ok);

        let err: SendMessageResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
                .unwrap();
        assert!(!err.ok);
        assert_eq!(err.description.as_deref(), Some("Bad Request: chat not found"));
    }
}
