use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::credentials::{AccountSid, AuthToken};
use crate::services::error::NotifyError;
use crate::services::notifier::{MessageSid, Notifier};

/// Public Twilio REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.twilio.com";

/// Twilio WhatsApp sandbox sender.
pub const DEFAULT_SENDER: &str = "whatsapp:+14155238886";

const WHATSAPP_PREFIX: &str = "whatsapp:";

#[derive(Clone)]
pub struct TwilioClient {
    base_url: String,
    account_sid: AccountSid,
    auth_token: AuthToken,
    from: String,
    http: Client,
}

/// Successful `Messages.json` response; only the id matters here.
#[derive(Debug, Deserialize)]
pub struct TwilioMessage {
    pub sid: String,
    pub status: Option<String>,
}

/// Twilio's error body.
#[derive(Debug, Deserialize)]
pub struct TwilioError {
    pub code: Option<i64>,
    pub message: String,
}

impl TwilioClient {
    pub fn new(
        base_url: impl Into<String>,
        account_sid: AccountSid,
        auth_token: AuthToken,
        from: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_sid,
            auth_token,
            from: from.into(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url,
            self.account_sid.as_str()
        )
    }
}

/// Put `to` on the same channel as `from`.
///
/// A WhatsApp sender can only reach WhatsApp addresses, so a bare E.164
/// number gets the `whatsapp:` prefix. Other senders leave `to` untouched.
pub fn align_channel(from: &str, to: &str) -> String {
    if from.starts_with(WHATSAPP_PREFIX) && !to.starts_with(WHATSAPP_PREFIX) {
        format!("{}{}", WHATSAPP_PREFIX, to)
    } else {
        to.to_string()
    }
}

#[async_trait]
impl Notifier for TwilioClient {
    async fn send(&self, to: &str, body: &str) -> Result<MessageSid, NotifyError> {
        let to = align_channel(&self.from, to);
        let form = [("To", to.as_str()), ("From", self.from.as_str()), ("Body", body)];

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(self.account_sid.as_str(), Some(self.auth_token.expose()))
            .form(&form)
            .send()
            .await
            .map_err(|err| NotifyError::network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<TwilioError>(&text) {
                Ok(err) => (err.code, err.message),
                Err(_) => (None, text),
            };
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let message = response
            .json::<TwilioMessage>()
            .await
            .map_err(|err| NotifyError::format(err.to_string()))?;

        tracing::debug!(sid = %message.sid, status = ?message.status, "Twilio accepted message");
        Ok(message.sid)
    }

    fn provider_name(&self) -> &str {
        "twilio"
    }
}
