use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DeliveryError, DeliveryGateway};
use crate::config::TelegramConfig;
use crate::hosts::ChatId;

/// Telegram Bot API client used as the production delivery gateway.
pub struct TelegramGateway {
    client: Client,
    api_base_url: String,
    token: String,
    parse_mode: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

/// Envelope every Bot API method responds with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    first_name: String,
    username: Option<String>,
}

impl TelegramGateway {
    pub fn new(config: &TelegramConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(DeliveryError::Transport)?;

        let parse_mode = Some(config.parse_mode.trim())
            .filter(|mode| !mode.is_empty())
            .map(str::to_string);

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            parse_mode,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.token, method)
    }

    /// Check the token with `getMe` and return the bot's account name.
    #[tracing::instrument(name = "telegram.verify", skip(self))]
    pub async fn verify(&self) -> Result<String, DeliveryError> {
        let response = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url()))?;

        let user: BotUser = read_result(response).await?;
        Ok(user.username.unwrap_or(user.first_name))
    }

    fn send_message_body<'a>(&'a self, chat_id: ChatId, text: &'a str) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id,
            text,
            parse_mode: self.parse_mode.as_deref(),
        }
    }

    async fn send_message(&self, body: &SendMessageRequest<'_>) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(body)
            .send()
            .await
            // The request URL embeds the bot token
            .map_err(|e| DeliveryError::Transport(e.without_url()))?;

        read_result::<serde_json::Value>(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DeliveryGateway for TelegramGateway {
    #[tracing::instrument(name = "telegram.send_message", skip(self, text))]
    async fn deliver(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        self.send_message(&self.send_message_body(chat_id, text))
            .await
    }

    #[tracing::instrument(name = "telegram.send_message", skip(self, text))]
    async fn deliver_plain(&self, chat_id: ChatId, text: &str) -> Result<(), DeliveryError> {
        let body = SendMessageRequest {
            parse_mode: None,
            ..self.send_message_body(chat_id, text)
        };
        self.send_message(&body).await
    }
}

/// Unwrap the Bot API envelope, turning `ok: false` and non-2xx statuses into errors.
async fn read_result<T>(response: reqwest::Response) -> Result<T, DeliveryError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DeliveryError::Transport(e.without_url()))?;

    let envelope: Option<ApiResponse<T>> = serde_json::from_str(&body).ok();

    match envelope {
        Some(ApiResponse {
            ok: true,
            result: Some(result),
            ..
        }) if status.is_success() => Ok(result),
        Some(ApiResponse { description, .. }) if !status.is_success() || description.is_some() => {
            Err(DeliveryError::Api {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| status.to_string()),
            })
        }
        _ if !status.is_success() => Err(DeliveryError::Api {
            status: status.as_u16(),
            description: body,
        }),
        _ => Err(DeliveryError::InvalidResponse(body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(parse_mode: &str) -> TelegramGateway {
        let config = TelegramConfig {
            token: "123:abc".to_string(),
            api_base_url: "http://localhost:8081/".to_string(),
            parse_mode: parse_mode.to_string(),
            ..TelegramConfig::default()
        };
        TelegramGateway::new(&config).unwrap()
    }

    #[test]
    fn test_method_url() {
        assert_eq!(
            gateway("Markdown").method_url("sendMessage"),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_send_message_body_with_parse_mode() {
        let gateway = gateway("Markdown");
        let body = serde_json::to_value(gateway.send_message_body(-100, "hello")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({"chat_id": -100, "text": "hello", "parse_mode": "Markdown"})
        );
    }

    #[test]
    fn test_send_message_body_without_parse_mode() {
        let gateway = gateway("  ");
        let body = serde_json::to_value(gateway.send_message_body(111, "plain")).unwrap();

        assert_eq!(body, serde_json::json!({"chat_id": 111, "text": "plain"}));
    }
}
