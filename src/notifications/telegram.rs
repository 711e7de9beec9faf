// src/notifications/telegram.rs

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: {0}")]
    Api(String),
}

/// Formatting mode passed to `sendMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// Outbound messaging transport.
pub trait MessageSender {
    fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TelegramError>;
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub username: Option<String>,
}

pub struct TelegramBot {
    token: String,
    client: Client,
}

impl TelegramBot {
    pub fn new(token: String) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TelegramError::RequestFailed(e.to_string()))?;

        Ok(Self { token, client })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    /// Checks the token by asking the API who we are.
    pub fn get_me(&self) -> Result<BotUser, TelegramError> {
        let resp = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .map_err(|e| TelegramError::RequestFailed(without_token(e)))?;

        let body: ApiResponse<BotUser> = resp
            .json()
            .map_err(|e| TelegramError::RequestFailed(without_token(e)))?;

        match body {
            ApiResponse {
                ok: true,
                result: Some(user),
                ..
            } => Ok(user),
            ApiResponse { description, .. } => Err(TelegramError::Api(
                description.unwrap_or_else(|| "getMe failed".to_string()),
            )),
        }
    }
}

impl MessageSender for TelegramBot {
    fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TelegramError> {
        let payload = SendMessagePayload {
            chat_id,
            text,
            parse_mode,
            disable_web_page_preview: true,
        };

        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .map_err(|e| TelegramError::RequestFailed(without_token(e)))?;

        let status = resp.status();
        let body: ApiResponse<serde_json::Value> = resp
            .json()
            .map_err(|e| TelegramError::RequestFailed(without_token(e)))?;

        if !status.is_success() || !body.ok {
            return Err(TelegramError::Api(format!(
                "sendMessage to {chat_id} failed ({status}): {}",
                body.description.unwrap_or_default()
            )));
        }

        Ok(())
    }
}

/// reqwest errors carry the request URL, which embeds the bot token.
fn without_token(e: reqwest::Error) -> String {
    e.without_url().to_string()
}
