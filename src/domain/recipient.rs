// src/domain/recipient.rs

use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use url::Url;

/// A subscriber: who gets notified, and for which search.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecipientConfig {
    #[serde(alias = "conf_title")]
    pub label: String,
    #[serde(deserialize_with = "chat_id")]
    pub telegram_id: String,
    pub search_url: Url,
    #[serde(default)]
    pub ignored_ids: HashSet<u64>,
}

impl RecipientConfig {
    pub fn new(label: impl Into<String>, telegram_id: impl Into<String>, search_url: Url) -> Self {
        Self {
            label: label.into(),
            telegram_id: telegram_id.into(),
            search_url,
            ignored_ids: HashSet::new(),
        }
    }
}

/// Telegram chat ids are integers, but people also write them as strings.
fn chat_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ChatId {
        Text(String),
        Number(i64),
    }

    Ok(match ChatId::deserialize(deserializer)? {
        ChatId::Text(id) => id,
        ChatId::Number(id) => id.to_string(),
    })
}
