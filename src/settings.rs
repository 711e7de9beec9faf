// src/settings.rs

use crate::domain::RecipientConfig;
use crate::errors::ConfigError;
use crate::scraper::DEFAULT_LOGIN_URL;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Search used when no recipients file is configured: Lyon, around the campus.
pub const DEFAULT_SEARCH_URL: &str = "https://trouverunlogement.lescrous.fr/tools/36/search?bounds=4.861955965058465_45.794100252988855_4.8859456424876635_45.76704397585394";

const REQUIRED: [&str; 3] = ["MSE_EMAIL", "MSE_PASSWORD", "TELEGRAM_BOT_TOKEN"];

#[derive(Debug, Clone)]
pub struct Settings {
    pub mse_email: String,
    pub mse_password: String,
    pub telegram_bot_token: String,
    pub mse_login_url: Url,
    pub poll_interval: Duration,
    pub navigation_delay: Duration,
    pub notify_when_no_results: bool,
    pub recipients: Vec<RecipientConfig>,
}

impl Settings {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut missing: Vec<String> = REQUIRED
            .iter()
            .filter(|name| var(**name).is_none())
            .map(|name| name.to_string())
            .collect();

        let recipients = match load_recipients(&var)? {
            Some(recipients) => recipients,
            None => {
                missing.push("MY_TELEGRAM_ID".to_string());
                Vec::new()
            }
        };

        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let mse_login_url = match var("MSE_LOGIN_URL") {
            Some(raw) => parse_url("MSE_LOGIN_URL", &raw)?,
            None => parse_url("MSE_LOGIN_URL", DEFAULT_LOGIN_URL)?,
        };

        Ok(Self {
            mse_email: var("MSE_EMAIL").unwrap_or_default(),
            mse_password: var("MSE_PASSWORD").unwrap_or_default(),
            telegram_bot_token: var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            mse_login_url,
            poll_interval: Duration::from_secs(parse_secs(&var, "POLL_INTERVAL_SECS", 600)?),
            navigation_delay: Duration::from_secs(parse_secs(&var, "NAVIGATION_DELAY_SECS", 2)?),
            notify_when_no_results: parse_flag(&var, "NOTIFY_WHEN_NO_RESULTS")?,
            recipients,
        })
    }
}

/// `RECIPIENTS_JSON`, then `RECIPIENTS_FILE`, then a single recipient from
/// `MY_TELEGRAM_ID`. `None` if none of them is set.
fn load_recipients<F>(var: &F) -> Result<Option<Vec<RecipientConfig>>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(json) = var("RECIPIENTS_JSON") {
        return Ok(Some(serde_json::from_str(&json)?));
    }

    if let Some(path) = var("RECIPIENTS_FILE") {
        let path = PathBuf::from(path);
        let json = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::RecipientsFile { path, source })?;
        return Ok(Some(serde_json::from_str(&json)?));
    }

    match var("MY_TELEGRAM_ID") {
        Some(id) => {
            let search_url = parse_url("DEFAULT_SEARCH_URL", DEFAULT_SEARCH_URL)?;
            Ok(Some(vec![RecipientConfig::new("Me", id, search_url)]))
        }
        None => Ok(None),
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn parse_secs<F>(var: &F, name: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            reason: format!("expected a number of seconds, got {raw:?}"),
        }),
        None => Ok(default),
    }
}

fn parse_flag<F>(var: &F, name: &str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("false" | "0" | "no") => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some(other) => Err(ConfigError::Invalid {
            name: name.to_string(),
            reason: format!("expected true/false, got {other:?}"),
        }),
    }
}
