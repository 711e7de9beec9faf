use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Session expired, redirected to {0}")]
    SessionExpired(String),

    #[error("No results heading and no listings on {0}")]
    UnrecognizedPage(String),
}

impl From<reqwest::Error> for ScraperError {
    fn from(e: reqwest::Error) -> Self {
        ScraperError::Network(e.to_string())
    }
}
