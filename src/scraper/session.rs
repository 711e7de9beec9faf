// session.rs
use crate::scraper::ScraperError;
use reqwest::blocking::{Client, Response};
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

pub const DEFAULT_LOGIN_URL: &str = "https://www.messervices.etudiant.gouv.fr/envole/oauth2/login";
const RULES_URL: &str = "https://trouverunlogement.lescrous.fr/tools/36/rules";
const CONNECT_URL: &str = "https://trouverunlogement.lescrous.fr/mse/discovery/connect";

/// Source of rendered search pages.
pub trait PageFetcher {
    /// (Re)establishes the authenticated session.
    fn authenticate(&mut self) -> Result<(), ScraperError>;

    /// Returns the markup of `url` as seen by the authenticated session.
    fn fetch(&mut self, url: &Url) -> Result<String, ScraperError>;
}

pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A cookie-carrying HTTP session logged into the student services SSO.
pub struct CrousSession {
    client: Client,
    credentials: Credentials,
    login_url: Url,
    delay: Duration,
}

impl CrousSession {
    pub fn new(credentials: Credentials, login_url: Url, delay: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            credentials,
            login_url,
            delay,
        })
    }

    fn get(&self, url: &str) -> Result<(Url, String), ScraperError> {
        let resp = self.client.get(url).send()?;
        let page = read_page(resp)?;
        std::thread::sleep(self.delay);
        Ok(page)
    }

    fn submit(&self, form: &HtmlForm) -> Result<(Url, String), ScraperError> {
        let resp = self
            .client
            .post(form.action.clone())
            .form(&form.fields)
            .send()?;
        let page = read_page(resp)?;
        std::thread::sleep(self.delay);
        Ok(page)
    }

    fn validate_rules(&self) -> Result<(), ScraperError> {
        tracing::info!("Validating the rules of the CROUS website");
        let (url, html) = self.get(RULES_URL)?;

        // Already validated on an earlier login.
        let Some(form) = find_form(&html, &url, "button[name=\"searchSubmit\"]") else {
            tracing::debug!("No rules form on {url}, skipping");
            return Ok(());
        };

        self.submit(&form)?;
        Ok(())
    }
}

impl PageFetcher for CrousSession {
    fn authenticate(&mut self) -> Result<(), ScraperError> {
        tracing::info!("🔐 Authenticating to the CROUS website...");

        // Step 1: login page, which offers several identity providers
        tracing::info!("Going to the login page: {}", self.login_url);
        let (url, html) = self.get(self.login_url.as_str())?;

        // Step 2: student services account
        let provider = find_link(&html, &url, "a.loginapp-button").ok_or_else(|| {
            ScraperError::Authentication("login provider button not found".into())
        })?;
        tracing::info!("Choosing the correct authentication method");
        let (url, html) = self.get(provider.as_str())?;

        // Step 3: credentials
        let mut form = find_form(&html, &url, "input[name=\"j_username\"]").ok_or_else(|| {
            ScraperError::Authentication("credentials form not found".into())
        })?;
        form.set("j_username", &self.credentials.email);
        form.set("j_password", &self.credentials.password);

        tracing::info!("Submitting the form");
        let (url, html) = self.submit(&form)?;
        if find_form(&html, &url, "input[name=\"j_password\"]").is_some() {
            return Err(ScraperError::Authentication(
                "credentials rejected by the login form".into(),
            ));
        }

        // Step 4: rules, then force the site to pick up the new session
        self.validate_rules()?;
        self.get(CONNECT_URL)?;

        tracing::info!("✅ Successfully authenticated to the CROUS website");
        Ok(())
    }

    fn fetch(&mut self, url: &Url) -> Result<String, ScraperError> {
        tracing::info!("Getting accommodations from the search URL: {url}");
        let (final_url, html) = self.get(url.as_str())?;

        if final_url.host_str() != url.host_str() {
            return Err(ScraperError::SessionExpired(final_url.to_string()));
        }

        Ok(html)
    }
}

fn read_page(resp: Response) -> Result<(Url, String), ScraperError> {
    let status = resp.status();
    let url = resp.url().clone();

    if !status.is_success() {
        return Err(ScraperError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let text = resp.text()?;
    Ok((url, text))
}

/// A form found on a page, ready to be posted back.
#[derive(Debug, PartialEq)]
pub struct HtmlForm {
    pub action: Url,
    pub fields: Vec<(String, String)>,
}

impl HtmlForm {
    pub fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(field) => field.1 = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }
}

/// The first `<form>` containing an element matching `marker`, with all of
/// its named inputs (plus the marker itself when it is named) and its action
/// resolved against `base`.
pub fn find_form(html: &str, base: &Url, marker: &str) -> Option<HtmlForm> {
    let document = Html::parse_document(html);
    let forms = Selector::parse("form").ok()?;
    let marker = Selector::parse(marker).ok()?;
    let inputs = Selector::parse("input[name]").ok()?;

    let form = document
        .select(&forms)
        .find(|form| form.select(&marker).next().is_some())?;

    let action = match form.value().attr("action") {
        Some(action) if !action.trim().is_empty() => base.join(action.trim()).ok()?,
        _ => base.clone(),
    };

    let mut fields: Vec<(String, String)> = form
        .select(&inputs)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    // A clicked submit button posts its own name=value pair.
    if let Some(trigger) = form.select(&marker).next() {
        if let Some(name) = trigger.value().attr("name") {
            if !fields.iter().any(|(n, _)| n == name) {
                let value = trigger.value().attr("value").unwrap_or_default();
                fields.push((name.to_string(), value.to_string()));
            }
        }
    }

    Some(HtmlForm { action, fields })
}

pub fn find_link(html: &str, base: &Url, css: &str) -> Option<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(css).ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?;
    base.join(href.trim()).ok()
}
