// src/tests/utils.rs

use crate::domain::{Listing, Price, SearchResults};
use crate::notifications::{MessageSender, ParseMode, TelegramError};
use crate::scraper::{PageFetcher, ScraperError};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use url::Url;

pub const SEARCH_URL: &str = "https://trouverunlogement.lescrous.fr/tools/36/search?bounds=1_2_3_4";

pub fn search_url() -> Url {
    Url::parse(SEARCH_URL).unwrap()
}

pub fn other_search_url() -> Url {
    Url::parse("https://trouverunlogement.lescrous.fr/tools/36/search?bounds=5_6_7_8").unwrap()
}

/// The results heading the way the site renders it.
pub fn count_heading(text: &str) -> String {
    format!(r#"<h2 class="SearchResults-desktop fr-h4 svelte-11sc5my">{text}</h2>"#)
}

/// A full listing card. `href` goes on the title link, `price` in the badge.
pub fn card(title: Option<&str>, href: Option<&str>, price: Option<&str>) -> String {
    let title = match (title, href) {
        (Some(t), Some(h)) => format!(r#"<h3 class="fr-card__title"><a href="{h}">{t}</a></h3>"#),
        (Some(t), None) => format!(r#"<h3 class="fr-card__title">{t}</h3>"#),
        (None, _) => String::new(),
    };
    let badge = price
        .map(|p| format!(r#"<p class="fr-badge">{p}</p>"#))
        .unwrap_or_default();

    format!(
        r#"<div class="fr-card">
            <div class="fr-card__body">
                <div class="fr-card__content">
                    {title}
                    <p class="fr-card__desc">12 Rue de la Madeleine 69007 Lyon</p>
                    <div class="fr-card__start">
                        <p class="fr-card__detail">Individuel</p>
                        <p class="fr-card__detail">18 m²</p>
                    </div>
                </div>
            </div>
            <div class="fr-card__header">
                <div class="fr-card__img">
                    <img class="fr-responsive-img" src="https://trouverunlogement.lescrous.fr/photos/1.jpg" alt="">
                </div>
                {badge}
            </div>
        </div>"#
    )
}

pub fn card_with_id(id: u64, title: &str) -> String {
    let href = format!("/tools/36/accommodations/{id}");
    card(Some(title), Some(&href), Some("650 €"))
}

pub fn page(heading: Option<&str>, cards: &[String]) -> String {
    let heading = heading.map(count_heading).unwrap_or_default();
    format!(
        "<html><body><main>{heading}<div class=\"fr-grid-row\">{}</div></main></body></html>",
        cards.join("\n")
    )
}

pub fn listing(id: Option<u64>, title: &str, price: Option<Price>) -> Listing {
    Listing {
        id,
        title: Some(title.to_string()),
        url: id.map(|id| {
            Url::parse(&format!(
                "https://trouverunlogement.lescrous.fr/tools/36/accommodations/{id}"
            ))
            .unwrap()
        }),
        price,
        overview_details: "12 Rue de la Madeleine 69007 Lyon".to_string(),
        image_url: None,
    }
}

pub fn results(listings: Vec<Listing>) -> SearchResults {
    SearchResults {
        search_url: search_url(),
        count: Some(listings.len() as u32),
        listings,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
}

/// Records every message instead of talking to Telegram.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: RefCell<Vec<SentMessage>>,
    pub failing_chats: HashSet<String>,
}

impl RecordingSender {
    pub fn failing_for(chat_id: &str) -> Self {
        Self {
            failing_chats: HashSet::from([chat_id.to_string()]),
            ..Default::default()
        }
    }

    pub fn sent_to(&self, chat_id: &str) -> Vec<SentMessage> {
        self.sent
            .borrow()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl MessageSender for RecordingSender {
    fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TelegramError> {
        if self.failing_chats.contains(chat_id) {
            return Err(TelegramError::Api(format!("chat {chat_id} not found")));
        }

        self.sent.borrow_mut().push(SentMessage {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            parse_mode,
        });
        Ok(())
    }
}

pub enum FakePage {
    Html(String),
    Down,
    Expired,
    Panic,
}

/// Serves canned pages by URL and counts what the poller asked for.
#[derive(Default)]
pub struct ScriptedFetcher {
    pub pages: HashMap<String, FakePage>,
    pub fetched: Vec<String>,
    pub authentications: usize,
}

impl ScriptedFetcher {
    pub fn with_page(mut self, url: &Url, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }
}

impl PageFetcher for ScriptedFetcher {
    fn authenticate(&mut self) -> Result<(), ScraperError> {
        self.authentications += 1;
        // Renewing the session fixes expired pages.
        for served in self.pages.values_mut() {
            if matches!(served, FakePage::Expired) {
                *served = FakePage::Html(page(Some("Aucun logement"), &[]));
            }
        }
        Ok(())
    }

    fn fetch(&mut self, url: &Url) -> Result<String, ScraperError> {
        self.fetched.push(url.to_string());

        match self.pages.get(url.as_str()) {
            Some(FakePage::Html(html)) => Ok(html.clone()),
            Some(FakePage::Down) | None => {
                Err(ScraperError::Network(format!("connection refused: {url}")))
            }
            Some(FakePage::Expired) => Err(ScraperError::SessionExpired(
                "https://www.messervices.etudiant.gouv.fr/envole/oauth2/login".to_string(),
            )),
            Some(FakePage::Panic) => panic!("renderer crashed on {url}"),
        }
    }
}
