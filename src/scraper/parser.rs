// parser.rs
use crate::domain::{Listing, Price, SearchResults};
use crate::scraper::ScraperError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// First token of the count heading when the search has no results.
const NO_RESULTS_WORD: &str = "Aucun";

/// Extracts the result count and listing cards from a search results page.
///
/// Holds pre-compiled selectors; parsing itself never fails. Anything the
/// page does not provide comes back as `None` instead of an error.
pub struct ListingParser {
    count_heading: Selector,
    card: Selector,
    card_title: Selector,
    link: Selector,
    image: Selector,
    address: Selector,
    detail: Selector,
    badge: Selector,
}

impl ListingParser {
    pub fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            count_heading: selector("h2.SearchResults-desktop")?,
            card: selector("div.fr-card")?,
            card_title: selector("h3.fr-card__title")?,
            link: selector("a")?,
            image: selector("img.fr-responsive-img")?,
            address: selector("p.fr-card__desc")?,
            detail: selector("p.fr-card__detail")?,
            badge: selector("p.fr-badge")?,
        })
    }

    pub fn parse(&self, html: &str, search_url: &Url) -> SearchResults {
        let document = Html::parse_document(html);
        self.parse_document(&document, search_url)
    }

    pub fn parse_document(&self, document: &Html, search_url: &Url) -> SearchResults {
        SearchResults {
            search_url: search_url.clone(),
            count: self.results_count(document),
            listings: self.listings(document, search_url),
        }
    }

    fn results_count(&self, document: &Html) -> Option<u32> {
        let heading = document.select(&self.count_heading).next()?;
        let text = heading.text().collect::<String>();
        parse_count_token(text.split_whitespace().next()?)
    }

    fn listings(&self, document: &Html, base: &Url) -> Vec<Listing> {
        document
            .select(&self.card)
            .filter_map(|card| self.parse_card(card, base))
            .collect()
    }

    /// Returns `None` only for cards without a title.
    pub fn parse_card(&self, card: ElementRef<'_>, base: &Url) -> Option<Listing> {
        let title_el = card.select(&self.card_title).next()?;
        let title = element_text(title_el);

        let url = title_el
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| base.join(href.trim()).ok());
        let id = url.as_ref().and_then(listing_id_from_url);

        let image_url = card
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string);

        let overview_details = card
            .select(&self.address)
            .take(1)
            .chain(card.select(&self.detail))
            .map(element_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let price = card
            .select(&self.badge)
            .next()
            .and_then(|badge| parse_price(&element_text(badge)));

        Some(Listing {
            id,
            title: Some(title),
            url,
            price,
            overview_details,
            image_url,
        })
    }
}

fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::HtmlParse(format!("{css}: {e}")))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub fn parse_count_token(token: &str) -> Option<u32> {
    if token == NO_RESULTS_WORD {
        return Some(0);
    }
    token.parse().ok()
}

/// Last non-empty path segment of a detail link, e.g. `.../accommodations/2345`.
pub fn listing_id_from_url(url: &Url) -> Option<u64> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?
        .parse()
        .ok()
}

/// "650 €", "€650" and "1 234,50 €" become amounts; anything else is kept as text.
pub fn parse_price(raw: &str) -> Option<Price> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let normalized: String = raw
        .trim_matches('€')
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match normalized.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Some(Price::Amount(amount)),
        _ => Some(Price::Text(raw.to_string())),
    }
}
