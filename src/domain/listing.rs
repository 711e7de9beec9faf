// src/domain/listing.rs

use std::fmt;
use url::Url;

/// Price as shown on a listing badge.
///
/// The site usually renders an amount ("650 €") but sometimes free text
/// ("Loyer non communiqué"), which is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Price {
    Amount(f64),
    Text(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(amount) if amount.fract() == 0.0 => write!(f, "{amount:.0}€"),
            Price::Amount(amount) => write!(f, "{amount:.2}€"),
            Price::Text(text) => write!(f, "{text}"),
        }
    }
}

/// One accommodation card from the first results page.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// Site-assigned id, taken from the trailing segment of the detail link.
    pub id: Option<u64>,
    pub title: Option<String>,
    pub url: Option<Url>,
    pub price: Option<Price>,
    /// Address first, then one line per attribute.
    pub overview_details: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub search_url: Url,
    /// `None` when the count heading is missing or unreadable.
    /// `Some(0)` means the site reported no results.
    pub count: Option<u32>,
    /// Only the first page is read, so this may be shorter than `count`.
    pub listings: Vec<Listing>,
}
