// src/notifications/builder.rs

use crate::domain::{Listing, SearchResults};
use crate::notifications::ParseMode;
use maud::{html, Markup};
use std::collections::HashSet;

const ACCOMMODATION_BASE_URL: &str =
    "https://trouverunlogement.lescrous.fr/tools/36/accommodations/";
const BRIDGES_URL: &str = "https://fr.wikipedia.org/wiki/Liste_de_ponts_de_France";

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub parse_mode: ParseMode,
}

/// Turns search results into a Telegram message, or decides to stay quiet.
#[derive(Debug, Clone, Default)]
pub struct NotificationBuilder {
    pub notify_when_no_results: bool,
}

impl NotificationBuilder {
    pub fn new(notify_when_no_results: bool) -> Self {
        Self {
            notify_when_no_results,
        }
    }

    /// Listings whose id is in `ignored_ids` are left out entirely, including
    /// from the count in the header.
    pub fn search_results_notification(
        &self,
        results: &SearchResults,
        ignored_ids: &HashSet<u64>,
    ) -> Option<Notification> {
        let listings: Vec<&Listing> = results
            .listings
            .iter()
            .filter(|l| l.id.map_or(true, |id| !ignored_ids.contains(&id)))
            .collect();

        if listings.is_empty() && !self.notify_when_no_results {
            return None;
        }

        let markup = if listings.is_empty() {
            no_results_message(results)
        } else {
            listings_message(&listings, results)
        };

        Some(Notification {
            message: markup.into_string(),
            parse_mode: ParseMode::Html,
        })
    }
}

fn no_results_message(results: &SearchResults) -> Markup {
    html! {
        "Aucun logement trouvé. Voici une liste des ponts de France où vous pourriez dormir : "
        (BRIDGES_URL)
        "\n\n" (results.search_url.as_str())
    }
}

fn listings_message(listings: &[&Listing], results: &SearchResults) -> Markup {
    let n = listings.len();
    let (s, verb) = if n > 1 { ("s", "sont") } else { ("", "est") };

    html! {
        "Bonne nouvelle 😯, " (n) " logement" (s) " " (verb) " disponible" (s) " :"
        @for listing in listings {
            "\n\n" (listing_entry(listing))
        }
        "\n\n" (results.search_url.as_str())
    }
}

fn listing_entry(listing: &Listing) -> Markup {
    let title = listing.title.as_deref().unwrap_or("Logement");

    html! {
        @match accommodation_link(listing) {
            Some(link) => { a href=(link) { b { (title) } } },
            None => { b { (title) } },
        }
        @if let Some(price) = &listing.price {
            " (" (price.to_string()) ")"
        }
    }
}

fn accommodation_link(listing: &Listing) -> Option<String> {
    match (listing.id, &listing.url) {
        (Some(id), _) => Some(format!("{ACCOMMODATION_BASE_URL}{id}")),
        (None, Some(url)) => Some(url.to_string()),
        (None, None) => None,
    }
}
