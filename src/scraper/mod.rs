mod parser;
mod scraper_error;
mod session;

pub use parser::{listing_id_from_url, parse_count_token, parse_price, ListingParser};
pub use scraper_error::ScraperError;
pub use session::{find_form, find_link, Credentials, CrousSession, PageFetcher, DEFAULT_LOGIN_URL};
