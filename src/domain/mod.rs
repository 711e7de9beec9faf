mod listing;
mod recipient;

pub use listing::{Listing, Price, SearchResults};
pub use recipient::RecipientConfig;
