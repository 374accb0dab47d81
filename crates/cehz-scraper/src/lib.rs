//! Scrape pipeline for the CEHZ portal summary page:
//! session-authenticated fetch, charset normalization, and table extraction.

mod encoding;
mod error;
mod extract;
mod session;

pub use encoding::normalize;
pub use error::ScrapeError;
pub use extract::extract_records;
pub use session::SessionClient;
