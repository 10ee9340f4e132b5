//! Core trait abstractions (scrape provider, structured model, store).

pub mod model;
pub mod scraper;
pub mod store;
