//! The scrape → discover → extract → persist pipeline.

pub mod batch;
pub mod discover;
pub mod extract;
pub mod fetch;
pub mod persist;
pub mod runner;

pub use runner::{ScrapePipeline, ScrapeSummary};
