//! Domain data types for the scraping pipeline.

pub mod company;
pub mod config;
pub mod job;
pub mod step;
