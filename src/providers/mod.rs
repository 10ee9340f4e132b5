//! Concrete provider implementations (Firecrawl, OpenAI).

pub mod firecrawl;
pub mod openai;

pub use firecrawl::FirecrawlScraper;
pub use openai::OpenAiModel;
