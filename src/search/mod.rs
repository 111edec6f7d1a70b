//! Restaurant search pipeline
//!
//! - composer: builds the prompt and retrieval configuration
//! - extractor: parses the fenced JSON answer into restaurants
//! - client: runs one search against an injected completion service

pub mod client;
pub mod composer;
pub mod extractor;

pub use client::{CompletionService, RestaurantSearchClient};
pub use composer::{RequestComposer, RetrievalConfig, RetrievalTool, SearchRequest};
pub use extractor::ResponseExtractor;
