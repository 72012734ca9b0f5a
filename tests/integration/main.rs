//! Integration tests for Faqsmith
//!
//! These tests run the HTTP renderer, the generation client and the full
//! pipeline against wiremock servers.

mod crawl_tests;
mod generation_tests;
mod pipeline_tests;
mod render_tests;
