//! Configuration module for Faqsmith
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Credentials are never read from the file; callers place them on the loaded
//! [`Config`] before connecting to a backend.
//!
//! # Example
//!
//! ```no_run
//! use faqsmith::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("faqsmith.toml")).unwrap();
//! println!("Page budget: {}", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, GenerationConfig, LocalEngine, RendererConfig, RetryConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_page_budget, MAX_PAGE_BUDGET};
