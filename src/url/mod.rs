//! URL handling module for Faqsmith
//!
//! This module provides URL normalization, host extraction and the link
//! scope rules that keep a crawl on a single site.

mod domain;
mod normalize;
mod scope;

pub use domain::{extract_domain, same_host};
pub use normalize::{normalize_parsed, normalize_url};
pub use scope::{LinkScope, ScopeRules, EXCLUDED_EXTENSIONS};
