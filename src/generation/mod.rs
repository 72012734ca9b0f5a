//! FAQ generation
//!
//! This module turns crawled pages into confidence-scored FAQ records:
//! - A [`TextGenerator`] seam plus an OpenAI-compatible client
//! - Prompt assembly over the combined page content
//! - Schema validation of the model output
//! - The pipeline that filters records and computes statistics

mod client;
mod pipeline;
mod prompt;
mod schema;

pub use client::{CompletionRequest, OpenAiClient, TextGenerator};
pub use pipeline::{
    estimate_tokens, generate_faqs, GenerationOptions, GenerationReport, GenerationStats,
};
pub use prompt::{build_user_prompt, combine_content, PAGE_DELIMITER, SYSTEM_PROMPT};
pub use schema::{parse_response, strip_code_fence, FaqCategory, FaqMetadata, FaqRecord};
