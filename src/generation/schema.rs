//! FAQ record schema and model-output parsing
//!
//! Model output is accepted as a bare JSON array of records or as an object
//! with a `faqs` array, optionally wrapped in a Markdown code fence. One
//! record that fails the schema fails the whole response.
//!
//! # Field Bounds
//!
//! | Field | Bound |
//! |-------|-------|
//! | `question` | 10-200 characters |
//! | `answer` | 20-1000 characters |
//! | `confidence` | 0.0-1.0 |
//! | `sourceUrl` | absolute URL |
//! | `metadata.relevance` | 0.0-1.0 |
//! | `metadata.category` | one of [`FaqCategory`] |

use crate::FaqError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;
use url::Url;

const QUESTION_CHARS: RangeInclusive<usize> = 10..=200;
const ANSWER_CHARS: RangeInclusive<usize> = 20..=1000;

/// Topic bucket assigned by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaqCategory {
    Product,
    Service,
    Technical,
    Support,
    Pricing,
    Other,
}

impl FaqCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaqCategory::Product => "product",
            FaqCategory::Service => "service",
            FaqCategory::Technical => "technical",
            FaqCategory::Support => "support",
            FaqCategory::Pricing => "pricing",
            FaqCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqMetadata {
    pub relevance: f64,
    pub category: FaqCategory,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One validated question/answer pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqRecord {
    pub question: String,
    pub answer: String,
    pub confidence: f64,
    pub source_url: String,
    /// Title of the source page
    pub source_page: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FaqMetadata>,
}

impl FaqRecord {
    /// Checks every field bound, returning a description of the first violation
    pub fn validate(&self) -> Result<(), String> {
        check_length("question", &self.question, QUESTION_CHARS)?;
        check_length("answer", &self.answer, ANSWER_CHARS)?;
        check_unit_interval("confidence", self.confidence)?;

        Url::parse(&self.source_url)
            .map_err(|e| format!("sourceUrl '{}' is not a valid URL: {}", self.source_url, e))?;

        if let Some(metadata) = &self.metadata {
            check_unit_interval("metadata.relevance", metadata.relevance)?;
        }

        Ok(())
    }
}

fn check_length(field: &str, value: &str, bounds: RangeInclusive<usize>) -> Result<(), String> {
    let chars = value.chars().count();
    if bounds.contains(&chars) {
        Ok(())
    } else {
        Err(format!(
            "{} must be {}-{} characters, got {}",
            field,
            bounds.start(),
            bounds.end(),
            chars
        ))
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be between 0 and 1, got {}", field, value))
    }
}

/// Removes a surrounding Markdown code fence (with optional language tag)
///
/// # Examples
///
/// ```
/// use faqsmith::generation::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```json\n[]\n```"), "[]");
/// assert_eq!(strip_code_fence("  []  "), "[]");
/// ```
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parses and validates raw model output into FAQ records
///
/// Malformed JSON yields [`FaqError::ResponseParse`]; a record that does not
/// match the schema yields [`FaqError::SchemaViolation`]. Both carry `raw`.
pub fn parse_response(raw: &str) -> Result<Vec<FaqRecord>, FaqError> {
    let value: Value =
        serde_json::from_str(strip_code_fence(raw)).map_err(|e| FaqError::ResponseParse {
            message: format!("response is not valid JSON: {}", e),
            raw: raw.to_string(),
        })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("faqs") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(FaqError::SchemaViolation {
                    message: "expected a 'faqs' array".to_string(),
                    raw: raw.to_string(),
                })
            }
        },
        _ => {
            return Err(FaqError::SchemaViolation {
                message: "expected a JSON array or an object with 'faqs'".to_string(),
                raw: raw.to_string(),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let record: FaqRecord =
                serde_json::from_value(item).map_err(|e| FaqError::SchemaViolation {
                    message: format!("record {}: {}", index, e),
                    raw: raw.to_string(),
                })?;

            record.validate().map_err(|message| FaqError::SchemaViolation {
                message: format!("record {}: {}", index, message),
                raw: raw.to_string(),
            })?;

            Ok(record)
        })
        .collect()
}
