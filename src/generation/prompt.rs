//! Prompt assembly for FAQ generation

use crate::crawler::ScrapedPage;

/// Separator placed between pages in the combined document
pub const PAGE_DELIMITER: &str = "\n\n---\n\n";

/// Fixed instructions sent as the system message
pub const SYSTEM_PROMPT: &str = "You are an expert at writing FAQ sections for websites. \
You read website content and extract the questions real visitors ask, answered strictly \
from that content.

Rules:
- Only use information that is stated in the provided content. Never invent facts, prices or policies.
- Write natural questions the way a customer would phrase them. Do not repeat the same question in different words.
- Keep answers concise, accurate and self-contained, and cite the page each answer comes from.
- Prioritize product, pricing, technical and support topics over general marketing copy.
- Assign each FAQ a confidence between 0 and 1 reflecting how directly the content supports the answer.
- Categorize each FAQ and rate its relevance to visitors between 0 and 1.
- Respond with JSON only.";

/// Joins pages into one document, in the order given
///
/// Each page is rendered as `Page: <title>`, `URL: <url>`, a blank line and
/// its content.
pub fn combine_content(pages: &[ScrapedPage]) -> String {
    pages
        .iter()
        .map(|page| format!("Page: {}\nURL: {}\n\n{}", page.title, page.url, page.content))
        .collect::<Vec<_>>()
        .join(PAGE_DELIMITER)
}

/// Builds the user message around the combined content
pub fn build_user_prompt(combined_content: &str, max_faqs: usize) -> String {
    format!(
        r#"Generate up to {max_faqs} frequently asked questions from the website content below.

Return a JSON object of this exact shape:
{{
  "faqs": [
    {{
      "question": "10 to 200 characters",
      "answer": "20 to 1000 characters",
      "confidence": 0.0,
      "sourceUrl": "URL of the page the answer comes from",
      "sourcePage": "title of that page",
      "metadata": {{
        "relevance": 0.0,
        "category": "product | service | technical | support | pricing | other",
        "keywords": ["keyword"]
      }}
    }}
  ]
}}

Website content:

{combined_content}"#
    )
}
