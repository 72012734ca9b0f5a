//! Markdown FAQ generation
//!
//! This module renders a pipeline report as a human-readable Markdown
//! document: run information, the accepted FAQs grouped by category, and the
//! pages that were crawled.

use crate::output::PipelineReport;
use crate::FaqError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Heading used for FAQs that carry no category
const UNCATEGORIZED: &str = "General";

/// Writes the Markdown rendering of `report` to `output_path`
pub fn write_markdown(report: &PipelineReport, output_path: &Path) -> Result<(), FaqError> {
    let markdown = format_markdown(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a pipeline report as markdown
pub fn format_markdown(report: &PipelineReport) -> String {
    let scrape = &report.scrape;
    let mut md = String::new();

    md.push_str(&format!("# FAQ: {}\n\n", scrape.url));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Scrape ID**: {}\n", scrape.id));
    md.push_str(&format!("- **Status**: {}\n", scrape.status.as_str()));
    md.push_str(&format!(
        "- **Pages Scraped**: {} / {}\n",
        scrape.metadata.pages_scraped, scrape.metadata.max_pages
    ));
    if let Some(renderer) = &scrape.metadata.renderer {
        md.push_str(&format!("- **Renderer**: {}\n", renderer));
    }
    if let Some(completed) = scrape.completed_at {
        md.push_str(&format!("- **Completed**: {}\n", completed.to_rfc3339()));
    }
    if let Some(hash) = &scrape.metadata.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    if let Some(error) = &scrape.metadata.error {
        md.push_str(&format!("- **Error**: {}\n", error));
    }
    md.push('\n');

    if let Some(faq) = &report.faq {
        md.push_str("## Generation\n\n");
        md.push_str(&format!("- **Status**: {}\n", faq.status.as_str()));
        md.push_str(&format!("- **Model**: {}\n", faq.metadata.model));
        md.push_str(&format!("- **FAQs**: {}\n", faq.faqs.len()));
        md.push_str(&format!(
            "- **Average Confidence**: {:.2}\n",
            faq.metadata.average_confidence
        ));
        md.push_str(&format!(
            "- **Filtered (low confidence)**: {}\n",
            faq.metadata.filtered_low_confidence
        ));
        md.push_str(&format!(
            "- **Estimated Tokens**: {}\n",
            faq.metadata.total_tokens
        ));
        if let Some(error) = &faq.error {
            md.push_str(&format!("- **Error**: {}\n", error));
        }
        md.push('\n');

        // Group by category, in order of first appearance
        let mut sections: Vec<(&str, Vec<_>)> = Vec::new();
        for record in &faq.faqs {
            let category = record
                .metadata
                .as_ref()
                .map_or(UNCATEGORIZED, |m| m.category.as_str());

            match sections.iter_mut().find(|(name, _)| *name == category) {
                Some((_, records)) => records.push(record),
                None => sections.push((category, vec![record])),
            }
        }

        for (category, records) in sections {
            md.push_str(&format!("## {}\n\n", capitalize(category)));

            for record in records {
                md.push_str(&format!("### {}\n\n", record.question));
                md.push_str(&format!("{}\n\n", record.answer));
                md.push_str(&format!(
                    "_Source: [{}]({}) | confidence {:.2}_\n\n",
                    if record.source_page.is_empty() {
                        &record.source_url
                    } else {
                        &record.source_page
                    },
                    record.source_url,
                    record.confidence
                ));
            }
        }
    }

    if !scrape.pages.is_empty() {
        md.push_str("## Pages Crawled\n\n");
        md.push_str("| URL | Title |\n");
        md.push_str("|-----|-------|\n");

        for page in &scrape.pages {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&page.url),
                escape_cell(&page.title)
            ));
        }
        md.push('\n');
    }

    if !scrape.metadata.failed_pages.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");

        for failed in &scrape.metadata.failed_pages {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&failed.url),
                escape_cell(&failed.error)
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps a value inside one table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
