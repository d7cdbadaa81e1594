//! Page presentation: view, generate and edit results.

use crate::cli::output::envelope;
use crate::cli::parse::OutputFormat;
use crate::generation::EditOutcome;
use crate::page::Page;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn format_page_text(page_id: &str, page: &Page) -> String {
    let mut output = format!("{}\n", format!("Page: {}", page_id).bold());
    output.push_str(&format!("Title: {}\n", page.title));
    output.push_str(&format!("Name: {}\n", page.name));
    output.push_str(&format!("Tagline: {}\n", page.tagline));
    output.push_str(&format!("Description: {}\n", page.description));
    if let Some(updated) = page.meta.updated_at.or(page.meta.generated_at) {
        output.push_str(&format!("Updated: {}\n", updated.to_rfc3339()));
    }
    output.push('\n');

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["#", "Section", "Title", "Source", "Shown", "Score"]);
    for (index, kind) in page.section_order.iter().enumerate() {
        let (title, shown) = page
            .section(*kind)
            .map(|section| (section.title().to_string(), section.enabled()))
            .unwrap_or_else(|| ("-".to_string(), false));
        let source = if page.is_fallback(*kind) {
            "fallback".yellow().to_string()
        } else {
            "generated".to_string()
        };
        let score = match page.meta.assessments.get(kind) {
            Some(a) if a.passed => format!("{:.2} {}", a.combined_score, "pass".green()),
            Some(a) => format!("{:.2} {}", a.combined_score, "fail".red()),
            None => "-".to_string(),
        };
        table.add_row(vec![
            (index + 1).to_string(),
            kind.label().to_string(),
            title,
            source,
            if shown { "yes" } else { "no" }.to_string(),
            score,
        ]);
    }
    output.push_str(&table.to_string());

    let fallbacks = page.meta.fallback_sections.len();
    if fallbacks > 0 {
        output.push_str(&format!(
            "\n\n{} section(s) use fallback content. Run 'pagecraft regenerate-failed {}' to retry.",
            fallbacks, page_id
        ));
    }
    output
}

pub fn format_page_json(page_id: &str, page: &Page, message: &str) -> String {
    envelope(true, message, &json!({ "page_id": page_id, "page": page }))
}

fn edited_names(outcome: &EditOutcome) -> Vec<&'static str> {
    outcome.sections.keys().map(|kind| kind.as_str()).collect()
}

pub fn format_edit_text(page_id: &str, outcome: &EditOutcome) -> String {
    let mut output = format_page_text(page_id, &outcome.page);
    let edited = edited_names(outcome);
    if edited.is_empty() {
        output.push_str("\n\nNo section content changed.");
    } else {
        output.push_str(&format!("\n\nEdited sections: {}", edited.join(", ")));
    }
    output
}

pub fn format_edit_json(page_id: &str, outcome: &EditOutcome) -> String {
    envelope(
        true,
        &format!("Page edited ({} section(s) changed)", outcome.sections.len()),
        &json!({
            "page_id": page_id,
            "page": outcome.page,
            "edited": edited_names(outcome),
        }),
    )
}

pub fn format_page_list(page_ids: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => envelope(
            true,
            &format!("{} page(s)", page_ids.len()),
            &json!({ "pages": page_ids }),
        ),
        OutputFormat::Text if page_ids.is_empty() => {
            "No pages found.\n\nUse 'pagecraft generate <page> --identity <file>' to create one."
                .to_string()
        }
        OutputFormat::Text => {
            let mut output = String::from("Pages:\n");
            for page_id in page_ids {
                output.push_str(&format!("  {}\n", page_id));
            }
            output.push_str(&format!("\nTotal: {} page(s)", page_ids.len()));
            output
        }
    }
}
