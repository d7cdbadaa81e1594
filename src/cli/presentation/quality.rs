//! Quality assessment and regeneration presentation.

use crate::cli::output::envelope;
use crate::generation::result::ContentProvenance;
use crate::generation::QualityOutcome;
use crate::regeneration::RegenerationSummary;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn format_quality_outcome_text(page_id: &str, outcome: &QualityOutcome) -> String {
    let mut output = format!("Quality assessment for {}\n\n", page_id.bold());

    if outcome.assessments.is_empty() {
        output.push_str("No sections were scored.\n");
    } else {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["Section", "Quality", "Confidence", "Combined", "Result"]);
        for kind in &outcome.page.section_order {
            let Some(a) = outcome.assessments.get(kind) else {
                continue;
            };
            let result = if a.passed {
                "pass".green().to_string()
            } else {
                "fail".red().to_string()
            };
            table.add_row(vec![
                kind.label().to_string(),
                format!("{:.2}", a.quality_score),
                format!("{:.2}", a.confidence_score),
                format!("{:.2}", a.combined_score),
                result,
            ]);
        }
        output.push_str(&table.to_string());
        output.push('\n');
    }

    for kind in &outcome.failing {
        let Some(a) = outcome.assessments.get(kind) else {
            continue;
        };
        if a.recommendations.is_empty() {
            continue;
        }
        output.push_str(&format!("\n{} recommendations:\n", kind.label()));
        for recommendation in &a.recommendations {
            output.push_str(&format!("  - {}\n", recommendation));
        }
    }

    match &outcome.regeneration {
        Some(summary) => {
            output.push('\n');
            output.push_str(&format_regeneration_text(summary));
        }
        None if outcome.failing.is_empty() => {
            output.push_str("\nAll assessed sections passed.");
        }
        None => {
            let names: Vec<&str> = outcome.failing.iter().map(|k| k.as_str()).collect();
            output.push_str(&format!(
                "\n{} failing: {}. Run 'pagecraft apply {}' to regenerate them.",
                outcome.failing.len(),
                names.join(", "),
                page_id
            ));
        }
    }
    output
}

pub fn format_quality_outcome_json(page_id: &str, outcome: &QualityOutcome) -> String {
    let message = match &outcome.regeneration {
        Some(summary) => summary.message.clone(),
        None => format!(
            "{} section(s) assessed, {} failing",
            outcome.assessments.len(),
            outcome.failing.len()
        ),
    };
    envelope(
        outcome.success,
        &message,
        &json!({ "page_id": page_id, "outcome": outcome }),
    )
}

pub fn format_regeneration_text(summary: &RegenerationSummary) -> String {
    let mut output = String::new();
    if !summary.sections.is_empty() {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["Section", "Outcome", "Retries", "Time", "Last error"]);
        for (kind, result) in &summary.sections {
            let outcome = match result.provenance {
                ContentProvenance::Fallback => "fallback".yellow().to_string(),
                ContentProvenance::Generated => "regenerated".green().to_string(),
                ContentProvenance::Edited => "edited".green().to_string(),
            };
            table.add_row(vec![
                kind.label().to_string(),
                outcome,
                result.retry_count.to_string(),
                format!("{}ms", result.duration_ms),
                result.error.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        output.push_str(&table.to_string());
        output.push('\n');
    }
    output.push_str(&summary.message);
    output
}

pub fn format_regeneration_json(page_id: &str, summary: &RegenerationSummary) -> String {
    envelope(
        summary.success,
        &summary.message,
        &json!({ "page_id": page_id, "summary": summary }),
    )
}
