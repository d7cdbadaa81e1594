//! Segment cache presentation.

use crate::cli::output::envelope;
use crate::segment::SegmentStore;
use comfy_table::Table;
use serde_json::json;

pub fn format_segments_text(segments: &SegmentStore) -> String {
    if segments.is_empty() {
        return "No cached segments.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Segment", "Sections", "Identity", "Updated"]);
    for (kind, segment) in segments {
        let sections: Vec<&str> = segment.content.keys().map(String::as_str).collect();
        let identity = segment
            .identity_fingerprint
            .as_deref()
            .map(|fp| fp.chars().take(12).collect::<String>())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            kind.as_str().to_string(),
            sections.join(", "),
            identity,
            segment.updated_at.to_rfc3339(),
        ]);
    }
    format!("{}\n\nTotal: {} segment(s)", table, segments.len())
}

pub fn format_segments_json(segments: &SegmentStore) -> String {
    envelope(
        true,
        &format!("{} segment(s)", segments.len()),
        &json!({ "segments": segments }),
    )
}
