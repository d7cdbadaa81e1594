//! CLI presentation: text and json formatters per command family.

mod identity;
mod page;
mod quality;
mod segments;

pub use identity::{format_identity_json, format_identity_text};
pub use page::{
    format_edit_json, format_edit_text, format_page_json, format_page_list, format_page_text,
};
pub use quality::{
    format_quality_outcome_json, format_quality_outcome_text, format_regeneration_json,
    format_regeneration_text,
};
pub use segments::{format_segments_json, format_segments_text};
