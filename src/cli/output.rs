//! CLI output: command results and error mapping to a stable CLI surface.

use crate::cli::parse::OutputFormat;
use crate::error::ApiError;
use serde::Serialize;
use serde_json::json;

/// Rendered result of one command. `success == false` exits non-zero even
/// though the command itself ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub success: bool,
    pub body: String,
}

impl CommandOutput {
    pub fn ok(body: String) -> Self {
        Self {
            success: true,
            body,
        }
    }

    pub fn with_success(success: bool, body: String) -> Self {
        Self { success, body }
    }
}

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Error: {}", e),
        OutputFormat::Json => envelope(false, &e.to_string(), &serde_json::Value::Null),
    }
}

/// `{ success, message, data }`, pretty printed.
pub fn envelope<T: Serialize>(success: bool, message: &str, data: &T) -> String {
    let data = serde_json::to_value(data).unwrap_or(serde_json::Value::Null);
    let out = json!({ "success": success, "message": message, "data": data });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}
