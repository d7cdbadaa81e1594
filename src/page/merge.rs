//! Field-level merge of partial backend output over existing content.
//!
//! Backend output is untrusted and may specify only a subset of a section's
//! fields. The merge is shallow: top-level keys present in the partial object
//! replace the existing values, everything else is retained. `null` in the
//! partial object means "not specified" and never clears an existing value.

use super::kind::SectionKind;
use super::sections::SectionData;
use crate::error::ApiError;
use serde_json::{Map, Value};

/// Overlay `partial` onto `base`, key by key.
pub fn merge_object(base: &mut Map<String, Value>, partial: &Map<String, Value>) {
    for (key, value) in partial {
        if value.is_null() {
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

/// Require a JSON object, naming the target in the error.
pub fn expect_object<'a>(
    target: &str,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, ApiError> {
    value.as_object().ok_or_else(|| {
        ApiError::BackendStructure(format!(
            "expected a JSON object for {}, got {}",
            target,
            json_type_name(value)
        ))
    })
}

/// Merge a partial section object over the current section (if any) and decode
/// the result into typed, checked section content.
pub fn merge_section(
    kind: SectionKind,
    existing: Option<&SectionData>,
    partial: &Value,
) -> Result<SectionData, ApiError> {
    let partial = expect_object(kind.as_str(), partial)?;
    let mut base = match existing.map(SectionData::to_value) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    merge_object(&mut base, partial);
    SectionData::from_value(kind, Value::Object(base))
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
