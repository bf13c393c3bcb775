/// Tool Result Normalization
///
/// A provider's call result arrives in one of two shapes (see
/// `ToolOutcome`): a content list paired with a structured value, or a
/// bare JSON value. This module extracts a single structured payload from
/// either shape. Resolution order, first applicable rule wins:
///
/// 1. Pair with a non-empty content list whose first item is text that
///    parses as JSON: the parsed value.
/// 2. Pair: the paired value's `result` field if it is a mapping with
///    one, otherwise the paired value itself.
/// 3. Bare value: used directly.
///
/// A null payload after those rules is replaced with a sentinel object so
/// the consumer always receives structured content.

use serde_json::{Value, json};

use crate::core::provider::ToolOutcome;

/// Extract the structured payload from a tool call outcome.
pub fn normalize(outcome: &ToolOutcome) -> Value {
    let payload = match outcome {
        ToolOutcome::Paired { content, value } => content
            .first()
            .and_then(|item| item.as_text())
            .and_then(|text| serde_json::from_str::<Value>(text).ok())
            .unwrap_or_else(|| paired_fallback(value)),
        ToolOutcome::Bare(value) => value.clone(),
    };

    if payload.is_null() {
        json!({"error": "No structured data available"})
    } else {
        payload
    }
}

/// Rule 2: prefer an inner `result` field, else the paired value itself.
fn paired_fallback(value: &Value) -> Value {
    match value.get("result") {
        Some(inner) => inner.clone(),
        None => value.clone(),
    }
}
