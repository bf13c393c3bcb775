/// Output Wrapping
///
/// Each tool declares an output contract whose top level is a `result`
/// field, but the payload a tool actually produces is a bare value. This
/// module wraps a normalized payload to match the per-tool contract: some
/// tools declare `result` as an array, some as an object, and tools the
/// table does not know fall back to inference from the payload shape.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Value, json};

/// How a tool's payload must be wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapCategory {
    /// The tool's `result` field is declared as an array
    ArrayResult,
    /// The tool's `result` field is declared as an object
    ObjectResult,
    /// Unclassified tool; wrap by payload shape
    Infer,
}

/// On-disk wrap rule format: two name lists, one per explicit category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WrapRules {
    #[serde(default)]
    pub array_result: Vec<String>,
    #[serde(default)]
    pub object_result: Vec<String>,
}

/// Read-only tool-name -> category table, built once at startup.
#[derive(Debug, Clone)]
pub struct WrapTable {
    categories: HashMap<String, WrapCategory>,
}

impl WrapTable {
    pub fn from_rules(rules: &WrapRules) -> Self {
        let mut categories = HashMap::new();
        for name in &rules.array_result {
            categories.insert(name.clone(), WrapCategory::ArrayResult);
        }
        // Object rules win on duplicate names, matching insertion order.
        for name in &rules.object_result {
            categories.insert(name.clone(), WrapCategory::ObjectResult);
        }
        Self { categories }
    }

    pub fn classify(&self, tool_name: &str) -> WrapCategory {
        self.categories
            .get(tool_name)
            .copied()
            .unwrap_or(WrapCategory::Infer)
    }

    /// Wrap a normalized payload according to the tool's category.
    ///
    /// A payload that is already a mapping with a top-level `result` field
    /// passes through unchanged; the contract is met and double-wrapping
    /// would break it.
    pub fn wrap(&self, payload: Value, tool_name: &str) -> Value {
        if payload
            .as_object()
            .is_some_and(|map| map.contains_key("result"))
        {
            return payload;
        }

        match self.classify(tool_name) {
            WrapCategory::ArrayResult => match payload {
                Value::Array(_) => json!({"result": payload}),
                other => json!({"result": [other]}),
            },
            // Non-array payloads wrap identically for the object and
            // inferred cases; arrays stay arrays under both.
            WrapCategory::ObjectResult | WrapCategory::Infer => json!({"result": payload}),
        }
    }
}
