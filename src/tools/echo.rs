/// Echo Tool
///
/// Diagnostic tool that returns its message argument. Useful for
/// verifying the full dispatch, normalization, and wrapping pipeline
/// against a deployment without involving an upstream provider.

use serde_json::{Value, json};

use crate::core::provider::{
    ContentItem, ToolDescriptor, ToolError, ToolHandler, ToolOutcome, ToolRegistry,
};

pub fn register(registry: &mut ToolRegistry) {
    let tool = ToolDescriptor::new(
        "echo",
        "Echo a message back to the client.",
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message to echo"
                }
            },
            "required": ["message"]
        }),
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<ToolOutcome, ToolError> {
        let message = args
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::Execution("Missing required parameter: message".to_string()))?;
        // Emit the provider's native pair shape: a text content item
        // alongside the structured value.
        let payload = json!({"message": message});
        Ok(ToolOutcome::Paired {
            content: vec![ContentItem::text(payload.to_string())],
            value: payload,
        })
    });

    registry.register(tool, handler);
}
