/// Tool Catalog Adaptation
///
/// Listing tools for the consumer means more than forwarding the
/// provider's catalog: input schemas are rewritten by the simplifier, a
/// missing description becomes an empty string, and optional fields the
/// provider left unset are omitted entirely rather than serialized as
/// null.

use crate::core::provider::{ToolDescriptor, ToolError, ToolProvider};
use crate::core::schema::simplify;
use serde_json::json;

/// Fetch the provider's tool list with consumer-ready descriptors.
pub async fn list_tools(provider: &dyn ToolProvider) -> Result<Vec<ToolDescriptor>, ToolError> {
    let tools = provider.list_tools().await?;
    Ok(tools.into_iter().map(adapt_descriptor).collect())
}

fn adapt_descriptor(tool: ToolDescriptor) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name,
        description: Some(tool.description.unwrap_or_default()),
        input_schema: Some(match &tool.input_schema {
            Some(schema) => simplify(schema),
            None => json!({}),
        }),
        output_schema: tool.output_schema,
        title: tool.title,
        annotations: tool.annotations,
    }
}
