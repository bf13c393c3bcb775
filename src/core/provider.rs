/// Tool Provider Boundary
///
/// The gateway sits in front of a tool provider: a runtime that exposes
/// named tools with JSON-Schema-described inputs and executes them on
/// demand. This module defines the boundary types - the descriptor a
/// provider publishes per tool, the tagged union of call-result shapes a
/// provider may produce, the invocation error - and a registry-backed
/// in-process provider in the same shape as the HTTP side expects from a
/// remote one.

use std::collections::HashMap;

use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A tool as published by the provider.
///
/// Optional fields stay `None` when the provider does not set them; the
/// catalog adapter omits them from listings rather than emitting nulls.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Unique tool identifier (e.g., "run_report")
    pub name: String,
    /// Human-readable description of what the tool does
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// JSON Schema for the tool's declared output contract
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Display title, distinct from the identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Provider-defined behavioral annotations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

impl ToolDescriptor {
    /// Descriptor with only the required fields set.
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema: Some(input_schema),
            output_schema: None,
            title: None,
            annotations: None,
        }
    }
}

/// One element of a call result's content list.
///
/// Providers emit heterogeneous content items; the gateway only ever
/// inspects the text form, so everything else is carried opaquely.
#[derive(Debug, Clone)]
pub enum ContentItem {
    /// A text payload, possibly serialized JSON
    Text { text: String },
    /// Any other content shape, passed through untouched
    Other(Value),
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The item's text payload, if it has one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Other(_) => None,
        }
    }
}

/// The shape of a tool invocation's result.
///
/// Providers are ambiguous here: some return a content list paired with a
/// structured value, others a bare JSON value. The ambiguity is resolved
/// into this union once, at the boundary, so downstream code never probes
/// structurally.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    /// Content list plus structured value, the provider's native pair shape
    Paired {
        content: Vec<ContentItem>,
        value: Value,
    },
    /// A bare JSON value
    Bare(Value),
}

/// Failure raised by the provider while executing a tool.
///
/// The JSON-RPC layer maps every variant uniformly to code -32603; the
/// taxonomy exists for logging and for provider implementations.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("{0}")]
    Execution(String),
}

/// A source of tools the gateway can list and invoke.
///
/// Both operations are async: a provider may be a long-running remote
/// call. `BoxFuture` keeps the trait dyn-compatible so the dispatcher can
/// hold providers behind `Arc<dyn ToolProvider>`.
pub trait ToolProvider: Send + Sync {
    /// Enumerate the provider's tools.
    fn list_tools(&self) -> BoxFuture<'_, Result<Vec<ToolDescriptor>, ToolError>>;

    /// Invoke a tool by name with JSON arguments.
    fn call_tool(&self, name: &str, arguments: Value) -> BoxFuture<'_, Result<ToolOutcome, ToolError>>;
}

/// Tool handler function type for registry-backed providers.
pub type ToolHandler = Box<dyn Fn(Value) -> Result<ToolOutcome, ToolError> + Send + Sync>;

/// In-process tool provider backed by a registry of handler closures.
///
/// The registry maintains the descriptor list for discovery and a map of
/// tool names to handlers for execution. Registration happens once during
/// startup; afterwards the registry is read-only and safe to share across
/// workers.
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register a tool and its handler.
    pub fn register(&mut self, tool: ToolDescriptor, handler: ToolHandler) {
        let name = tool.name.clone();
        self.tools.push(tool);
        self.handlers.insert(name, handler);
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolProvider for ToolRegistry {
    fn list_tools(&self) -> BoxFuture<'_, Result<Vec<ToolDescriptor>, ToolError>> {
        async move { Ok(self.tools.clone()) }.boxed()
    }

    fn call_tool(&self, name: &str, arguments: Value) -> BoxFuture<'_, Result<ToolOutcome, ToolError>> {
        let outcome = match self.handlers.get(name) {
            Some(handler) => handler(arguments),
            None => Err(ToolError::UnknownTool(name.to_string())),
        };
        async move { outcome }.boxed()
    }
}
