/// Gateway Server Implementation
///
/// This module contains the JSON-RPC-over-HTTP surface of the gateway:
/// - JSON-RPC 2.0 request/response/error structures
/// - Request dispatch by method (initialize, tools/list, tools/call)
/// - Bearer-token auth gate
/// - HTTP server setup with Actix Web
///
/// Requests are handled independently; the only shared data are the
/// read-only startup configuration and the tool provider, so the server
/// needs no locks and no per-request state.

use std::sync::Arc;

use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer, Result,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::catalog;
use crate::core::config::Config;
use crate::core::normalize::normalize;
use crate::core::provider::{ToolError, ToolProvider};

/// JSON-RPC 2.0 request envelope.
///
/// Every field defaults when absent: a body without a method dispatches
/// as method "" and earns a method-not-found error rather than a parse
/// failure, matching how lenient JSON-RPC consumers probe servers.
#[derive(Deserialize, Debug)]
pub struct JsonRpcRequest {
    /// JSON-RPC version identifier; tolerated when missing
    #[serde(default)]
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    /// Request ID, echoed verbatim in the response. Absent and null are
    /// both rendered as null.
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name (e.g., "initialize", "tools/list", "tools/call")
    #[serde(default)]
    pub method: String,
    /// Method-specific parameters
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response envelope.
///
/// Exactly one of result/error is serialized; the id is always present,
/// as null when the request carried none.
#[derive(Serialize, Debug)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Debug)]
pub struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcError {
    /// Unrecognized JSON-RPC method (-32601).
    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
        }
    }

    /// Provider/tool failure during an invocation (-32603). No taxonomy
    /// is distinguished here; every invocation failure maps uniformly.
    fn invocation(err: &ToolError) -> Self {
        Self {
            code: -32603,
            message: format!("Internal server error: {err}"),
        }
    }
}

/// Shared application state, cloned into each worker thread.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn ToolProvider>,
}

/// Route a parsed JSON-RPC request to its method handler.
pub async fn dispatch(state: &GatewayState, req: JsonRpcRequest) -> JsonRpcResponse {
    tracing::debug!(method = %req.method, "dispatching JSON-RPC request");
    match req.method.as_str() {
        "initialize" => handle_initialize(&state.config, req.id),
        "tools/list" => handle_tools_list(state.provider.as_ref(), req.id).await,
        "tools/call" => handle_tools_call(state, req.id, req.params).await,
        other => JsonRpcResponse::failure(req.id, JsonRpcError::method_not_found(other)),
    }
}

/// Handle the initialize method.
///
/// Returns the fixed capabilities descriptor and server identity,
/// independent of request params.
fn handle_initialize(config: &Config, id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {},
                "logging": {}
            },
            "serverInfo": {
                "name": config.server_name,
                "version": config.server_version
            }
        }),
    )
}

/// Handle the tools/list method via the catalog adapter.
async fn handle_tools_list(provider: &dyn ToolProvider, id: Option<Value>) -> JsonRpcResponse {
    match catalog::list_tools(provider).await {
        Ok(tools) => JsonRpcResponse::success(id, json!({"tools": tools})),
        Err(err) => {
            tracing::error!(error = %err, "tool listing failed");
            JsonRpcResponse::failure(id, JsonRpcError::invocation(&err))
        }
    }
}

/// Handle the tools/call method.
///
/// Invokes the tool, normalizes the ambiguous result shape into a
/// structured payload, wraps it for the tool's declared output contract,
/// and renders both a text and a structuredContent view. Invocation
/// failures are converted to JSON-RPC errors here and never propagate.
async fn handle_tools_call(
    state: &GatewayState,
    id: Option<Value>,
    params: Option<Value>,
) -> JsonRpcResponse {
    let params = params.unwrap_or_else(|| json!({}));
    let tool_name = params.get("name").and_then(Value::as_str).unwrap_or("");
    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    tracing::info!(tool = tool_name, "tool call");

    match state.provider.call_tool(tool_name, arguments).await {
        Ok(outcome) => {
            let payload = normalize(&outcome);
            let wrapped = state.config.wrap_table.wrap(payload, tool_name);
            // Plain strings go out verbatim; everything else is
            // pretty-printed for the text view.
            let text = match &wrapped {
                Value::String(s) => s.clone(),
                other => serde_json::to_string_pretty(other).unwrap_or_default(),
            };
            JsonRpcResponse::success(
                id,
                json!({
                    "content": [{"type": "text", "text": text}],
                    "structuredContent": wrapped
                }),
            )
        }
        Err(err) => {
            tracing::error!(tool = tool_name, error = %err, "tool execution failed");
            JsonRpcResponse::failure(id, JsonRpcError::invocation(&err))
        }
    }
}

/// Bearer-token auth gate.
///
/// With no token configured, every request passes unauthenticated. With
/// one configured, the Authorization header must carry exactly
/// `Bearer <token>`.
fn authorize(config: &Config, req: &HttpRequest) -> std::result::Result<(), HttpResponse> {
    let Some(expected) = config.bearer_token.as_deref() else {
        return Ok(());
    };

    let presented = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| {
            let mut parts = raw.splitn(2, ' ');
            let scheme = parts.next().unwrap_or_default();
            let token = parts.next().unwrap_or_default().trim();
            scheme.eq_ignore_ascii_case("bearer").then_some(token)
        });

    if presented == Some(expected) {
        Ok(())
    } else {
        Err(HttpResponse::Unauthorized()
            .insert_header(("WWW-Authenticate", "Bearer"))
            .json(json!({"detail": "Invalid authentication credentials"})))
    }
}

/// JSON-RPC endpoint handler.
///
/// Reads the raw body so that a malformed JSON request fails at the
/// transport level with a 500, never as a JSON-RPC error object. That
/// asymmetry is part of the gateway's contract with its consumer.
async fn mcp_endpoint(
    state: web::Data<GatewayState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    if let Err(denied) = authorize(&state.config, &req) {
        return Ok(denied);
    }

    let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!(error = %err, "request body is not valid JSON");
            return Ok(HttpResponse::InternalServerError()
                .json(json!({"detail": format!("Internal server error: {err}")})));
        }
    };

    let response = dispatch(&state, rpc_request).await;
    Ok(HttpResponse::Ok().json(response))
}

/// Root endpoint: server identity and endpoint map.
async fn root(state: web::Data<GatewayState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "name": state.config.server_name,
        "version": state.config.server_version,
        "status": "running",
        "endpoints": {
            "mcp": "/mcp",
            "health": "/health"
        }
    })))
}

/// Health check endpoint for load balancers and monitoring.
async fn health(state: web::Data<GatewayState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "server": state.config.server_name,
        "version": state.config.server_version
    })))
}

/// Run the gateway HTTP server.
///
/// Configured for production traffic: worker count auto-detected from
/// CPU count (max 16, overridable via WORKER_THREADS), 10k connection
/// cap, 30s keep-alive and request timeouts, graceful shutdown.
pub async fn run(config: Config, provider: Arc<dyn ToolProvider>) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = format!("{}:{}", config.host, config.port);

    if config.bearer_token.is_none() {
        tracing::warn!("no MCP_BEARER_TOKEN configured - running without authentication");
    }

    let workers = std::env::var("WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or_else(|| num_cpus::get().clamp(1, 16));

    tracing::info!(
        name = %config.server_name,
        version = %config.server_version,
        bind = %bind_addr,
        workers,
        "gateway starting"
    );

    let state = web::Data::new(GatewayState {
        config: Arc::new(config),
        provider,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            // Enable compression for JSON responses (gzip/brotli)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY")),
            )
            // %r = request line, %s = status, %Dms = duration
            .wrap(Logger::new("%r %s %Dms"))
            .route("/health", web::get().to(health))
            // Consumers disagree on the trailing slash, so both routes
            // reach the same handler.
            .route("/mcp", web::post().to(mcp_endpoint))
            .route("/mcp/", web::post().to(mcp_endpoint))
            .route("/", web::get().to(root))
    })
    .workers(workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::{ContentItem, ToolDescriptor, ToolOutcome, ToolRegistry};
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn test_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(
            ToolDescriptor::new(
                "run_report",
                "Run a report.",
                json!({
                    "type": "object",
                    "properties": {
                        "property_id": {
                            "anyOf": [{"type": "string"}, {"type": "integer"}],
                            "title": "Property Id"
                        }
                    },
                    "additionalProperties": false
                }),
            ),
            Box::new(|_args| {
                Ok(ToolOutcome::Paired {
                    content: vec![ContentItem::text(r#"{"rows": [{"sessions": 12}]}"#)],
                    value: json!({"ignored": true}),
                })
            }),
        );
        registry.register(
            ToolDescriptor::new(
                "get_account_summaries",
                "List accounts.",
                json!({"type": "object"}),
            ),
            Box::new(|_args| Ok(ToolOutcome::Bare(json!({"account": "a/1"})))),
        );
        registry.register(
            ToolDescriptor::new("broken", "Always fails.", json!({"type": "object"})),
            Box::new(|_args| Err(ToolError::Execution("quota exceeded".to_string()))),
        );
        registry
    }

    fn test_state(bearer_token: Option<&str>) -> GatewayState {
        let mut config = Config::from_env();
        config.server_name = "test-gateway".to_string();
        config.server_version = "0.0.0".to_string();
        config.bearer_token = bearer_token.map(str::to_string);
        GatewayState {
            config: Arc::new(config),
            provider: Arc::new(test_registry()),
        }
    }

    fn rpc(body: Value) -> JsonRpcRequest {
        serde_json::from_value(body).unwrap()
    }

    #[actix_rt::test]
    async fn unknown_method_yields_32601_with_id_echo() {
        let state = test_state(None);
        let response =
            dispatch(&state, rpc(json!({"jsonrpc": "2.0", "id": 7, "method": "foo"}))).await;
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "error": {"code": -32601, "message": "Method not found: foo"}
            })
        );
    }

    #[actix_rt::test]
    async fn null_and_absent_ids_echo_as_null() {
        let state = test_state(None);
        for body in [
            json!({"jsonrpc": "2.0", "id": null, "method": "initialize"}),
            json!({"jsonrpc": "2.0", "method": "initialize"}),
        ] {
            let response = dispatch(&state, rpc(body)).await;
            let serialized = serde_json::to_value(&response).unwrap();
            assert_eq!(serialized.get("id"), Some(&Value::Null));
            assert!(serialized.get("result").is_some());
        }
    }

    #[actix_rt::test]
    async fn initialize_reports_fixed_capabilities() {
        let state = test_state(None);
        let response = dispatch(
            &state,
            rpc(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"whatever": 1}})),
        )
        .await;
        let serialized = serde_json::to_value(&response).unwrap();
        assert_eq!(
            serialized["result"],
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}, "resources": {}, "prompts": {}, "logging": {}},
                "serverInfo": {"name": "test-gateway", "version": "0.0.0"}
            })
        );
    }

    #[actix_rt::test]
    async fn tools_list_returns_simplified_schemas() {
        let state = test_state(None);
        let response =
            dispatch(&state, rpc(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))).await;
        let serialized = serde_json::to_value(&response).unwrap();
        let tools = serialized["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 3);
        let report = tools.iter().find(|t| t["name"] == "run_report").unwrap();
        assert_eq!(
            report["inputSchema"]["properties"]["property_id"],
            json!({"type": "string", "title": "Property Id"})
        );
        assert!(report["inputSchema"].get("additionalProperties").is_none());
    }

    #[actix_rt::test]
    async fn tools_call_normalizes_and_wraps() {
        let state = test_state(None);
        let response = dispatch(
            &state,
            rpc(json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {"name": "run_report", "arguments": {"property_id": "123"}}
            })),
        )
        .await;
        let serialized = serde_json::to_value(&response).unwrap();
        let result = &serialized["result"];
        // run_report is object-classified: payload wraps under "result".
        assert_eq!(
            result["structuredContent"],
            json!({"result": {"rows": [{"sessions": 12}]}})
        );
        let text = result["content"][0]["text"].as_str().unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(
            serde_json::from_str::<Value>(text).unwrap(),
            result["structuredContent"]
        );
        // The text view is pretty-printed, not compact.
        assert!(text.contains('\n'));
    }

    #[actix_rt::test]
    async fn array_classified_tool_wraps_object_payload_in_array() {
        let state = test_state(None);
        let response = dispatch(
            &state,
            rpc(json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {"name": "get_account_summaries"}
            })),
        )
        .await;
        let serialized = serde_json::to_value(&response).unwrap();
        assert_eq!(
            serialized["result"]["structuredContent"],
            json!({"result": [{"account": "a/1"}]})
        );
    }

    #[actix_rt::test]
    async fn tool_failure_maps_to_32603() {
        let state = test_state(None);
        let response = dispatch(
            &state,
            rpc(json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": {"name": "broken"}
            })),
        )
        .await;
        let serialized = serde_json::to_value(&response).unwrap();
        assert_eq!(
            serialized["error"],
            json!({"code": -32603, "message": "Internal server error: quota exceeded"})
        );
        assert!(serialized.get("result").is_none());
    }

    #[actix_rt::test]
    async fn missing_params_default_to_empty() {
        let state = test_state(None);
        let response = dispatch(
            &state,
            rpc(json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call"})),
        )
        .await;
        let serialized = serde_json::to_value(&response).unwrap();
        // Empty tool name reaches the provider and fails as unknown.
        assert_eq!(serialized["error"]["code"], -32603);
        assert_eq!(
            serialized["error"]["message"],
            "Internal server error: unknown tool: "
        );
    }

    #[actix_rt::test]
    async fn malformed_body_fails_at_the_transport_level() {
        let state = test_state(None);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/mcp", web::post().to(mcp_endpoint)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/mcp")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        // Transport failure, never a JSON-RPC error envelope.
        assert!(body.get("jsonrpc").is_none());
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .starts_with("Internal server error:")
        );
    }

    #[actix_rt::test]
    async fn bearer_auth_gates_the_endpoint() {
        let state = test_state(Some("s3cret"));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/mcp", web::post().to(mcp_endpoint)),
        )
        .await;

        let unauthorized = test::TestRequest::post()
            .uri("/mcp")
            .set_json(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}))
            .to_request();
        let resp = test::call_service(&app, unauthorized).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get("WWW-Authenticate").unwrap(), "Bearer");

        let authorized = test::TestRequest::post()
            .uri("/mcp")
            .insert_header(("Authorization", "Bearer s3cret"))
            .set_json(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}))
            .to_request();
        let resp = test::call_service(&app, authorized).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn no_configured_token_accepts_anonymous_requests() {
        let state = test_state(None);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/mcp", web::post().to(mcp_endpoint)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/mcp")
            .set_json(json!({"jsonrpc": "2.0", "id": 9, "method": "tools/list"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], json!(9));
        assert!(body["result"]["tools"].is_array());
    }
}
