/// Core Gateway Modules
///
/// - config.rs: immutable startup configuration and wrap-rule loading
/// - schema.rs: JSON-Schema simplification for tool listings
/// - provider.rs: tool provider boundary types and the in-process registry
/// - catalog.rs: consumer-ready tool catalog adaptation
/// - normalize.rs: structured payload extraction from call results
/// - wrap.rs: per-tool output contract wrapping
/// - server.rs: JSON-RPC dispatch and the HTTP surface

pub mod catalog;
pub mod config;
pub mod normalize;
pub mod provider;
pub mod schema;
pub mod server;
pub mod wrap;
