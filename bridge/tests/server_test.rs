/// Unit tests for the JSON-RPC surface and keep-alive lifecycle
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::watch;

use ladder_bridge::{handle_request, keep_alive, JsonRpcRequest, PROTOCOL_VERSION};
use ladder_core::config::RuntimeDefaults;
use ladder_core::dispatch::Dispatcher;
use ladder_core::tools::{
    Args, ParamSpec, Tool, ToolDescriptor, ToolError, ToolOutcome, ToolRegistry, ToolResult,
};

struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("unit:echo", "echoes its message back")
            .param(ParamSpec::string("msg", "message to echo").optional())
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        Ok(ToolOutcome::text(format!(
            "echo: {}",
            args.str("msg").unwrap_or("-")
        )))
    }
}

struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("unit:failing", "always fails")
    }

    async fn call(&self, _args: Args) -> ToolResult<ToolOutcome> {
        Err(ToolError::ExecutionFailed("boom".into()))
    }
}

fn dispatcher() -> Dispatcher {
    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(EchoTool));
    registry.register(Arc::new(FailingTool));
    Dispatcher::new(registry, RuntimeDefaults::default())
}

fn request(id: Value, method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(id),
        method: method.into(),
        params: Some(params),
    }
}

#[tokio::test]
async fn initialize_reports_protocol_and_server_info() {
    let response = handle_request(&dispatcher(), request(json!(1), "initialize", json!({})))
        .await
        .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(result["serverInfo"]["name"], "ladder");
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn tools_list_carries_descriptors_with_schemas() {
    let response = handle_request(&dispatcher(), request(json!(2), "tools/list", json!({})))
        .await
        .unwrap();
    let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 2);

    let echo = tools
        .iter()
        .find(|t| t["name"] == "unit:echo")
        .expect("echo tool listed");
    assert_eq!(echo["inputSchema"]["type"], "object");
    assert!(echo["inputSchema"]["properties"]["msg"].is_object());
}

#[tokio::test]
async fn tools_call_returns_content_parts() {
    let response = handle_request(
        &dispatcher(),
        request(
            json!(3),
            "tools/call",
            json!({"name": "unit:echo", "arguments": {"msg": "hi"}}),
        ),
    )
    .await
    .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    assert_eq!(result["content"][0]["type"], "text");
    assert_eq!(result["content"][0]["text"], "echo: hi");
}

#[tokio::test]
async fn unknown_tool_is_a_protocol_error() {
    let response = handle_request(
        &dispatcher(),
        request(json!(4), "tools/call", json!({"name": "unit:nope"})),
    )
    .await
    .unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, -32602);
    assert!(error.message.contains("unit:nope"));
}

#[tokio::test]
async fn handler_fault_is_an_in_band_tool_error() {
    let response = handle_request(
        &dispatcher(),
        request(json!(5), "tools/call", json!({"name": "unit:failing"})),
    )
    .await
    .unwrap();

    // Tool faults are results with isError, not protocol errors.
    assert!(response.error.is_none());
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("boom"));
}

#[tokio::test]
async fn notifications_get_no_response() {
    let notification = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: None,
        method: "notifications/initialized".into(),
        params: None,
    };
    assert!(handle_request(&dispatcher(), notification).await.is_none());
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let response = handle_request(&dispatcher(), request(json!(6), "bogus/method", json!({})))
        .await
        .unwrap();
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test(start_paused = true)]
async fn keep_alive_stops_promptly_on_shutdown() {
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(keep_alive(
        "http://127.0.0.1:9/health".into(),
        Duration::from_secs(300),
        rx,
    ));

    // Let the task reach its select loop, then signal shutdown and await
    // the cancellation acknowledgment.
    tokio::task::yield_now().await;
    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("keep-alive should stop after the shutdown signal")
        .unwrap();
}
