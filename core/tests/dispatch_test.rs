/// Unit tests for the invocation bridge
use std::sync::Arc;

use async_trait::async_trait;
use ladder_core::config::RuntimeDefaults;
use ladder_core::dispatch::{DispatchError, Dispatcher, ToolCallRequest};
use ladder_core::tools::{
    Args, ParamSpec, Tool, ToolContent, ToolDescriptor, ToolError, ToolOutcome, ToolRegistry,
    ToolResult,
};
use serde_json::json;

struct WhoAmITool;

#[async_trait]
impl Tool for WhoAmITool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("unit:whoami", "reports the resolved handle")
            .param(ParamSpec::string("handle", "user handle").default_handle())
    }

    async fn call(&self, args: Args) -> ToolResult<ToolOutcome> {
        Ok(ToolOutcome::text(format!(
            "handle={}",
            args.str("handle").unwrap_or("<none>")
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
        Err(ToolError::ExecutionFailed("upstream exploded".into()))
    }
}

struct MixedTool;

#[async_trait]
impl Tool for MixedTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("unit:mixed", "returns an ordered text/image bundle")
    }

    async fn call(&self, _args: Args) -> ToolResult<ToolOutcome> {
        Ok(ToolOutcome::Mixed(vec![
            ToolContent::Text {
                text: "before".into(),
            },
            ToolContent::Image {
                data: "aGVsbG8=".into(),
                mime_type: "image/svg+xml".into(),
            },
            ToolContent::Text {
                text: "after".into(),
            },
        ]))
    }
}

fn dispatcher_with(defaults: RuntimeDefaults) -> Dispatcher {
    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(WhoAmITool));
    registry.register(Arc::new(FailingTool));
    registry.register(Arc::new(MixedTool));
    Dispatcher::new(registry, defaults)
}

#[tokio::test]
async fn unknown_tool_name_is_not_found() {
    let dispatcher = dispatcher_with(RuntimeDefaults::default());
    let err = dispatcher
        .dispatch(&ToolCallRequest::new("unit:nope", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::NotFound(_)));
}

#[tokio::test]
async fn argument_violation_reports_the_parameter() {
    let dispatcher = dispatcher_with(RuntimeDefaults::default());
    let err = dispatcher
        .dispatch(&ToolCallRequest::new(
            "unit:whoami",
            json!({"handle": ["not", "a", "string"]}),
        ))
        .await
        .unwrap_err();
    match err {
        DispatchError::InvalidArguments(detail) => assert!(detail.contains("handle")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn handler_fault_surfaces_as_display_safe_text() {
    let dispatcher = dispatcher_with(RuntimeDefaults::default());
    let err = dispatcher
        .dispatch(&ToolCallRequest::new("unit:failing", json!({})))
        .await
        .unwrap_err();
    match err {
        DispatchError::HandlerFailed(detail) => {
            assert!(detail.contains("upstream exploded"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn mixed_parts_pass_through_in_order() {
    let dispatcher = dispatcher_with(RuntimeDefaults::default());
    let parts = dispatcher
        .dispatch(&ToolCallRequest::new("unit:mixed", json!({})))
        .await
        .unwrap();

    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[0], ToolContent::Text { text } if text == "before"));
    assert!(
        matches!(&parts[1], ToolContent::Image { mime_type, .. } if mime_type == "image/svg+xml")
    );
    assert!(matches!(&parts[2], ToolContent::Text { text } if text == "after"));
}

#[tokio::test]
async fn configured_default_handle_reaches_the_handler() {
    let dispatcher = dispatcher_with(RuntimeDefaults {
        default_handle: Some("tourist".into()),
    });
    let parts = dispatcher
        .dispatch(&ToolCallRequest::new("unit:whoami", json!({})))
        .await
        .unwrap();
    assert!(matches!(&parts[0], ToolContent::Text { text } if text == "handle=tourist"));

    // Supplying the same handle explicitly must be indistinguishable.
    let explicit = dispatcher
        .dispatch(&ToolCallRequest::new(
            "unit:whoami",
            json!({"handle": "tourist"}),
        ))
        .await
        .unwrap();
    assert_eq!(parts, explicit);
}
