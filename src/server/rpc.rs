//! JSON-RPC 2.0 envelope and method dispatch for the tool endpoint

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use super::AppState;
use crate::error::ToolError;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;

pub const PROTOCOL_VERSION: &str = "2025-03-26";

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    /// Absent for notifications. An explicit `null` is kept as
    /// `Some(Value::Null)` and still gets a response.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Any value that is present, `null` included, is `Some`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

impl From<ToolError> for RpcError {
    fn from(err: ToolError) -> Self {
        RpcError {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// `POST /mcp`
pub async fn handle(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!("malformed JSON-RPC body: {e}");
            return Json(RpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            ))
            .into_response();
        }
    };

    let Some(id) = request.id.clone() else {
        tracing::debug!(method = %request.method, "notification");
        return StatusCode::ACCEPTED.into_response();
    };
    if request.jsonrpc != "2.0" {
        return Json(RpcResponse::failure(
            id,
            INVALID_REQUEST,
            "Invalid request: jsonrpc must be \"2.0\"",
        ))
        .into_response();
    }

    let response = match call(&state, &request.method, request.params).await {
        Ok(result) => RpcResponse::success(id, result),
        Err(err) => RpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(err),
        },
    };
    Json(response).into_response()
}

async fn call(state: &AppState, method: &str, params: Value) -> Result<Value, RpcError> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({"tools": state.tools.tool_defs()})),
        "tools/call" => {
            let params: CallParams = serde_json::from_value(params).map_err(|e| {
                RpcError::from(ToolError::invalid_params(format!("Invalid params: {e}")))
            })?;
            let output = state.tools.execute(&params.name, &params.arguments).await;
            match output {
                Ok(output) => Ok(json!({
                    "content": [output.to_content()],
                    "isError": false,
                })),
                Err(err) => {
                    tracing::debug!(tool = %params.name, "tool error: {err}");
                    Err(err.into())
                }
            }
        }
        other => Err(RpcError {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_maps_to_rpc_code() {
        let err: RpcError = ToolError::invalid_params("Device x not found").into();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "Device x not found");

        let err: RpcError = ToolError::internal("boom").into();
        assert_eq!(err.code, -32603);
    }

    #[test]
    fn success_omits_error_field() {
        let v = serde_json::to_value(RpcResponse::success(json!(1), json!({}))).unwrap();
        assert_eq!(v, json!({"jsonrpc": "2.0", "id": 1, "result": {}}));
    }

    #[test]
    fn request_without_id_is_notification() {
        let req: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(req.id.is_none());
        assert!(req.params.is_null());
    }

    #[test]
    fn null_id_is_a_request_not_a_notification() {
        let req: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(Value::Null));
    }
}
