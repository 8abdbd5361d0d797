//! Operation endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::EnvelopeResponse;
use super::ServerState;
use crate::dispatcher::OperationSpec;
use crate::error::{BridgeError, BridgeResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RpcRequest {
    operation: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

/// POST /rpc
///
/// Body: `{ "operation": "...", "arguments": { ... } }`.
pub(crate) async fn rpc(State(state): State<ServerState>, body: Bytes) -> EnvelopeResponse {
    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            return BridgeError::validation(format!("malformed request body: {error}")).into()
        }
    };
    state
        .dispatcher
        .dispatch(&request.operation, &request.arguments)
        .await
        .into()
}

/// POST /operations/:name
///
/// The body is the argument object; an empty body means no arguments.
pub(crate) async fn invoke(
    State(state): State<ServerState>,
    Path(name): Path<String>,
    body: Bytes,
) -> EnvelopeResponse {
    let arguments = match argument_map(&body) {
        Ok(arguments) => arguments,
        Err(error) => return error.into(),
    };
    state.dispatcher.dispatch(&name, &arguments).await.into()
}

/// GET /operations
pub(crate) async fn list(State(state): State<ServerState>) -> Json<&'static [OperationSpec]> {
    Json(state.dispatcher.operations())
}

fn argument_map(body: &[u8]) -> BridgeResult<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err(BridgeError::validation("arguments must be a JSON object")),
        Err(error) => Err(BridgeError::validation(format!(
            "malformed request body: {error}"
        ))),
    }
}
