use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::{BridgeError, ErrorKind};
use crate::types::OperationResponse;

/// An operation envelope paired with the HTTP status its outcome maps to.
///
/// The body is always the envelope, so clients can rely on `success` and
/// `error.kind` regardless of the status code.
#[derive(Debug)]
pub struct EnvelopeResponse {
    status: StatusCode,
    body: OperationResponse,
}

impl EnvelopeResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<OperationResponse> for EnvelopeResponse {
    fn from(body: OperationResponse) -> Self {
        let status = body.error_kind().map_or(StatusCode::OK, status_for);
        Self { status, body }
    }
}

impl From<BridgeError> for EnvelopeResponse {
    fn from(error: BridgeError) -> Self {
        OperationResponse::failure(&error).into()
    }
}

impl IntoResponse for EnvelopeResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        ErrorKind::NotFoundError => StatusCode::NOT_FOUND,
        ErrorKind::AutomationError | ErrorKind::SerializationError => StatusCode::BAD_GATEWAY,
        ErrorKind::TimeoutError => StatusCode::GATEWAY_TIMEOUT,
    }
}
