//! 分发层统一错误：AgentError → HTTP 状态码 + `{ "error": ... }`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::core::AgentError;

#[derive(Debug)]
pub struct ApiError(pub AgentError);

impl From<AgentError> for ApiError {
    fn from(e: AgentError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AgentError::AgentNotFound(_) | AgentError::MethodNotFound(_) => StatusCode::NOT_FOUND,
            AgentError::InvalidKey | AgentError::EmptyPrompt => StatusCode::BAD_REQUEST,
            AgentError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            AgentError::AgentNotFound(_) => "Agent not found".to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        } else {
            tracing::debug!(%status, "request rejected: {}", self.0);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AgentError::AgentNotFound("x".into()), StatusCode::NOT_FOUND),
            (AgentError::MethodNotFound("m".into()), StatusCode::NOT_FOUND),
            (AgentError::InvalidKey, StatusCode::BAD_REQUEST),
            (AgentError::EmptyPrompt, StatusCode::BAD_REQUEST),
            (AgentError::MalformedPayload("eof".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AgentError::PayloadTooLarge(16), StatusCode::PAYLOAD_TOO_LARGE),
            (
                AgentError::Llm(LlmError::Api("quota".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }
}
