use serde::Serialize;
use serde_json::Value;

use super::AppError;

/// JSON envelope every operation answers with: `{data?, code, message}`.
/// Errors keep the envelope shape with the status code carrying
/// severity and no data payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub code: u16,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(data: Value, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            code: 200,
            message: message.into(),
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            data: None,
            code: 200,
            message: message.into(),
        }
    }
}

impl From<&AppError> for ApiResponse {
    fn from(err: &AppError) -> Self {
        let message = match err {
            // Unexpected failures surface as a structured generic
            // message, never as a silent empty body.
            AppError::Internal(_) => "An internal error occurred. Please try again.".to_string(),
            other => other.to_string(),
        };

        Self {
            data: None,
            code: err.status_code(),
            message,
        }
    }
}
