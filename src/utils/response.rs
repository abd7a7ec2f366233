use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope used by every users API response.
///
/// Field-scoped validation failures travel in a top-level `errors` object so
/// clients can read them without unwrapping `data` first.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl<T> ApiResponse<T> {
    /// Convenience constructor when you have a concrete `T` value
    pub fn success_with_data(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
            errors: None,
        }
    }

    /// Error constructor that includes structured `data`
    pub fn error_with_data(message: &str, data: T) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data: Some(data),
            errors: None,
        }
    }

    /// Validation failure: `errors` maps field names to lists of messages
    pub fn validation_error(errors: serde_json::Map<String, Value>) -> Self {
        Self {
            success: false,
            message: "Validation error".to_string(),
            data: None,
            errors: Some(Value::Object(errors)),
        }
    }
}
