use crate::utils::response::ApiResponse;
use axum::{Json, http::StatusCode};

/// Status plus enveloped body, as returned by the users API handlers.
pub type HandlerReply<T = serde_json::Value> = (StatusCode, Json<ApiResponse<T>>);

/// Both arms render the same envelope; `Err` is used for any non-2xx reply.
pub type HandlerResult<T = serde_json::Value> = Result<HandlerReply<T>, HandlerReply<T>>;
