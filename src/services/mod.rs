//! The users API collaborator: the only place network calls are made.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{FieldErrors, User};
use crate::schemas::CreateUserForm;

pub mod http;

pub use http::HttpUserService;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The server rejected the request with per-field messages.
    #[error("server rejected {} field(s)", .0.len())]
    Validation(FieldErrors),
    /// Non-success status without a usable field-error payload.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Create and list users on the remote service.
#[async_trait]
pub trait UserService: Send + Sync {
    /// `POST /api/users`. Returns the created record when the server echoes one back.
    async fn create(&self, form: CreateUserForm) -> Result<Option<User>, ServiceError>;

    /// `GET /api/users`.
    async fn list(&self) -> Result<Vec<User>, ServiceError>;
}
