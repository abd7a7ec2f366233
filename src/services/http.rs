use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{ServiceError, UserService};
use crate::config::AppConfig;
use crate::models::User;
use crate::schemas::{CreateUserForm, UserListResponse, field_errors_from_body, user_from_body};

/// [`UserService`] backed by the users HTTP API.
#[derive(Debug, Clone)]
pub struct HttpUserService {
    client: reqwest::Client,
    users_url: String,
}

impl HttpUserService {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            users_url: config.users_url(),
        })
    }

    pub fn with_client(client: reqwest::Client, users_url: impl Into<String>) -> Self {
        Self {
            client,
            users_url: users_url.into(),
        }
    }

    pub fn users_url(&self) -> &str {
        &self.users_url
    }
}

/// Best-effort human message for a failed response body.
fn failure_message(body: &Value, raw: &str) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| raw.chars().take(200).collect())
}

#[async_trait]
impl UserService for HttpUserService {
    #[instrument(skip_all, fields(url = %self.users_url))]
    async fn create(&self, form: CreateUserForm) -> Result<Option<User>, ServiceError> {
        let res = self
            .client
            .post(&self.users_url)
            .multipart(form.into_multipart()?)
            .send()
            .await?;
        let status = res.status();
        let raw = res.text().await?;
        let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);

        if status.is_success() {
            let created = user_from_body(&body);
            if created.is_none() {
                debug!(%status, "Create succeeded without a readable user record");
            }
            return Ok(created);
        }

        if let Some(errors) = field_errors_from_body(&body) {
            return Err(ServiceError::Validation(errors));
        }
        Err(ServiceError::Status {
            status: status.as_u16(),
            message: failure_message(&body, &raw),
        })
    }

    #[instrument(skip_all, fields(url = %self.users_url))]
    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        let res = self.client.get(&self.users_url).send().await?;
        let status = res.status();
        let raw = res.text().await?;

        if !status.is_success() {
            let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: failure_message(&body, &raw),
            });
        }

        let parsed: UserListResponse =
            serde_json::from_str(&raw).map_err(|e| ServiceError::Decode(e.to_string()))?;
        let users = parsed.into_users();
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }
}
