use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user record as the users API returns it. Read-only on the client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub description: String,
    /// URL of the uploaded image.
    #[serde(default)]
    pub profile_image: String,
    /// Display name of the user's role, denormalized by the server.
    #[serde(default)]
    pub role_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
