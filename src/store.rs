//! In-memory user records behind the stub users API.

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::RoleCatalog;
use crate::models::{ProfileImage, User};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,
    #[error("role id {0} does not exist")]
    UnknownRole(i64),
}

/// A validated create request.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub profile_image: ProfileImage,
    pub role_id: i64,
}

struct StoredUser {
    user: User,
    image: ProfileImage,
}

struct Rows {
    next_id: i64,
    users: Vec<StoredUser>,
}

pub struct UserStore {
    roles: RoleCatalog,
    public_base_url: String,
    rows: RwLock<Rows>,
}

impl UserStore {
    /// `public_base_url` prefixes the image URLs handed out in records.
    pub fn new(roles: RoleCatalog, public_base_url: impl Into<String>) -> Self {
        Self {
            roles,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            rows: RwLock::new(Rows {
                next_id: 1,
                users: Vec::new(),
            }),
        }
    }

    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }

    pub async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let role_name = self
            .roles
            .get(new.role_id)
            .map(|r| r.name.clone())
            .ok_or(StoreError::UnknownRole(new.role_id))?;
        // Normalize email for consistent duplicate checks and storage
        let email = new.email.trim().to_lowercase();

        let mut rows = self.rows.write().await;
        if rows.users.iter().any(|s| s.user.email == email) {
            return Err(StoreError::EmailTaken);
        }

        let id = rows.next_id;
        rows.next_id += 1;
        let user = User {
            id,
            name: new.name,
            email,
            phone: new.phone,
            description: new.description,
            profile_image: format!("{}/api/users/{id}/profile_image", self.public_base_url),
            role_name,
            created_at: Some(Utc::now()),
        };
        rows.users.push(StoredUser {
            user: user.clone(),
            image: new.profile_image,
        });
        Ok(user)
    }

    /// All records, oldest first.
    pub async fn list(&self) -> Vec<User> {
        self.rows
            .read()
            .await
            .users
            .iter()
            .map(|s| s.user.clone())
            .collect()
    }

    pub async fn profile_image(&self, id: i64) -> Option<ProfileImage> {
        self.rows
            .read()
            .await
            .users
            .iter()
            .find(|s| s.user.id == id)
            .map(|s| s.image.clone())
    }
}
