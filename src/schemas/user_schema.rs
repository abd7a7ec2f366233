use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::models::{FieldErrors, FieldName, ProfileImage, User, UserDraft};

/// Value carried by one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(ProfileImage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: FieldName,
    pub value: PartValue,
}

/// Multipart body of a create request: one part per draft field, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserForm {
    parts: Vec<FormPart>,
}

impl CreateUserForm {
    /// Build the body from a draft. `None` when no image is attached.
    pub fn from_draft(draft: &UserDraft) -> Option<Self> {
        let image = draft.profile_image.clone()?;
        let text = |name, value: &str| FormPart {
            name,
            value: PartValue::Text(value.to_string()),
        };
        Some(Self {
            parts: vec![
                text(FieldName::Name, &draft.name),
                text(FieldName::Email, &draft.email),
                text(FieldName::Phone, &draft.phone),
                text(FieldName::Description, &draft.description),
                FormPart {
                    name: FieldName::ProfileImage,
                    value: PartValue::File(image),
                },
                text(FieldName::RoleId, &draft.role_id.to_string()),
            ],
        })
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn part(&self, name: FieldName) -> Option<&PartValue> {
        self.parts.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn text(&self, name: FieldName) -> Option<&str> {
        match self.part(name)? {
            PartValue::Text(value) => Some(value),
            PartValue::File(_) => None,
        }
    }

    /// Convert into a `reqwest` multipart form. Fails only on an unparsable content type.
    pub fn into_multipart(self) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            let key: &'static str = part.name.into();
            form = match part.value {
                PartValue::Text(value) => form.text(key, value),
                PartValue::File(image) => {
                    let file = reqwest::multipart::Part::bytes(image.bytes)
                        .file_name(image.file_name)
                        .mime_str(&image.content_type)?;
                    form.part(key, file)
                }
            };
        }
        Ok(form)
    }
}

/// `GET /api/users` body: `{ "data": [...] }`, or `{ "data": { "users": [...] } }`.
#[derive(Debug, Deserialize)]
pub struct UserListResponse {
    pub data: UserListData,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserListData {
    Users(Vec<User>),
    Wrapped { users: Vec<User> },
}

impl UserListResponse {
    pub fn into_users(self) -> Vec<User> {
        match self.data {
            UserListData::Users(users) | UserListData::Wrapped { users } => users,
        }
    }
}

/// Extract the user echoed by a successful create, from `data` or the body root.
pub fn user_from_body(body: &Value) -> Option<User> {
    let candidate = body.get("data").unwrap_or(body);
    serde_json::from_value(candidate.clone()).ok()
}

/// Extract field errors from a failed create.
///
/// `errors` is looked up at the top level, then under `data`. Each value is a
/// message or a list of messages (the first one is kept). Keys that are not
/// draft fields are dropped. Any `errors` object counts, even an empty one;
/// `None` means the body carried no error object at all.
pub fn field_errors_from_body(body: &Value) -> Option<FieldErrors> {
    let errors = body
        .get("errors")
        .or_else(|| body.get("data").and_then(|d| d.get("errors")))?
        .as_object()?;

    let mut out = FieldErrors::new();
    for (key, value) in errors {
        let Ok(field) = FieldName::from_str(key) else {
            tracing::warn!(field = %key, "Ignoring server error for unknown field");
            continue;
        };
        let message = match value {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
            _ => None,
        };
        if let Some(message) = message {
            out.insert(field, message);
        }
    }
    Some(out)
}

/// Server-side view of a create request, assembled from multipart parts.
#[derive(Debug, Default, Validate)]
pub struct UserStoreRequestSchema {
    #[validate(length(min = 3, message = "The name must be at least 3 characters."))]
    pub name: String,

    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[validate(length(equal = 10, message = "The phone must be 10 characters."))]
    pub phone: String,

    #[validate(length(min = 10, message = "The description must be at least 10 characters."))]
    pub description: String,

    #[validate(required(message = "The profile image field is required."))]
    pub profile_image: Option<ProfileImage>,

    #[validate(range(min = 1, message = "The selected role id is invalid."))]
    pub role_id: i64,
}
