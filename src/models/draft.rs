use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Role selected by a freshly created draft.
pub const DEFAULT_ROLE_ID: i64 = 1;

/// The fields of a [`UserDraft`], named as they travel on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldName {
    Name,
    Email,
    Phone,
    Description,
    ProfileImage,
    RoleId,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("role id {0} is not one of the configured roles")]
    UnknownRole(i64),
    #[error("field `{0}` does not hold text")]
    NotATextField(FieldName),
}

/// An attached image file: name, content type and raw bytes.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ProfileImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ProfileImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ProfileImage {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an image from disk. The content type comes from the file extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profile_image".to_string());
        Ok(Self::new(file_name, content_type_for(path), bytes))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// In-progress form state for a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub profile_image: Option<ProfileImage>,
    pub role_id: i64,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self::with_role(DEFAULT_ROLE_ID)
    }
}

impl UserDraft {
    /// Empty draft with `role_id` preselected.
    pub fn with_role(role_id: i64) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            description: String::new(),
            profile_image: None,
            role_id,
        }
    }

    /// Returns a copy of the draft with one text field replaced.
    pub fn with_text(
        mut self,
        field: FieldName,
        value: impl Into<String>,
    ) -> Result<Self, DraftError> {
        let slot = match field {
            FieldName::Name => &mut self.name,
            FieldName::Email => &mut self.email,
            FieldName::Phone => &mut self.phone,
            FieldName::Description => &mut self.description,
            FieldName::ProfileImage | FieldName::RoleId => {
                return Err(DraftError::NotATextField(field));
            }
        };
        *slot = value.into();
        Ok(self)
    }

    pub fn with_profile_image(mut self, image: ProfileImage) -> Self {
        self.profile_image = Some(image);
        self
    }

    pub fn with_role_id(mut self, role_id: i64) -> Self {
        self.role_id = role_id;
        self
    }
}

/// One message per invalid field. Keys are always draft fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FieldName, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FieldName, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl FromIterator<(FieldName, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (FieldName, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
