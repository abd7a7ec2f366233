//! Static role and message catalogs, loaded once and shared by reference.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// A selectable role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

impl Role {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Ordered, non-empty list of roles. The first entry is the default selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Role>", into = "Vec<Role>")]
pub struct RoleCatalog {
    roles: Vec<Role>,
}

impl RoleCatalog {
    pub fn new(roles: Vec<Role>) -> Result<Self, ConfigError> {
        if roles.is_empty() {
            return Err(ConfigError::EmptyRoles);
        }
        Ok(Self { roles })
    }

    pub fn default_role(&self) -> &Role {
        // Non-empty by construction.
        &self.roles[0]
    }

    pub fn get(&self, id: i64) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self {
            roles: vec![
                Role::new(1, "Admin"),
                Role::new(2, "Editor"),
                Role::new(3, "Viewer"),
            ],
        }
    }
}

impl TryFrom<Vec<Role>> for RoleCatalog {
    type Error = ConfigError;

    fn try_from(roles: Vec<Role>) -> Result<Self, Self::Error> {
        Self::new(roles)
    }
}

impl From<RoleCatalog> for Vec<Role> {
    fn from(catalog: RoleCatalog) -> Self {
        catalog.roles
    }
}

/// Human-readable text for each validation failure kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationMessages {
    pub required: String,
    pub invalid_email: String,
    pub invalid_phone: String,
    pub invalid_image: String,
    pub name_too_short: String,
    pub description_too_short: String,
    pub phone_length: String,
    pub role_required: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            required: "This field is required.".into(),
            invalid_email: "Please enter a valid email address.".into(),
            invalid_phone: "Please enter a valid phone number.".into(),
            invalid_image: "Please upload a valid image file.".into(),
            name_too_short: "Name must be at least 3 characters long.".into(),
            description_too_short: "Description must be at least 10 characters long.".into(),
            phone_length: "Phone number must be 10 digits long.".into(),
            role_required: "Please select a role.".into(),
        }
    }
}

/// Text of the whole-operation notifications shown after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToastMessages {
    pub user_added: String,
    pub something_went_wrong: String,
}

impl Default for ToastMessages {
    fn default() -> Self {
        Self {
            user_added: "User added successfully!".into(),
            something_went_wrong: "Something went wrong!".into(),
        }
    }
}

/// Everything the form needs that is fixed for the life of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormCatalog {
    pub roles: RoleCatalog,
    pub messages: ValidationMessages,
    pub toasts: ToastMessages,
}

impl FormCatalog {
    /// Parse a catalog override. Sections left out keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
