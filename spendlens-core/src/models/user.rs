use serde::{Deserialize, Serialize};

use super::role::Role;

/// Signed-in user as persisted in client storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    /// Cross-tenant access, independent of `role`
    #[serde(default)]
    pub is_super_admin: bool,
    /// The user's home organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
}

impl UserRecord {
    #[must_use]
    pub fn new(id: i64, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            name: None,
            role,
            is_super_admin: false,
            organization_id: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn with_super_admin(mut self, is_super_admin: bool) -> Self {
        self.is_super_admin = is_super_admin;
        self
    }

    #[must_use]
    pub const fn with_organization(mut self, organization_id: i64) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}
