use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::permission::PermissionSet;
use crate::Error;

/// Organization role, ordered by privilege
///
/// The derived `Ord` follows declaration order: `Viewer < Manager < Admin`.
/// The super-admin flag lives on the user record and is not part of this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only analyst
    Viewer,
    /// Can upload data for the organization
    Manager,
    /// Full control over the organization's data
    Admin,
}

impl Role {
    /// Ascending rank order
    pub const ALL: [Self; 3] = [Self::Viewer, Self::Manager, Self::Admin];

    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Viewer => 1,
            Self::Manager => 2,
            Self::Admin => 3,
        }
    }

    /// Base permissions for this role
    #[must_use]
    pub const fn permissions(self) -> PermissionSet {
        match self {
            Self::Viewer => PermissionSet::VIEWER,
            Self::Manager => PermissionSet::MANAGER,
            Self::Admin => PermissionSet::ADMIN,
        }
    }

    #[must_use]
    pub const fn is_at_least(self, target: Self) -> bool {
        self.rank() >= target.rank()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(Error::InvalidInput(format!("Unknown role: {s}"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
