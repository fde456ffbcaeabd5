//! Permission names and role-derived permission sets
//!
//! Permissions are a closed set packed into a bitmask. Each role owns a fixed
//! base set; the table is monotonic in role rank (see
//! [`validate_role_table`]).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::role::Role;

/// A gated capability in the analytics client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read dashboards and tables
    View,
    /// Upload transaction files
    Upload,
    /// Export data and reports
    Export,
    /// Delete individual transactions
    Delete,
    /// Clear all organization data
    Clear,
    /// Open the admin panel
    AdminPanel,
}

impl Permission {
    pub const ALL: [Self; 6] = [
        Self::View,
        Self::Upload,
        Self::Export,
        Self::Delete,
        Self::Clear,
        Self::AdminPanel,
    ];

    #[must_use]
    pub const fn bit(self) -> u32 {
        match self {
            Self::View => 1 << 0,
            Self::Upload => 1 << 1,
            Self::Export => 1 << 2,
            Self::Delete => 1 << 3,
            Self::Clear => 1 << 4,
            Self::AdminPanel => 1 << 5,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Upload => "upload",
            Self::Export => "export",
            Self::Delete => "delete",
            Self::Clear => "clear",
            Self::AdminPanel => "admin_panel",
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown permission: {s}"))
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bitmask of [`Permission`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(u32);

impl PermissionSet {
    pub const NONE: Self = Self(0);

    /// Every defined permission
    pub const ALL: Self = Self::of(&Permission::ALL);

    /// Base set for viewers
    pub const VIEWER: Self = Self::of(&[Permission::View, Permission::Export]);

    /// Base set for managers: viewer plus upload
    pub const MANAGER: Self = Self::VIEWER.with(Permission::Upload);

    /// Base set for admins: manager plus destructive and admin operations
    pub const ADMIN: Self = Self::MANAGER
        .with(Permission::Delete)
        .with(Permission::Clear)
        .with(Permission::AdminPanel);

    #[must_use]
    pub const fn of(permissions: &[Permission]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < permissions.len() {
            bits |= permissions[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn with(self, permission: Permission) -> Self {
        Self(self.0 | permission.bit())
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn has(self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    #[must_use]
    pub const fn is_superset_of(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn grant(&mut self, permission: Permission) {
        self.0 |= permission.bit();
    }

    pub fn revoke(&mut self, permission: Permission) {
        self.0 &= !permission.bit();
    }

    /// Permissions in declaration order
    pub fn iter(self) -> impl Iterator<Item = Permission> {
        Permission::ALL.into_iter().filter(move |p| self.has(*p))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::NONE;
        for permission in iter {
            set.grant(permission);
        }
        set
    }
}

/// A pair of roles where the higher-ranked one lacks something the lower has
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonotonicityViolation {
    pub lower: Role,
    pub higher: Role,
    pub missing: Vec<Permission>,
}

impl std::fmt::Display for MonotonicityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let missing: Vec<&str> = self.missing.iter().map(|p| p.as_str()).collect();
        write!(
            f,
            "{} lacks [{}] granted to lower-ranked {}",
            self.higher,
            missing.join(", "),
            self.lower
        )
    }
}

/// Check that every role's set contains the sets of all lower-ranked roles.
pub fn validate_role_table(
    table: impl Fn(Role) -> PermissionSet,
) -> Result<(), Vec<MonotonicityViolation>> {
    let mut violations = Vec::new();

    for (i, &lower) in Role::ALL.iter().enumerate() {
        for &higher in &Role::ALL[i + 1..] {
            let lower_set = table(lower);
            let higher_set = table(higher);
            if !higher_set.is_superset_of(lower_set) {
                violations.push(MonotonicityViolation {
                    lower,
                    higher,
                    missing: lower_set.iter().filter(|p| !higher_set.has(*p)).collect(),
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
