use serde::Serialize;

use super::messages::denial_message;
use crate::models::{Permission, PermissionSet, Role, UserRecord};

/// A refused permission with the message to show for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub permission: Permission,
    pub message: &'static str,
}

impl Denial {
    #[must_use]
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            message: denial_message(permission),
        }
    }
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message)
    }
}

/// Capability evaluator for one session's role and super-admin flag
///
/// Every query is a pure function of the pair. Without a role the evaluator
/// is anonymous and refuses everything, including super-admin checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Access {
    role: Option<Role>,
    super_admin: bool,
}

impl Access {
    #[must_use]
    pub const fn new(role: Option<Role>, is_super_admin: bool) -> Self {
        Self {
            role,
            // The flag means nothing without an authenticated role
            super_admin: role.is_some() && is_super_admin,
        }
    }

    #[must_use]
    pub const fn anonymous() -> Self {
        Self::new(None, false)
    }

    #[must_use]
    pub const fn for_user(user: &UserRecord) -> Self {
        Self::new(Some(user.role), user.is_super_admin)
    }

    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.role.is_some()
    }

    /// Effective permission set
    #[must_use]
    pub const fn permissions(&self) -> PermissionSet {
        match self.role {
            None => PermissionSet::NONE,
            Some(_) if self.super_admin => PermissionSet::ALL,
            Some(role) => role.permissions(),
        }
    }

    #[must_use]
    pub const fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().has(permission)
    }

    /// True for an empty list.
    #[must_use]
    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }

    /// False for an empty list.
    #[must_use]
    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(*p))
    }

    /// Rank comparison only; the super-admin flag does not raise rank.
    #[must_use]
    pub const fn is_at_least(&self, target: Role) -> bool {
        match self.role {
            Some(role) => role.is_at_least(target),
            None => false,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_at_least(Role::Admin)
    }

    #[must_use]
    pub const fn is_manager_or_above(&self) -> bool {
        self.is_at_least(Role::Manager)
    }

    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        self.super_admin
    }

    /// Uploads may target an organization other than the caller's own.
    #[must_use]
    pub const fn can_upload_for_any_org(&self) -> bool {
        self.super_admin
    }

    /// Message for `permission`, regardless of whether it is granted.
    #[must_use]
    pub fn denial_message(&self, permission: Permission) -> &'static str {
        denial_message(permission)
    }

    pub fn check(&self, permission: Permission) -> Result<(), Denial> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(Denial::new(permission))
        }
    }

    /// The requested permissions this session lacks, in request order.
    #[must_use]
    pub fn denied(&self, permissions: &[Permission]) -> Vec<Denial> {
        permissions
            .iter()
            .filter(|p| !self.has_permission(**p))
            .map(|p| Denial::new(*p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::UserFixture;

    fn all_accesses() -> Vec<Access> {
        let mut out = vec![Access::anonymous(), Access::new(None, true)];
        for role in Role::ALL {
            out.push(Access::new(Some(role), false));
            out.push(Access::new(Some(role), true));
        }
        out
    }

    #[test]
    fn test_anonymous_denies_everything() {
        for access in [Access::anonymous(), Access::new(None, true)] {
            for permission in Permission::ALL {
                assert!(!access.has_permission(permission));
            }
            for role in Role::ALL {
                assert!(!access.is_at_least(role));
            }
            assert!(!access.is_super_admin());
            assert!(!access.can_upload_for_any_org());
            assert!(!access.is_admin());
            assert!(!access.is_manager_or_above());
        }
    }

    #[test]
    fn test_manager_scenario() {
        let access = Access::new(Some(Role::Manager), false);

        assert!(access.has_all_permissions(&[Permission::View, Permission::Upload]));
        assert!(!access.has_any_permission(&[Permission::Delete, Permission::Clear]));
        assert!(access.is_manager_or_above());
        assert!(!access.is_admin());
    }

    #[test]
    fn test_super_admin_grants_every_permission_without_rank() {
        let access = Access::new(Some(Role::Viewer), true);

        for permission in Permission::ALL {
            assert!(access.has_permission(permission));
        }
        assert!(access.is_super_admin());
        assert!(access.can_upload_for_any_org());
        assert!(!access.is_at_least(Role::Manager));
        assert!(!access.is_admin());
    }

    #[test]
    fn test_super_admin_flag_never_changes_rank_checks() {
        for role in Role::ALL {
            let plain = Access::new(Some(role), false);
            let flagged = Access::new(Some(role), true);
            for target in Role::ALL {
                assert_eq!(plain.is_at_least(target), flagged.is_at_least(target));
            }
        }
    }

    #[test]
    fn test_monotonic_in_rank() {
        for (i, &lower) in Role::ALL.iter().enumerate() {
            for &higher in &Role::ALL[i + 1..] {
                let lower = Access::new(Some(lower), false);
                let higher = Access::new(Some(higher), false);
                for permission in Permission::ALL {
                    if lower.has_permission(permission) {
                        assert!(higher.has_permission(permission));
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_lists() {
        for access in all_accesses() {
            assert!(access.has_all_permissions(&[]));
            assert!(!access.has_any_permission(&[]));
        }
    }

    #[test]
    fn test_denial_message_independent_of_auth() {
        assert_eq!(
            Access::anonymous().denial_message(Permission::Delete),
            "Only Admins can delete transactions"
        );
        assert_eq!(
            Access::new(Some(Role::Admin), true).denial_message(Permission::Delete),
            "Only Admins can delete transactions"
        );
    }

    #[test]
    fn test_check_and_denied() {
        let viewer = Access::new(Some(Role::Viewer), false);

        assert!(viewer.check(Permission::View).is_ok());
        let denial = viewer.check(Permission::Upload).unwrap_err();
        assert_eq!(denial.permission, Permission::Upload);
        assert_eq!(denial.to_string(), "Only Managers and Admins can upload data");

        let denied = viewer.denied(&[Permission::Delete, Permission::View, Permission::Clear]);
        let names: Vec<Permission> = denied.iter().map(|d| d.permission).collect();
        assert_eq!(names, vec![Permission::Delete, Permission::Clear]);
    }

    #[test]
    fn test_for_user() {
        let user = UserFixture::new().with_role(Role::Admin).super_admin().build();
        let access = Access::for_user(&user);
        assert!(access.is_admin());
        assert!(access.is_super_admin());
    }
}
