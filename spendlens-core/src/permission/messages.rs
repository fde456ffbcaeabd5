use crate::models::Permission;

/// Shown for permissions without a dedicated message
pub const DEFAULT_DENIAL_MESSAGE: &str = "You do not have permission to perform this action";

const DENIAL_MESSAGES: &[(Permission, &str)] = &[
    (Permission::Upload, "Only Managers and Admins can upload data"),
    (Permission::Export, "You do not have permission to export data"),
    (Permission::Delete, "Only Admins can delete transactions"),
    (Permission::Clear, "Only Admins can clear all data"),
    (Permission::AdminPanel, "Only Admins can access the admin panel"),
];

/// Explanation for a denied permission.
///
/// Pure lookup; callers decide whether the check actually failed.
#[must_use]
pub fn denial_message(permission: Permission) -> &'static str {
    DENIAL_MESSAGES
        .iter()
        .find(|(p, _)| *p == permission)
        .map_or(DEFAULT_DENIAL_MESSAGE, |(_, message)| *message)
}

/// Lookup by wire name; unknown names get the default message.
#[must_use]
pub fn denial_message_for_name(name: &str) -> &'static str {
    name.parse::<Permission>()
        .map_or(DEFAULT_DENIAL_MESSAGE, denial_message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_messages() {
        assert_eq!(
            denial_message(Permission::Delete),
            "Only Admins can delete transactions"
        );
        assert_eq!(
            denial_message(Permission::Upload),
            "Only Managers and Admins can upload data"
        );
    }

    #[test]
    fn test_unmapped_permission_falls_back() {
        assert_eq!(denial_message(Permission::View), DEFAULT_DENIAL_MESSAGE);
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(
            denial_message_for_name("clear"),
            "Only Admins can clear all data"
        );
        assert_eq!(denial_message_for_name("teleport"), DEFAULT_DENIAL_MESSAGE);
    }

    #[test]
    fn test_table_has_no_duplicates() {
        for (i, (a, _)) in DENIAL_MESSAGES.iter().enumerate() {
            assert!(DENIAL_MESSAGES[i + 1..].iter().all(|(b, _)| a != b));
        }
    }
}
