pub mod filter;
pub mod permission;
pub mod role;
pub mod user;

pub use filter::{AmountRange, DateRange, FilterState, NamedEntity, NormalizedFilters};
pub use permission::{validate_role_table, MonotonicityViolation, Permission, PermissionSet};
pub use role::Role;
pub use user::UserRecord;

/// Organization id. `None` at use sites means the caller's own organization.
pub type TenantId = i64;
