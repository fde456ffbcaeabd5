//! Test helpers and fixtures for spendlens-core tests

use std::sync::Arc;

use crate::models::{NamedEntity, Role, UserRecord};
use crate::platform::{ManualClock, MemoryStore};
use crate::session::SessionStore;

/// 2023-11-14T22:13:20Z, a fixed starting instant for manual clocks
pub const TEST_EPOCH_MILLIS: i64 = 1_700_000_000_000;

/// Clock, backing storage and a default-configured store wired to both
pub fn session_fixture() -> (ManualClock, MemoryStore, SessionStore) {
    let clock = ManualClock::at_millis(TEST_EPOCH_MILLIS);
    let storage = MemoryStore::new();
    let store = SessionStore::with_defaults(Arc::new(clock.clone()), Arc::new(storage.clone()));
    (clock, storage, store)
}

pub fn manager_user() -> UserRecord {
    UserFixture::new().with_role(Role::Manager).build()
}

/// Test fixture builder for UserRecord
pub struct UserFixture {
    id: i64,
    email: String,
    role: Role,
    super_admin: bool,
    organization_id: Option<i64>,
}

impl UserFixture {
    pub fn new() -> Self {
        Self {
            id: 7,
            email: "test@example.com".to_string(),
            role: Role::Viewer,
            super_admin: false,
            organization_id: Some(1),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn super_admin(mut self) -> Self {
        self.super_admin = true;
        self
    }

    pub fn with_organization(mut self, organization_id: Option<i64>) -> Self {
        self.organization_id = organization_id;
        self
    }

    pub fn build(self) -> UserRecord {
        let mut user = UserRecord::new(self.id, self.email, self.role).with_name("Test User");
        user.is_super_admin = self.super_admin;
        user.organization_id = self.organization_id;
        user
    }
}

impl Default for UserFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn sample_suppliers() -> Vec<NamedEntity> {
    vec![
        NamedEntity::new(1, "Acme"),
        NamedEntity::new(2, "Globex"),
        NamedEntity::new(3, "Initech"),
    ]
}

pub fn sample_categories() -> Vec<NamedEntity> {
    vec![NamedEntity::new(10, "Travel"), NamedEntity::new(20, "IT")]
}
