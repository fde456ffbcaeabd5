//! Active organization selection
//!
//! Super-admins may browse another organization's data. The selection is a
//! process-wide value read whenever a request or cache key is built; no
//! selection means "the caller's own organization", which is kept distinct
//! from an explicit selection of the same id.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::models::TenantId;

/// Organization request parameters
///
/// Serializes to `{}` when no organization is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<TenantId>,
}

impl OrgParams {
    #[must_use]
    pub const fn own() -> Self {
        Self {
            organization_id: None,
        }
    }

    #[must_use]
    pub const fn for_org(organization_id: TenantId) -> Self {
        Self {
            organization_id: Some(organization_id),
        }
    }
}

/// Shared handle to the currently selected organization
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    selected: Arc<RwLock<Option<TenantId>>>,
}

impl TenantContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn params(&self) -> OrgParams {
        OrgParams {
            organization_id: *self.selected.read(),
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<TenantId> {
        *self.selected.read()
    }

    /// Target another organization. Returns the previous selection.
    pub fn select(&self, organization_id: TenantId) -> Option<TenantId> {
        let previous = self.selected.write().replace(organization_id);
        info!(organization_id, ?previous, "Organization selected");
        previous
    }

    /// Go back to the caller's own organization. Returns the previous selection.
    pub fn reset(&self) -> Option<TenantId> {
        let previous = self.selected.write().take();
        if previous.is_some() {
            info!(?previous, "Organization selection cleared");
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_own_org() {
        let tenant = TenantContext::new();
        assert_eq!(tenant.params(), OrgParams::own());
        assert_eq!(serde_json::to_string(&tenant.params()).unwrap(), "{}");
    }

    #[test]
    fn test_select_and_reset() {
        let tenant = TenantContext::new();
        let shared = tenant.clone();

        assert_eq!(tenant.select(4), None);
        assert_eq!(shared.params(), OrgParams::for_org(4));
        assert_eq!(
            serde_json::to_string(&shared.params()).unwrap(),
            r#"{"organization_id":4}"#
        );

        assert_eq!(tenant.select(9), Some(4));
        assert_eq!(tenant.reset(), Some(9));
        assert_eq!(shared.selected(), None);
    }
}
