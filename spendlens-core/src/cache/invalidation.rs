//! Cache invalidation fan-out
//!
//! Mutations (an upload, a delete, clearing an organization) describe what
//! they made stale as an [`InvalidationMessage`]. The bus broadcasts it to every
//! attached cache; each cache drops the entries whose keys match. Switching
//! tenant or filters never goes through here, it only changes which key is
//! read next.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::key::{CacheKey, TenantSegment};
use crate::models::TenantId;

/// What became stale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvalidationMessage {
    /// Every key in a domain
    Domain { domain: String },
    /// Every key for one resource of a domain
    Resource { domain: String, resource: String },
    /// Every key under one tenant segment
    Tenant { org_id: Option<TenantId> },
    /// Everything
    All,
}

impl InvalidationMessage {
    pub fn domain(domain: impl Into<String>) -> Self {
        Self::Domain {
            domain: domain.into(),
        }
    }

    pub fn resource(domain: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::Resource {
            domain: domain.into(),
            resource: resource.into(),
        }
    }

    #[must_use]
    pub const fn tenant(segment: TenantSegment) -> Self {
        Self::Tenant {
            org_id: segment.org_id,
        }
    }

    /// Whether `key` is covered by this message
    #[must_use]
    pub fn matches(&self, key: &CacheKey) -> bool {
        match self {
            Self::Domain { domain } => key.domain() == domain,
            Self::Resource { domain, resource } => {
                key.domain() == domain && key.resource() == resource
            }
            Self::Tenant { org_id } => key.tenant().org_id == *org_id,
            Self::All => true,
        }
    }
}

/// Local broadcast of invalidation messages
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<InvalidationMessage>,
}

impl InvalidationBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every message published after this call
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationMessage> {
        self.sender.subscribe()
    }

    /// Broadcast `message`. Returns how many subscribers will see it.
    pub fn publish(&self, message: InvalidationMessage) -> usize {
        debug!(?message, "Publishing cache invalidation");
        match self.sender.send(message) {
            Ok(receivers) => receivers,
            Err(e) => {
                warn!(message = ?e.0, "No cache subscribed to invalidation");
                0
            }
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(64)
    }
}
