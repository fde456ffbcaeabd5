//! Inactivity-based session tracking
//!
//! The store persists two string entries: the serialized user record and the
//! epoch-millisecond timestamp of the last tracked activity. Expiry is lazy:
//! there is no timer, `is_active` notices an elapsed timeout and clears the
//! entries as part of the call.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::models::UserRecord;
use crate::platform::{Clock, KeyValueStore};
use crate::Result;

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// A user record is stored
    pub present: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Session lifecycle over a clock and a key-value store
#[derive(Clone)]
pub struct SessionStore {
    clock: Arc<dyn Clock>,
    storage: Arc<dyn KeyValueStore>,
    timeout: Duration,
    user_key: String,
    last_activity_key: String,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("timeout_ms", &self.timeout.num_milliseconds())
            .field("user_key", &self.user_key)
            .field("last_activity_key", &self.last_activity_key)
            .finish()
    }
}

impl SessionStore {
    pub fn new(
        clock: Arc<dyn Clock>,
        storage: Arc<dyn KeyValueStore>,
        config: &SessionConfig,
    ) -> Self {
        let timeout = Duration::from_std(config.timeout()).unwrap_or(Duration::MAX);
        Self {
            clock,
            storage,
            timeout,
            user_key: config.user_key.clone(),
            last_activity_key: config.last_activity_key.clone(),
        }
    }

    /// Store with the default 30 minute timeout and storage keys
    pub fn with_defaults(clock: Arc<dyn Clock>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self::new(clock, storage, &SessionConfig::default())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start a session for `user`, stamping the current time as last activity.
    pub fn initialize(&self, user: &UserRecord) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.storage.set(&self.user_key, &json)?;
        self.write_activity()?;

        info!(user_id = user.id, role = %user.role, "Session started");
        Ok(())
    }

    /// Record user activity now.
    pub fn touch(&self) -> Result<()> {
        self.write_activity()?;
        debug!("Session activity recorded");
        Ok(())
    }

    /// Whether a live session exists. Expires and clears a timed-out session.
    pub fn is_active(&self) -> bool {
        if self.read_user().is_none() {
            return false;
        }

        let Some(idle) = self.idle_millis() else {
            warn!("Session has no usable activity timestamp, expiring");
            self.clear();
            return false;
        };

        if idle >= self.timeout.num_milliseconds() {
            info!(idle_ms = idle, "Session expired after inactivity");
            self.clear();
            return false;
        }

        true
    }

    /// Milliseconds until the session times out, never negative.
    ///
    /// Zero when no usable activity timestamp is stored.
    pub fn remaining_millis(&self) -> u64 {
        let Some(idle) = self.idle_millis() else {
            return 0;
        };

        let remaining = self.timeout.num_milliseconds().saturating_sub(idle);
        u64::try_from(remaining).unwrap_or(0)
    }

    /// The stored user while the session is active.
    pub fn current_user(&self) -> Option<UserRecord> {
        if self.is_active() {
            self.read_user()
        } else {
            None
        }
    }

    /// Current state without applying expiry.
    pub fn snapshot(&self) -> Session {
        Session {
            present: self.read_user().is_some(),
            last_activity_at: self
                .read_activity()
                .and_then(DateTime::from_timestamp_millis),
        }
    }

    /// Remove all session entries. Idempotent; storage failures are logged.
    pub fn clear(&self) {
        for key in [&self.user_key, &self.last_activity_key] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key = %key, error = %e, "Failed to remove session entry");
            }
        }
    }

    /// Explicit sign-out
    pub fn logout(&self) {
        self.clear();
        info!("Session ended by logout");
    }

    fn write_activity(&self) -> Result<()> {
        let now = self.clock.now_millis();
        self.storage.set(&self.last_activity_key, &now.to_string())
    }

    /// Time since the last activity.
    ///
    /// A timestamp in the future, or one far enough back to overflow, is as
    /// unusable as a non-numeric one.
    fn idle_millis(&self) -> Option<i64> {
        let last_activity = self.read_activity()?;
        match self.clock.now_millis().checked_sub(last_activity) {
            Some(idle) if idle >= 0 => Some(idle),
            _ => {
                warn!(last_activity, "Ignoring out-of-range session activity timestamp");
                None
            }
        }
    }

    fn read_activity(&self) -> Option<i64> {
        let raw = match self.storage.get(&self.last_activity_key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read session activity");
                return None;
            }
        };

        match raw.trim().parse::<i64>() {
            Ok(millis) => Some(millis),
            Err(_) => {
                warn!(value = %raw, "Ignoring malformed session activity timestamp");
                None
            }
        }
    }

    /// Malformed records read as absent.
    fn read_user(&self) -> Option<UserRecord> {
        let raw = match self.storage.get(&self.user_key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read stored user");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed stored user record");
                None
            }
        }
    }
}
