use std::sync::Arc;

use super::store::SessionStore;
use crate::models::UserRecord;
use crate::permission::Access;
use crate::{Error, Result};

/// Session handle shared by everything that gates on the signed-in user
///
/// The host establishes one of these at startup. Code that evaluates
/// permissions resolves it through [`SessionContext::require`]; a missing
/// context means the host is wired incorrectly and is reported as
/// [`Error::MissingSessionContext`] rather than answered as anonymous.
#[derive(Debug, Clone)]
pub struct SessionContext {
    store: Arc<SessionStore>,
}

impl SessionContext {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Resolve an optional context, failing loudly when none was established.
    pub fn require(context: Option<&Self>) -> Result<&Self> {
        context.ok_or(Error::MissingSessionContext)
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Signed-in user, if the session is still live
    #[must_use]
    pub fn user(&self) -> Option<UserRecord> {
        self.store.current_user()
    }

    /// Permission evaluator for the current session
    ///
    /// An inactive or expired session yields the anonymous evaluator.
    #[must_use]
    pub fn access(&self) -> Access {
        self.user().map_or_else(Access::anonymous, |user| Access::for_user(&user))
    }
}
