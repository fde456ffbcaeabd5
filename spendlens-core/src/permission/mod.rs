//! Role-based feature gating
//!
//! [`Access`] answers capability queries for one `(role, super-admin)` pair.
//! Denial messages are a static table independent of who is asking.

pub mod access;
pub mod messages;

pub use access::{Access, Denial};
pub use messages::{denial_message, denial_message_for_name, DEFAULT_DENIAL_MESSAGE};
