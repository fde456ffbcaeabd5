//! Session lifecycle and the context handle the UI binds to

pub mod context;
pub mod store;

pub use context::SessionContext;
pub use store::{Session, SessionStore};
