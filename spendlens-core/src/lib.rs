pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod permission;
pub mod platform;
pub mod session;
pub mod tenant;

#[cfg(test)]
pub mod test_helpers;

pub use cache::{
    build_key, CacheKey, InvalidationBus, InvalidationMessage, KeyBuilder, QueryCache, QuerySpec,
    TenantSegment,
};
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{ApiFilters, FilterBus, FilterTranslator};
pub use permission::Access;
pub use session::{SessionContext, SessionStore};
pub use tenant::{OrgParams, TenantContext};
