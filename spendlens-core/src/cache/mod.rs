//! Cache key construction, response caching and invalidation

pub mod invalidation;
pub mod key;
pub mod query;

pub use invalidation::{InvalidationBus, InvalidationMessage};
pub use key::{
    build_key, build_key_normalized, domains, CacheKey, KeyArg, KeyBuilder, TenantSegment,
    NO_ARGS,
};
pub use query::{QueryCache, QuerySpec};
