//! Structured cache keys for remote query results
//!
//! A key is the ordered tuple
//! `[domain, resource, ...args, filters?, { orgId }]`. Filters are stored in
//! canonical form and left out entirely when nothing is selected. The tenant
//! segment is always present; "no override" and "override to some id" stay
//! distinct even when they resolve to the same organization.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::models::{FilterState, NormalizedFilters, TenantId};
use crate::tenant::OrgParams;

/// Well-known query domains
pub mod domains {
    pub const ANALYTICS: &str = "analytics";
    pub const TRANSACTIONS: &str = "transactions";
    pub const SUPPLIERS: &str = "suppliers";
    pub const CATEGORIES: &str = "categories";
    pub const REPORTS: &str = "reports";
    pub const ORGANIZATIONS: &str = "organizations";
}

/// Argument list for keys without positional arguments
pub const NO_ARGS: [KeyArg; 0] = [];

/// Positional key argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeyArg {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl From<i64> for KeyArg {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for KeyArg {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for KeyArg {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for KeyArg {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for KeyArg {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for KeyArg {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Tenant part of a key, rendered as `{"orgId": n}` or `{}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TenantSegment {
    pub org_id: Option<TenantId>,
}

impl TenantSegment {
    #[must_use]
    pub const fn own() -> Self {
        Self { org_id: None }
    }

    #[must_use]
    pub const fn org(org_id: TenantId) -> Self {
        Self {
            org_id: Some(org_id),
        }
    }
}

impl From<Option<TenantId>> for TenantSegment {
    fn from(org_id: Option<TenantId>) -> Self {
        Self { org_id }
    }
}

impl From<OrgParams> for TenantSegment {
    fn from(params: OrgParams) -> Self {
        Self {
            org_id: params.organization_id,
        }
    }
}

impl Serialize for TenantSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = usize::from(self.org_id.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(org_id) = self.org_id {
            map.serialize_entry("orgId", &org_id)?;
        }
        map.end()
    }
}

/// Cache key for one remote query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    domain: String,
    resource: String,
    args: Vec<KeyArg>,
    filters: Option<NormalizedFilters>,
    tenant: TenantSegment,
}

impl CacheKey {
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    #[must_use]
    pub fn args(&self) -> &[KeyArg] {
        &self.args
    }

    #[must_use]
    pub const fn filters(&self) -> Option<&NormalizedFilters> {
        self.filters.as_ref()
    }

    #[must_use]
    pub const fn tenant(&self) -> TenantSegment {
        self.tenant
    }

    /// The key as a JSON array
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for CacheKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 3 + self.args.len() + usize::from(self.filters.is_some());
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.domain)?;
        seq.serialize_element(&self.resource)?;
        for arg in &self.args {
            seq.serialize_element(arg)?;
        }
        if let Some(filters) = &self.filters {
            seq.serialize_element(filters)?;
        }
        seq.serialize_element(&self.tenant)?;
        seq.end()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

/// Build the key for `domain`/`resource` with positional `args`.
///
/// `filters` is normalized here; an empty or absent filter state produces no
/// filter segment.
pub fn build_key<I, A>(
    domain: &str,
    resource: &str,
    args: I,
    filters: Option<&FilterState>,
    tenant: impl Into<TenantSegment>,
) -> CacheKey
where
    I: IntoIterator<Item = A>,
    A: Into<KeyArg>,
{
    CacheKey {
        domain: domain.to_string(),
        resource: resource.to_string(),
        args: args.into_iter().map(Into::into).collect(),
        filters: filters.and_then(FilterState::normalize),
        tenant: tenant.into(),
    }
}

/// Same as [`build_key`] for callers that already hold canonical filters.
pub fn build_key_normalized<I, A>(
    domain: &str,
    resource: &str,
    args: I,
    filters: Option<NormalizedFilters>,
    tenant: impl Into<TenantSegment>,
) -> CacheKey
where
    I: IntoIterator<Item = A>,
    A: Into<KeyArg>,
{
    CacheKey {
        domain: domain.to_string(),
        resource: resource.to_string(),
        args: args.into_iter().map(Into::into).collect(),
        filters: filters.filter(|f| !f.is_empty()),
        tenant: tenant.into(),
    }
}

/// Key factory bound to one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    domain: String,
}

impl KeyBuilder {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Key without positional arguments
    #[must_use]
    pub fn key(
        &self,
        resource: &str,
        filters: Option<&FilterState>,
        tenant: impl Into<TenantSegment>,
    ) -> CacheKey {
        build_key(&self.domain, resource, NO_ARGS, filters, tenant)
    }

    /// Key with positional arguments
    pub fn key_with_args<I, A>(
        &self,
        resource: &str,
        args: I,
        filters: Option<&FilterState>,
        tenant: impl Into<TenantSegment>,
    ) -> CacheKey
    where
        I: IntoIterator<Item = A>,
        A: Into<KeyArg>,
    {
        build_key(&self.domain, resource, args, filters, tenant)
    }
}
