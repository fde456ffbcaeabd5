//! UI-level filter state and its canonical form
//!
//! `FilterState` is what the filter panel holds: lists in the order the user
//! picked them, possibly with blanks. `NormalizedFilters` is the canonical,
//! order-independent form used for cache keys and API translation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive date bounds, each side optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Inclusive amount bounds, each side optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmountRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
}

impl AmountRange {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Strip trailing zeros so `10.0` and `10` compare and render the same.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            min: self.min.map(|d| d.normalize()),
            max: self.max.map(|d| d.normalize()),
        }
    }
}

/// Filter selections as held by the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    pub date_range: DateRange,
    pub categories: Vec<String>,
    pub subcategories: Vec<String>,
    pub suppliers: Vec<String>,
    pub locations: Vec<String>,
    pub years: Vec<String>,
    pub amount_range: AmountRange,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range = DateRange { start, end };
        self
    }

    #[must_use]
    pub fn with_categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_subcategories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subcategories = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_suppliers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suppliers = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_locations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_years<I, S>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.years = years.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_amounts(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.amount_range = AmountRange { min, max };
        self
    }

    /// True when no field would restrict a query.
    ///
    /// Lists that only contain blank entries count as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalize().is_none()
    }

    /// Canonical form, or `None` when nothing is selected.
    #[must_use]
    pub fn normalize(&self) -> Option<NormalizedFilters> {
        let normalized = NormalizedFilters {
            date_range: self.date_range,
            categories: canonical_set(&self.categories),
            subcategories: canonical_set(&self.subcategories),
            suppliers: canonical_set(&self.suppliers),
            locations: canonical_set(&self.locations),
            years: canonical_set(&self.years),
            amount_range: self.amount_range.normalized(),
        };

        (!normalized.is_empty()).then_some(normalized)
    }
}

/// Trimmed, de-duplicated, sorted, without blanks
fn canonical_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Canonical filter content
///
/// Sets are ordered and unique; unset optional parts are omitted from the
/// serialized form rather than rendered as nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizedFilters {
    #[serde(skip_serializing_if = "DateRange::is_empty")]
    pub date_range: DateRange,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub subcategories: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub suppliers: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub locations: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub years: BTreeSet<String>,
    #[serde(skip_serializing_if = "AmountRange::is_empty")]
    pub amount_range: AmountRange,
}

impl NormalizedFilters {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date_range.is_empty()
            && self.categories.is_empty()
            && self.subcategories.is_empty()
            && self.suppliers.is_empty()
            && self.locations.is_empty()
            && self.years.is_empty()
            && self.amount_range.is_empty()
    }
}

/// Id/name pair from a supplier or category list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: i64,
    pub name: String,
}

impl NamedEntity {
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
