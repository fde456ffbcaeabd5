//! UI filter selections to API filter parameters
//!
//! The filter panel works with names. The API prefers ids, but id lookups
//! come from supplier/category lists that may still be loading when a query
//! fires. Translation therefore always sends names and adds ids only for the
//! names the lookup tables already know; a query is correct either way, just
//! cheaper for the server once the tables are populated.

use chrono::NaiveDate;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::models::{FilterState, NamedEntity, NormalizedFilters};

/// Filter parameters as sent to the remote API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suppliers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supplier_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub years: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
}

#[derive(Debug, Default)]
struct Lookups {
    suppliers: HashMap<String, i64>,
    categories: HashMap<String, i64>,
}

/// Name-to-id resolution plus translation
///
/// Clones share lookup tables, so the component that loads supplier lists can
/// feed the same translator the query hooks read from.
#[derive(Debug, Clone, Default)]
pub struct FilterTranslator {
    lookups: Arc<RwLock<Lookups>>,
}

impl FilterTranslator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the supplier lookup table. Later duplicates of a name win.
    pub fn set_suppliers(&self, suppliers: &[NamedEntity]) {
        let table = to_table(suppliers);
        debug!(entries = table.len(), "Supplier lookup rebuilt");
        self.lookups.write().suppliers = table;
    }

    /// Replace the category lookup table. Later duplicates of a name win.
    pub fn set_categories(&self, categories: &[NamedEntity]) {
        let table = to_table(categories);
        debug!(entries = table.len(), "Category lookup rebuilt");
        self.lookups.write().categories = table;
    }

    #[must_use]
    pub fn supplier_id(&self, name: &str) -> Option<i64> {
        self.lookups.read().suppliers.get(name).copied()
    }

    #[must_use]
    pub fn category_id(&self, name: &str) -> Option<i64> {
        self.lookups.read().categories.get(name).copied()
    }

    /// API parameters for `ui`, or `None` when no filter is active.
    ///
    /// Deterministic for a given input and lookup state: names and ids come
    /// out sorted and unique.
    #[must_use]
    pub fn translate(&self, ui: &FilterState) -> Option<ApiFilters> {
        let filters = ui.normalize()?;
        let lookups = self.lookups.read();

        Some(ApiFilters {
            start_date: filters.date_range.start,
            end_date: filters.date_range.end,
            categories: filters.categories.iter().cloned().collect(),
            category_ids: resolve(&filters.categories, &lookups.categories),
            subcategories: filters.subcategories.iter().cloned().collect(),
            suppliers: filters.suppliers.iter().cloned().collect(),
            supplier_ids: resolve(&filters.suppliers, &lookups.suppliers),
            locations: filters.locations.iter().cloned().collect(),
            years: parse_years(&filters.years),
            min_amount: filters.amount_range.min,
            max_amount: filters.amount_range.max,
        })
    }

    /// Filter segment for the cache key; `None` exactly when `translate` is.
    #[must_use]
    pub fn key_filters(&self, ui: &FilterState) -> Option<NormalizedFilters> {
        ui.normalize()
    }
}

fn to_table(entities: &[NamedEntity]) -> HashMap<String, i64> {
    entities
        .iter()
        .map(|entity| (entity.name.clone(), entity.id))
        .collect()
}

fn resolve(names: &BTreeSet<String>, table: &HashMap<String, i64>) -> Vec<i64> {
    let ids: BTreeSet<i64> = names
        .iter()
        .filter_map(|name| table.get(name).copied())
        .collect();
    ids.into_iter().collect()
}

/// Non-numeric entries are dropped.
fn parse_years(years: &BTreeSet<String>) -> Vec<i32> {
    let parsed: BTreeSet<i32> = years
        .iter()
        .filter_map(|year| year.parse::<i32>().ok())
        .collect();
    parsed.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_categories, sample_suppliers};
    use serde_json::json;

    #[test]
    fn test_empty_filters_translate_to_none() {
        let translator = FilterTranslator::new();
        assert!(translator.translate(&FilterState::new()).is_none());
        assert!(translator.key_filters(&FilterState::new()).is_none());
    }

    #[test]
    fn test_any_single_field_is_an_active_filter() {
        let translator = FilterTranslator::new();
        let day = NaiveDate::from_ymd_opt(2024, 6, 30);
        let cases = [
            ("start date", FilterState::new().with_dates(day, None)),
            ("end date", FilterState::new().with_dates(None, day)),
            ("categories", FilterState::new().with_categories(["Travel"])),
            ("subcategories", FilterState::new().with_subcategories(["Flights"])),
            ("suppliers", FilterState::new().with_suppliers(["Acme"])),
            ("locations", FilterState::new().with_locations(["Berlin"])),
            ("years", FilterState::new().with_years(["2024"])),
            ("min amount", FilterState::new().with_amounts(Some(Decimal::ONE), None)),
            ("max amount", FilterState::new().with_amounts(None, Some(Decimal::ONE))),
        ];

        for (field, state) in &cases {
            assert!(translator.translate(state).is_some(), "{field}");
            assert!(translator.key_filters(state).is_some(), "{field}");
        }

        let end_only = translator.translate(&cases[1].1).unwrap();
        assert_eq!(end_only.start_date, None);
        assert_eq!(end_only.end_date, day);
        let max_only = translator.translate(&cases[8].1).unwrap();
        assert_eq!(max_only.min_amount, None);
        assert_eq!(max_only.max_amount, Some(Decimal::ONE));
    }

    #[test]
    fn test_names_sent_before_lookups_load() {
        let translator = FilterTranslator::new();
        let ui = FilterState::new().with_suppliers(["Globex", "Acme"]);

        let api = translator.translate(&ui).unwrap();

        assert_eq!(api.suppliers, vec!["Acme", "Globex"]);
        assert!(api.supplier_ids.is_empty());
    }

    #[test]
    fn test_ids_added_for_known_names() {
        let translator = FilterTranslator::new();
        translator.set_suppliers(&sample_suppliers());
        translator.set_categories(&sample_categories());

        let ui = FilterState::new()
            .with_suppliers(["Initech", "Acme", "Unknown Ltd"])
            .with_categories(["IT"]);
        let api = translator.translate(&ui).unwrap();

        assert_eq!(api.suppliers, vec!["Acme", "Initech", "Unknown Ltd"]);
        assert_eq!(api.supplier_ids, vec![1, 3]);
        assert_eq!(api.categories, vec!["IT"]);
        assert_eq!(api.category_ids, vec![20]);
    }

    #[test]
    fn test_years_parse_and_drop_garbage() {
        let translator = FilterTranslator::new();
        let ui = FilterState::new().with_years(["2024", "abc", "2023"]);

        let api = translator.translate(&ui).unwrap();
        assert_eq!(api.years, vec![2023, 2024]);

        // Only garbage: still an active filter, just without years
        let api = translator
            .translate(&FilterState::new().with_years(["n/a"]))
            .unwrap();
        assert!(api.years.is_empty());
    }

    #[test]
    fn test_translation_is_idempotent() {
        let translator = FilterTranslator::new();
        translator.set_suppliers(&sample_suppliers());
        let ui = FilterState::new()
            .with_suppliers(["Globex", "Acme"])
            .with_locations(["Berlin"]);

        assert_eq!(translator.translate(&ui), translator.translate(&ui.clone()));
    }

    #[test]
    fn test_serialized_shape() {
        let translator = FilterTranslator::new();
        translator.set_suppliers(&sample_suppliers());
        let ui = FilterState::new()
            .with_suppliers(["Acme"])
            .with_dates(NaiveDate::from_ymd_opt(2024, 1, 1), None)
            .with_amounts(Some(Decimal::new(250, 1)), None);

        let api = translator.translate(&ui).unwrap();
        assert_eq!(
            serde_json::to_value(&api).unwrap(),
            json!({
                "start_date": "2024-01-01",
                "suppliers": ["Acme"],
                "supplier_ids": [1],
                "min_amount": "25"
            })
        );
    }

    #[test]
    fn test_clones_share_lookups() {
        let translator = FilterTranslator::new();
        let loader = translator.clone();

        loader.set_categories(&sample_categories());

        assert_eq!(translator.category_id("Travel"), Some(10));
        assert_eq!(translator.supplier_id("Acme"), None);
    }
}
