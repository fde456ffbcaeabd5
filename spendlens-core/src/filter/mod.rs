//! Filter translation and change notification

pub mod bus;
pub mod translate;

pub use bus::{FilterBus, FiltersChanged};
pub use translate::{ApiFilters, FilterTranslator};
