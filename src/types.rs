use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

use crate::schema::Field;

/// One parsed CSV row keyed by raw header text, before schema normalization.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct RawRow(pub HashMap<String, String>);

/// One input row after normalization and coercion. Monetary and flag fields
/// are zero-filled when unparsable; the percentage keeps missing values so
/// averages can skip them.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub brand: String,
    pub unit: String,
    pub classification: String,
    pub item_name: String,
    pub item_value: f64,
    pub share_value: f64,
    pub share_percent: Option<f64>,
    pub internal_students: f64,
    pub external_students: f64,
}

/// The loaded records plus the canonical columns actually recognized in the
/// upload's header. Stages that depend on a column check membership here and
/// degrade instead of failing.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: BTreeSet<Field>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn has(&self, field: Field) -> bool {
        self.columns.contains(&field)
    }
}

/// Diagnostics from a single load, printed after option [1].
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub recognized_columns: usize,
    pub dropped_headers: Vec<String>,
    pub coerced_cells: usize,
    pub missing_percents: usize,
}

/// Allowed values for the three categorical fields. An empty set means
/// "match nothing", not "no filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub brands: BTreeSet<String>,
    pub units: BTreeSet<String>,
    pub classifications: BTreeSet<String>,
}

/// One output row per distinct (brand, unit, classification, item) key.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub brand: String,
    pub unit: String,
    pub classification: String,
    pub item_name: String,
    pub item_value: f64,
    pub share_value: f64,
    pub share_percent: Option<f64>,
    pub internal_students: u64,
    pub external_students: u64,
}

/// The four summary figures shown above the detail table.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_item_value: f64,
    pub total_share_value: f64,
    pub avg_share_percent: Option<f64>,
    pub students_counted: u64,
}
