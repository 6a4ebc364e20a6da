use std::collections::BTreeSet;

use crate::types::{FilterSelection, Record};

/// The default selection: every observed value of each categorical field.
pub fn all_observed(records: &[Record]) -> FilterSelection {
    FilterSelection {
        brands: records.iter().map(|r| r.brand.clone()).collect(),
        units: records.iter().map(|r| r.unit.clone()).collect(),
        classifications: records.iter().map(|r| r.classification.clone()).collect(),
    }
}

/// Keep the records whose brand, unit, and classification are all members of
/// their selection sets. An empty set matches nothing.
pub fn apply(records: &[Record], selection: &FilterSelection) -> Vec<Record> {
    records
        .iter()
        .filter(|r| {
            selection.brands.contains(&r.brand)
                && selection.units.contains(&r.unit)
                && selection.classifications.contains(&r.classification)
        })
        .cloned()
        .collect()
}

/// Distinct values of one categorical field in sorted order, for building
/// the selection menu.
pub fn observed_values<F>(records: &[Record], pick: F) -> Vec<String>
where
    F: Fn(&Record) -> &str,
{
    let set: BTreeSet<&str> = records.iter().map(|r| pick(r)).collect();
    set.into_iter().map(str::to_string).collect()
}
