use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::{AggregateRow, Kpis, Record};
use crate::util::average;

/// Group records by (brand, unit, classification, item) and reduce each
/// group: monetary fields by sum, the share percentage by mean over rows
/// where it is present, and student flags by counting rows where the flag is
/// exactly 1.
///
/// A `BTreeMap` keyed by the composite key makes the output order
/// deterministic and duplicate groups impossible.
pub fn aggregate(records: &[Record]) -> Vec<AggregateRow> {
    #[derive(Default)]
    struct Acc {
        item_value: f64,
        share_value: f64,
        percents: Vec<f64>,
        internal: u64,
        external: u64,
    }

    let mut groups: BTreeMap<(String, String, String, String), Acc> = BTreeMap::new();
    for r in records {
        let key = (
            r.brand.clone(),
            r.unit.clone(),
            r.classification.clone(),
            r.item_name.clone(),
        );
        let e = groups.entry(key).or_default();
        e.item_value += r.item_value;
        e.share_value += r.share_value;
        if let Some(p) = r.share_percent {
            e.percents.push(p);
        }
        if r.internal_students == 1.0 {
            e.internal += 1;
        }
        if r.external_students == 1.0 {
            e.external += 1;
        }
    }

    groups
        .into_iter()
        .map(|((brand, unit, classification, item_name), acc)| AggregateRow {
            brand,
            unit,
            classification,
            item_name,
            item_value: acc.item_value,
            share_value: acc.share_value,
            share_percent: if acc.percents.is_empty() {
                None
            } else {
                Some(average(&acc.percents))
            },
            internal_students: acc.internal,
            external_students: acc.external,
        })
        .collect()
}

/// Summary figures over the filtered rows (not the aggregate rows): total
/// item value, total school share, mean share percentage where present, and
/// the number of counted students across both flags.
pub fn kpis(records: &[Record]) -> Kpis {
    let percents: Vec<f64> = records.iter().filter_map(|r| r.share_percent).collect();
    let internal = records.iter().filter(|r| r.internal_students == 1.0).count() as u64;
    let external = records.iter().filter(|r| r.external_students == 1.0).count() as u64;
    Kpis {
        total_item_value: records.iter().map(|r| r.item_value).sum(),
        total_share_value: records.iter().map(|r| r.share_value).sum(),
        avg_share_percent: if percents.is_empty() {
            None
        } else {
            Some(average(&percents))
        },
        students_counted: internal + external,
    }
}

/// Totals of one monetary field per distinct value of one categorical field,
/// largest first (ties broken by label). This feeds the bar charts.
pub fn totals_by<L, V>(records: &[Record], label_of: L, value_of: V) -> Vec<(String, f64)>
where
    L: Fn(&Record) -> &str,
    V: Fn(&Record) -> f64,
{
    let mut map: BTreeMap<String, f64> = BTreeMap::new();
    for r in records {
        *map.entry(label_of(r).to_string()).or_insert(0.0) += value_of(r);
    }
    let mut out: Vec<(String, f64)> = map.into_iter().collect();
    out.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    out
}
