use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};

use crate::filters;
use crate::reports;
use crate::schema::Field;
use crate::types::{AggregateRow, Dataset, FilterSelection, Record};
use crate::util::{average, format_count, format_currency, format_int, format_percent};

const CHART_WIDTH: usize = 40;

/// Run the filtered records through aggregation and print the three output
/// surfaces: KPI block, detail table with a TOTAL row, and the bar charts.
/// Columns absent from the upload are omitted rather than rendered empty.
pub fn render_dashboard(dataset: &Dataset, selection: &FilterSelection) {
    let filtered = filters::apply(&dataset.records, selection);
    let rows = reports::aggregate(&filtered);

    println!("Revenue Share Dashboard");
    println!(
        "({} of {} rows after filtering)\n",
        format_int(filtered.len()),
        format_int(dataset.records.len())
    );
    print_kpis(&filtered, dataset);
    print_table(&rows, dataset);
    print_charts(&filtered, dataset);
}

fn print_kpis(filtered: &[Record], dataset: &Dataset) {
    let kpis = reports::kpis(filtered);
    if dataset.has(Field::ItemValue) {
        println!("Total item value:   {}", format_currency(kpis.total_item_value));
    }
    if dataset.has(Field::ShareValue) {
        println!("Total school share: {}", format_currency(kpis.total_share_value));
    }
    if dataset.has(Field::SharePercent) {
        let rendered = kpis
            .avg_share_percent
            .map(format_percent)
            .unwrap_or_else(|| "-".to_string());
        println!("Avg school share:   {rendered}");
    }
    if dataset.has(Field::InternalStudents) || dataset.has(Field::ExternalStudents) {
        println!("Students counted:   {}", format_count(kpis.students_counted));
    }
    println!();
}

fn print_table(rows: &[AggregateRow], dataset: &Dataset) {
    let columns: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|f| dataset.has(*f))
        .collect();
    if columns.is_empty() {
        println!("(no recognized columns to display)\n");
        return;
    }
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|f| f.label().to_string()));
    for row in rows {
        builder.push_record(columns.iter().map(|f| cell(row, *f)));
    }
    builder.push_record(total_cells(rows, &columns));

    let mut table = builder.build();
    table.with(Style::markdown());
    // Bold on a light-gray background, mirroring the source styling.
    let highlight = Color::new("\u{1b}[1;48;5;252;30m".to_string(), "\u{1b}[0m".to_string());
    table.with(Modify::new(Rows::last()).with(highlight));
    println!("{table}\n");
}

fn cell(row: &AggregateRow, field: Field) -> String {
    match field {
        Field::Brand => row.brand.clone(),
        Field::Unit => row.unit.clone(),
        Field::Classification => row.classification.clone(),
        Field::ItemName => row.item_name.clone(),
        Field::ItemValue => format_currency(row.item_value),
        Field::ShareValue => format_currency(row.share_value),
        Field::SharePercent => row.share_percent.map(format_percent).unwrap_or_default(),
        Field::InternalStudents => format_count(row.internal_students),
        Field::ExternalStudents => format_count(row.external_students),
    }
}

/// Column sums (mean for the percentage) over the displayed rows. The TOTAL
/// row exists only at display time; it never enters filtering or aggregation.
#[derive(Debug, PartialEq)]
pub(crate) struct DisplayTotals {
    pub(crate) item_value: f64,
    pub(crate) share_value: f64,
    pub(crate) share_percent: Option<f64>,
    pub(crate) internal_students: u64,
    pub(crate) external_students: u64,
}

pub(crate) fn totals(rows: &[AggregateRow]) -> DisplayTotals {
    let percents: Vec<f64> = rows.iter().filter_map(|r| r.share_percent).collect();
    DisplayTotals {
        item_value: rows.iter().map(|r| r.item_value).sum(),
        share_value: rows.iter().map(|r| r.share_value).sum(),
        share_percent: if percents.is_empty() {
            None
        } else {
            Some(average(&percents))
        },
        internal_students: rows.iter().map(|r| r.internal_students).sum(),
        external_students: rows.iter().map(|r| r.external_students).sum(),
    }
}

fn total_cells(rows: &[AggregateRow], columns: &[Field]) -> Vec<String> {
    let totals = totals(rows);
    let mut cells: Vec<String> = columns
        .iter()
        .map(|f| match f {
            Field::ItemValue => format_currency(totals.item_value),
            Field::ShareValue => format_currency(totals.share_value),
            Field::SharePercent => totals.share_percent.map(format_percent).unwrap_or_default(),
            Field::InternalStudents => format_count(totals.internal_students),
            Field::ExternalStudents => format_count(totals.external_students),
            _ => String::new(),
        })
        .collect();
    if let Some(first) = cells.first_mut() {
        if first.is_empty() {
            *first = "TOTAL".to_string();
        }
    }
    cells
}

fn print_charts(filtered: &[Record], dataset: &Dataset) {
    if filtered.is_empty() {
        return;
    }
    // Charts plot the school share; when that column is absent they fall
    // back to the item value, and are skipped when both are absent.
    let (value_of, value_label): (fn(&Record) -> f64, &str) = if dataset.has(Field::ShareValue) {
        (|r: &Record| r.share_value, "school share")
    } else if dataset.has(Field::ItemValue) {
        (|r: &Record| r.item_value, "item value")
    } else {
        return;
    };

    let charts: [(Field, &str, fn(&Record) -> &str); 3] = [
        (Field::Brand, "brand", |r: &Record| r.brand.as_str()),
        (Field::Unit, "unit", |r: &Record| r.unit.as_str()),
        (
            Field::Classification,
            "classification",
            |r: &Record| r.classification.as_str(),
        ),
    ];
    for (field, name, label_of) in charts {
        if !dataset.has(field) {
            continue;
        }
        let data = reports::totals_by(filtered, label_of, value_of);
        print_bar_chart(&format!("Total {value_label} by {name}"), &data);
    }
}

fn print_bar_chart(title: &str, data: &[(String, f64)]) {
    if data.is_empty() {
        return;
    }
    println!("{title}");
    let max = data.iter().fold(0.0f64, |m, (_, v)| m.max(*v));
    let label_width = data.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    for (label, value) in data {
        let width = if max > 0.0 {
            ((value / max) * CHART_WIDTH as f64).round() as usize
        } else {
            0
        };
        println!(
            "  {:<lw$}  {:<cw$}  {}",
            label,
            "█".repeat(width),
            format_currency(*value),
            lw = label_width,
            cw = CHART_WIDTH,
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(brand: &str, value: f64, share: f64, percent: Option<f64>) -> AggregateRow {
        AggregateRow {
            brand: brand.to_string(),
            unit: "Centro".to_string(),
            classification: "Mensalidade".to_string(),
            item_name: "Curso A".to_string(),
            item_value: value,
            share_value: share,
            share_percent: percent,
            internal_students: 2,
            external_students: 1,
        }
    }

    #[test]
    fn total_row_sums_monetary_and_count_columns() {
        let rows = vec![
            row("Alfa", 1000.0, 100.0, Some(10.0)),
            row("Beta", 500.0, 50.0, Some(20.0)),
        ];
        let totals = totals(&rows);
        assert_eq!(totals.item_value, 1500.0);
        assert_eq!(totals.share_value, 150.0);
        assert_eq!(totals.share_percent, Some(15.0));
        assert_eq!(totals.internal_students, 4);
        assert_eq!(totals.external_students, 2);
    }

    #[test]
    fn total_percent_mean_skips_rows_without_one() {
        let rows = vec![
            row("Alfa", 0.0, 0.0, Some(30.0)),
            row("Beta", 0.0, 0.0, None),
        ];
        assert_eq!(totals(&rows).share_percent, Some(30.0));
        assert_eq!(totals(&[row("Alfa", 0.0, 0.0, None)]).share_percent, None);
    }

    #[test]
    fn total_row_labels_the_first_column() {
        let rows = vec![row("Alfa", 1000.0, 100.0, None)];
        let columns = [Field::Brand, Field::ItemValue];
        let cells = total_cells(&rows, &columns);
        assert_eq!(cells[0], "TOTAL");
        assert_eq!(cells[1], "R$ 1.000");
    }
}
