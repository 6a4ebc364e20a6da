// Entry point and high-level CLI flow.
//
// One load-and-render cycle at a time:
// - Option [1] loads a CSV upload, printing load diagnostics and resetting
//   the filter selection to every observed value.
// - Option [2] edits the three categorical filter selections.
// - Option [3] renders the dashboard (KPIs, detail table, bar charts).
mod error;
mod filters;
mod loader;
mod output;
mod reports;
mod schema;
mod types;
mod util;

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::types::{Dataset, FilterSelection};
use crate::util::format_int;

// Session state: the most recent upload and the current filter selection.
// A new load replaces both; nothing is shared across cycles.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    dataset: Option<Dataset>,
    selection: FilterSelection,
}

/// Print a prompt and read one trimmed line of input.
fn prompt(text: &str) -> String {
    print!("{text}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Handle option [1]: read and parse an upload, then store it together with
/// the default all-observed filter selection.
fn handle_load() {
    let path = prompt("CSV file path: ");
    if path.is_empty() {
        println!("No file given.\n");
        return;
    }
    match loader::load_path(&path) {
        Ok((dataset, report)) => {
            println!(
                "Processing dataset... ({} rows loaded, {} columns recognized)",
                format_int(report.total_rows),
                format_int(report.recognized_columns)
            );
            if !report.dropped_headers.is_empty() {
                println!(
                    "Note: unrecognized column(s) dropped: {}",
                    report.dropped_headers.join(", ")
                );
            }
            if report.coerced_cells > 0 {
                println!(
                    "Note: {} cell(s) could not be parsed and were zero-filled.",
                    format_int(report.coerced_cells)
                );
            }
            if report.missing_percents > 0 {
                println!(
                    "Info: {} percentage cell(s) were unreadable and are excluded from averages.",
                    format_int(report.missing_percents)
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.selection = filters::all_observed(&dataset.records);
            state.dataset = Some(dataset);
        }
        Err(e) => {
            eprintln!("Failed to load file: {e}\n");
        }
    }
}

/// Handle option [2]: walk the user through the three categorical filters.
fn handle_filters() {
    let (records, mut selection) = {
        let state = APP_STATE.lock().unwrap();
        match &state.dataset {
            Some(dataset) => (dataset.records.clone(), state.selection.clone()),
            None => {
                println!("No file loaded yet. Load a CSV first (option 1).\n");
                return;
            }
        }
    };

    selection.brands = edit_values(
        "brand",
        &filters::observed_values(&records, |r| r.brand.as_str()),
        &selection.brands,
    );
    selection.units = edit_values(
        "unit",
        &filters::observed_values(&records, |r| r.unit.as_str()),
        &selection.units,
    );
    selection.classifications = edit_values(
        "classification",
        &filters::observed_values(&records, |r| r.classification.as_str()),
        &selection.classifications,
    );
    println!();

    let mut state = APP_STATE.lock().unwrap();
    state.selection = selection;
}

/// Show one categorical field's observed values and read a new selection.
/// Blank keeps the current one; `none` is a valid empty selection.
fn edit_values(
    label: &str,
    observed: &[String],
    current: &BTreeSet<String>,
) -> BTreeSet<String> {
    println!("Filter by {label}:");
    for (i, value) in observed.iter().enumerate() {
        let mark = if current.contains(value) { "x" } else { " " };
        println!("  [{mark}] {}. {}", i + 1, display_value(value));
    }
    loop {
        let input = prompt("Selection (all / none / numbers like 1,3 / blank to keep): ");
        if input.is_empty() {
            return current.clone();
        }
        match input.to_lowercase().as_str() {
            "all" => return observed.iter().cloned().collect(),
            "none" => return BTreeSet::new(),
            _ => {}
        }
        let mut picked = BTreeSet::new();
        let mut valid = true;
        for token in input.split(',') {
            match token.trim().parse::<usize>() {
                Ok(n) if n >= 1 && n <= observed.len() => {
                    picked.insert(observed[n - 1].clone());
                }
                _ => {
                    valid = false;
                    break;
                }
            }
        }
        if valid {
            return picked;
        }
        println!(
            "Invalid selection. Enter all, none, or numbers between 1 and {}.",
            observed.len()
        );
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(blank)"
    } else {
        value
    }
}

/// Handle option [3]: render the dashboard, or an informational placeholder
/// when nothing has been uploaded yet.
fn handle_dashboard() {
    let state = APP_STATE.lock().unwrap();
    match &state.dataset {
        Some(dataset) => output::render_dashboard(dataset, &state.selection),
        None => println!("No file loaded yet. Load a CSV first (option 1).\n"),
    }
}

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    loop {
        println!("Revenue Share Report");
        println!("[1] Load CSV file");
        println!("[2] Edit filters");
        println!("[3] Show dashboard");
        println!("[4] Exit\n");
        match prompt("Enter choice: ").as_str() {
            "1" => handle_load(),
            "2" => handle_filters(),
            "3" => handle_dashboard(),
            "4" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter a number from 1 to 4.\n"),
        }
    }
}
