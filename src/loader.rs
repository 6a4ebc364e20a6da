use std::collections::{BTreeSet, HashMap};

use csv::{ReaderBuilder, Trim};

use crate::error::ReportError;
use crate::schema::{self, Field};
use crate::types::{Dataset, LoadReport, RawRow, Record};
use crate::util::{parse_count, parse_currency, parse_percent};

/// Read a CSV file and run it through [`load_dataset`].
pub fn load_path(path: &str) -> Result<(Dataset, LoadReport), ReportError> {
    let bytes = std::fs::read(path)?;
    load_dataset(&bytes)
}

/// Parse raw upload bytes into a normalized, coerced dataset.
///
/// Comma-delimited parsing is attempted first; on failure the semicolon
/// convention is tried. If neither produces a table the error propagates to
/// the caller as a message, never a crash, and no partial dataset is kept.
pub fn load_dataset(bytes: &[u8]) -> Result<(Dataset, LoadReport), ReportError> {
    let (headers, rows) = parse_delimited(bytes)?;

    // First matching raw header wins for each canonical field; everything
    // else is dropped and reported.
    let mut source_header: HashMap<Field, String> = HashMap::new();
    let mut dropped_headers: Vec<String> = Vec::new();
    for header in &headers {
        match schema::canonical_field(header) {
            Some(field) => {
                source_header.entry(field).or_insert_with(|| header.clone());
            }
            None => dropped_headers.push(header.clone()),
        }
    }
    let columns: BTreeSet<Field> = source_header.keys().copied().collect();

    let mut coerced_cells = 0usize;
    let mut missing_percents = 0usize;
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let percent_raw = cell(row, &source_header, Field::SharePercent);
        let share_percent = parse_percent(percent_raw);
        if share_percent.is_none() && !percent_raw.is_empty() {
            missing_percents += 1;
        }

        records.push(Record {
            brand: cell(row, &source_header, Field::Brand).to_string(),
            unit: cell(row, &source_header, Field::Unit).to_string(),
            classification: cell(row, &source_header, Field::Classification).to_string(),
            item_name: cell(row, &source_header, Field::ItemName).to_string(),
            item_value: money_cell(cell(row, &source_header, Field::ItemValue), &mut coerced_cells),
            share_value: money_cell(
                cell(row, &source_header, Field::ShareValue),
                &mut coerced_cells,
            ),
            share_percent,
            internal_students: count_cell(
                cell(row, &source_header, Field::InternalStudents),
                &mut coerced_cells,
            ),
            external_students: count_cell(
                cell(row, &source_header, Field::ExternalStudents),
                &mut coerced_cells,
            ),
        });
    }

    let report = LoadReport {
        total_rows: records.len(),
        recognized_columns: columns.len(),
        dropped_headers,
        coerced_cells,
        missing_percents,
    };
    Ok((Dataset { columns, records }, report))
}

fn cell<'a>(row: &'a RawRow, source_header: &HashMap<Field, String>, field: Field) -> &'a str {
    source_header
        .get(&field)
        .and_then(|header| row.0.get(header))
        .map(String::as_str)
        .unwrap_or("")
}

fn money_cell(raw: &str, coerced: &mut usize) -> f64 {
    match parse_currency(raw) {
        Some(v) => v,
        None => {
            if !raw.is_empty() {
                *coerced += 1;
            }
            0.0
        }
    }
}

fn count_cell(raw: &str, coerced: &mut usize) -> f64 {
    match parse_count(raw) {
        Some(v) => v,
        None => {
            if !raw.is_empty() {
                *coerced += 1;
            }
            0.0
        }
    }
}

fn parse_delimited(bytes: &[u8]) -> Result<(Vec<String>, Vec<RawRow>), ReportError> {
    match parse_attempt(bytes, b',') {
        Ok(parsed) => Ok(parsed),
        Err(comma_err) => {
            tracing::debug!("comma-delimited parse failed ({comma_err}), retrying with semicolon");
            parse_attempt(bytes, b';')
        }
    }
}

fn parse_attempt(bytes: &[u8], delimiter: u8) -> Result<(Vec<String>, Vec<RawRow>), ReportError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(bytes);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    // A single-column header is the signature of a wrongly guessed delimiter.
    if headers.len() < 2 {
        return Err(ReportError::NotTabular(format!(
            "header has {} column(s) with delimiter '{}'",
            headers.len(),
            delimiter as char
        )));
    }
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        rows.push(result?);
    }
    Ok((headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMA_CSV: &str = "\
Marca,Unidade,Classificacao_Receita,Nome_do_Item,Valor_do_Item,Repasse_Valor_Escola,Repasse_Perc_Escola,Aluno_Interno,Aluno_Externo
Alfa,Centro,Mensalidade,Curso A,\"R$ 1.000,00\",\"R$ 100,00\",10.0,1,0
Beta,Norte,Material,Apostila,\"R$ 500,50\",\"R$ 50,00\",,n/A,1
";

    #[test]
    fn loads_comma_delimited_upload() {
        let (dataset, report) = load_dataset(COMMA_CSV.as_bytes()).unwrap();
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.recognized_columns, 9);
        assert!(report.dropped_headers.is_empty());

        let first = &dataset.records[0];
        assert_eq!(first.brand, "Alfa");
        assert_eq!(first.item_value, 1000.0);
        assert_eq!(first.share_value, 100.0);
        assert_eq!(first.share_percent, Some(10.0));
        assert_eq!(first.internal_students, 1.0);

        let second = &dataset.records[1];
        assert_eq!(second.item_value, 500.5);
        assert_eq!(second.share_percent, None);
        assert_eq!(second.internal_students, 0.0);
        assert_eq!(second.external_students, 1.0);
    }

    #[test]
    fn falls_back_to_semicolon_delimiter() {
        let csv = "\
Marca;Valor_do_Item;Repasse_Perc_Escola
Alfa;R$ 1.234,56;12,5
Beta;R$ 100,00;
";
        let (dataset, report) = load_dataset(csv.as_bytes()).unwrap();
        assert_eq!(report.recognized_columns, 3);
        assert_eq!(dataset.records[0].item_value, 1234.56);
        assert_eq!(dataset.records[0].share_percent, Some(12.5));
        assert_eq!(dataset.records[1].share_percent, None);
    }

    #[test]
    fn rejects_input_with_no_tabular_structure() {
        let err = load_dataset(b"just one header\nvalue\n").unwrap_err();
        assert!(matches!(err, ReportError::NotTabular(_)));
        assert!(load_dataset(b"").is_err());
    }

    #[test]
    fn drops_unrecognized_headers_and_reports_them() {
        let csv = "\
Marca,Telefone,Valor_do_Item
Alfa,11-5555,\"R$ 10,00\"
";
        let (dataset, report) = load_dataset(csv.as_bytes()).unwrap();
        assert_eq!(report.dropped_headers, vec!["Telefone".to_string()]);
        assert_eq!(report.recognized_columns, 2);
        assert!(dataset.has(Field::Brand));
        assert!(dataset.has(Field::ItemValue));
        assert!(!dataset.has(Field::ShareValue));
    }

    #[test]
    fn missing_columns_coerce_to_defaults() {
        let csv = "\
Marca,Valor_do_Item
Alfa,\"R$ 10,00\"
";
        let (dataset, _) = load_dataset(csv.as_bytes()).unwrap();
        let record = &dataset.records[0];
        assert_eq!(record.unit, "");
        assert_eq!(record.share_value, 0.0);
        assert_eq!(record.share_percent, None);
        assert_eq!(record.internal_students, 0.0);
    }

    #[test]
    fn unparsable_cells_zero_fill_and_count() {
        let csv = "\
Marca,Valor_do_Item,Aluno_Interno
Alfa,isento,muitos
";
        let (dataset, report) = load_dataset(csv.as_bytes()).unwrap();
        let record = &dataset.records[0];
        assert_eq!(record.item_value, 0.0);
        assert_eq!(record.internal_students, 0.0);
        assert_eq!(report.coerced_cells, 2);
    }

    #[test]
    fn header_casing_and_whitespace_are_tolerated() {
        let csv = "\
MARCA, Nome do Item ,VALOR_DO_ITEM
Alfa,Curso A,\"R$ 1,00\"
";
        let (dataset, report) = load_dataset(csv.as_bytes()).unwrap();
        assert_eq!(report.recognized_columns, 3);
        assert_eq!(dataset.records[0].item_name, "Curso A");
    }
}
