// Canonical column schema and the header-variant lookup table.
//
// Uploads name the same columns in many ways (Portuguese source headers,
// snake_case exports, English re-exports, stray casing and line breaks).
// All of them funnel through one declarative table so the loader and the
// display layer agree on a single canonical field set.
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical name for a data column, independent of the header text in any
/// given upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Brand,
    Unit,
    Classification,
    ItemName,
    ItemValue,
    ShareValue,
    SharePercent,
    InternalStudents,
    ExternalStudents,
}

impl Field {
    /// Display order of the canonical columns.
    pub const ALL: [Field; 9] = [
        Field::Brand,
        Field::Unit,
        Field::Classification,
        Field::ItemName,
        Field::ItemValue,
        Field::ShareValue,
        Field::SharePercent,
        Field::InternalStudents,
        Field::ExternalStudents,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Brand => "Brand",
            Field::Unit => "Unit",
            Field::Classification => "Classification",
            Field::ItemName => "Item",
            Field::ItemValue => "Item Value",
            Field::ShareValue => "School Share",
            Field::SharePercent => "Share %",
            Field::InternalStudents => "Internal Students",
            Field::ExternalStudents => "External Students",
        }
    }
}

// Keys are pre-normalized: lowercase, single spaces, no surrounding
// whitespace. Underscore and space variants are listed separately.
static HEADER_MAP: Lazy<HashMap<&'static str, Field>> = Lazy::new(|| {
    let entries: &[(&str, Field)] = &[
        ("marca", Field::Brand),
        ("brand", Field::Brand),
        ("unidade", Field::Unit),
        ("unit", Field::Unit),
        ("classificacao_receita", Field::Classification),
        ("classificacao receita", Field::Classification),
        ("classificação receita", Field::Classification),
        ("classificação da receita", Field::Classification),
        ("revenue_classification", Field::Classification),
        ("revenue classification", Field::Classification),
        ("nome_do_item", Field::ItemName),
        ("nome do item", Field::ItemName),
        ("item", Field::ItemName),
        ("item_name", Field::ItemName),
        ("item name", Field::ItemName),
        ("valor_do_item", Field::ItemValue),
        ("valor do item", Field::ItemValue),
        ("item_value", Field::ItemValue),
        ("item value", Field::ItemValue),
        ("repasse_valor_escola", Field::ShareValue),
        ("repasse valor escola", Field::ShareValue),
        ("school_share_value", Field::ShareValue),
        ("school share value", Field::ShareValue),
        ("repasse_perc_escola", Field::SharePercent),
        ("repasse perc escola", Field::SharePercent),
        ("repasse % escola", Field::SharePercent),
        ("school_share_percent", Field::SharePercent),
        ("school share percent", Field::SharePercent),
        ("aluno_interno", Field::InternalStudents),
        ("aluno interno", Field::InternalStudents),
        ("alunos internos", Field::InternalStudents),
        ("internal_student_flag", Field::InternalStudents),
        ("internal student", Field::InternalStudents),
        ("internal students", Field::InternalStudents),
        ("aluno_externo", Field::ExternalStudents),
        ("aluno externo", Field::ExternalStudents),
        ("alunos externos", Field::ExternalStudents),
        ("external_student_flag", Field::ExternalStudents),
        ("external student", Field::ExternalStudents),
        ("external students", Field::ExternalStudents),
    ];
    entries.iter().copied().collect()
});

/// Map a raw header to its canonical field, ignoring case and any amount of
/// surrounding or internal whitespace (headers sometimes arrive with embedded
/// newlines). Returns `None` for headers outside the canonical set.
pub fn canonical_field(raw: &str) -> Option<Field> {
    HEADER_MAP.get(normalize_header(raw).as_str()).copied()
}

fn normalize_header(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
