//! Structural validation of a parsed table.
//!
//! Three checks, always all of them: required columns are present, there is
//! at least one data row, and every row is as wide as the header. Field
//! contents are never interpreted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Locale;
use crate::messages;
use crate::outcome::ValidationOutcome;
use crate::parse::ParsedTable;

/// Columns every pest-sampling file must carry.
pub const REQUIRED_COLUMNS: &[&str] = &["Id", "DataAvaliacao", "Propriedade", "NomeCultura"];

/// How a required column name is matched against header labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ColumnMatch {
    /// Some header contains the name, ignoring case (`cod_Id_talhao` satisfies `Id`).
    #[default]
    Contains,
    /// Some header equals the name, ignoring case.
    ExactIgnoreCase,
    /// Some header equals the name exactly.
    Exact,
}

impl ColumnMatch {
    /// Returns the rule name as used in config files.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::ExactIgnoreCase => "exact-ignore-case",
            Self::Exact => "exact",
        }
    }

    /// Whether `header` satisfies the required column `name`.
    pub fn matches(&self, header: &str, name: &str) -> bool {
        match self {
            Self::Contains => header.to_lowercase().contains(&name.to_lowercase()),
            Self::ExactIgnoreCase => header.to_lowercase() == name.to_lowercase(),
            Self::Exact => header == name,
        }
    }
}

impl std::fmt::Display for ColumnMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for [`validate_structure_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureRules {
    /// Column names that must each be matched by some header.
    pub required_columns: Vec<String>,
    /// Header matching rule.
    pub column_match: ColumnMatch,
    /// Language of the produced messages.
    pub locale: Locale,
}

impl Default for StructureRules {
    fn default() -> Self {
        Self {
            required_columns: REQUIRED_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            column_match: ColumnMatch::default(),
            locale: Locale::default(),
        }
    }
}

/// Validate a table against the default rules.
pub fn validate_structure(table: &ParsedTable) -> ValidationOutcome {
    validate_structure_with(table, &StructureRules::default())
}

/// Validate a table's shape.
///
/// Missing columns are combined into one message, listed in required order.
/// Rows of the wrong width are counted, not located.
#[tracing::instrument(skip_all, fields(columns = table.headers.len(), rows = table.rows.len()))]
pub fn validate_structure_with(table: &ParsedTable, rules: &StructureRules) -> ValidationOutcome {
    let mut errors = Vec::new();

    let missing = missing_columns(table, rules);
    if !missing.is_empty() {
        errors.push(messages::missing_columns(rules.locale, &missing));
    }

    if table.rows.is_empty() {
        errors.push(messages::no_data(rules.locale));
    }

    let mismatched = table.mismatched_rows().count();
    if mismatched > 0 {
        errors.push(messages::width_mismatch(rules.locale, mismatched));
    }

    tracing::debug!(
        missing = missing.len(),
        mismatched,
        errors = errors.len(),
        "structure validated"
    );
    ValidationOutcome::from_errors(errors)
}

/// Required column names with no matching header.
pub fn missing_columns<'a>(table: &ParsedTable, rules: &'a StructureRules) -> Vec<&'a str> {
    rules
        .required_columns
        .iter()
        .filter(|name| {
            !table
                .headers
                .iter()
                .any(|header| rules.column_match.matches(header, name))
        })
        .map(String::as_str)
        .collect()
}

/// A starter CSV containing the required columns and one example row.
pub fn csv_template(required_columns: &[String]) -> String {
    let header = required_columns.join(",");
    let example: Vec<&str> = required_columns
        .iter()
        .map(|column| example_value(column))
        .collect();
    format!("{header}\n{}\n", example.join(","))
}

fn example_value(column: &str) -> &'static str {
    match column {
        "Id" => "1",
        "DataAvaliacao" => "2024-01-15",
        "Propriedade" => "Fazenda Norte",
        "NomeCultura" => "Soja",
        _ => "",
    }
}
