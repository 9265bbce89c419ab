//! Turning raw CSV text into a header row and a matrix of cells.
//!
//! The default [`ParserMode::Simple`] splits every line on commas and strips
//! double quotes. It has no quoting support: a comma inside a quoted cell
//! splits that cell in two. [`ParserMode::Rfc4180`] is the opt-in strict
//! alternative for files that quote their cells.
//!
//! Neither mode coerces types or repairs row widths; every cell stays text
//! and width mismatches are left for the structural validator to count.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Which tokenizer to run over the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ParserMode {
    /// Split on commas, trim, drop every `"` character.
    #[default]
    Simple,
    /// Quote-aware parsing per RFC 4180.
    Rfc4180,
}

impl ParserMode {
    /// Returns the mode name as used in config files.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Rfc4180 => "rfc4180",
        }
    }
}

impl std::fmt::Display for ParserMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed CSV file: headers plus data rows, all as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedTable {
    /// Header labels in file order.
    pub headers: Vec<String>,
    /// Data rows in file order.
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    /// Number of data rows (the header is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of header labels.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Rows whose width differs from the header's, in file order.
    pub fn mismatched_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        let width = self.headers.len();
        self.rows.iter().filter(move |row| row.len() != width)
    }
}

/// Parse with the default lenient tokenizer.
pub fn parse(text: &str) -> ParseResult<ParsedTable> {
    parse_with(text, ParserMode::Simple)
}

/// Parse with the chosen tokenizer.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn parse_with(text: &str, mode: ParserMode) -> ParseResult<ParsedTable> {
    // Spreadsheet exports often start with a UTF-8 byte order mark.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let table = match mode {
        ParserMode::Simple => parse_simple(text)?,
        ParserMode::Rfc4180 => parse_strict(text)?,
    };
    tracing::debug!(
        columns = table.column_count(),
        rows = table.row_count(),
        "parsed table"
    );
    Ok(table)
}

fn parse_simple(text: &str) -> ParseResult<ParsedTable> {
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());

    let header = lines.next().ok_or(ParseError::EmptyFile)?;
    let headers = split_line(header);
    let rows = lines.map(split_line).collect();

    Ok(ParsedTable { headers, rows })
}

fn split_line(line: &str) -> Vec<String> {
    line.split(',')
        .map(|cell| cell.trim().replace('"', ""))
        .collect()
}

fn parse_strict(text: &str) -> ParseResult<ParsedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ParseError::Malformed {
            line: e.position().map_or(0, csv::Position::line),
            detail: e.to_string(),
        })?;
        // Whitespace-only lines come back as a single empty field.
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }
        records.push(record.iter().map(str::to_owned).collect::<Vec<_>>());
    }

    let mut records = records.into_iter();
    let headers = records.next().ok_or(ParseError::EmptyFile)?;

    Ok(ParsedTable {
        headers,
        rows: records.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(parse(""), Err(ParseError::EmptyFile));
        assert_eq!(parse("   \n  \n"), Err(ParseError::EmptyFile));
        assert_eq!(parse("\r\n\t\r\n"), Err(ParseError::EmptyFile));
    }

    #[test]
    fn header_and_one_row() {
        let table = parse("a,b\n1,2").unwrap();
        assert_eq!(table.headers, cells(&["a", "b"]));
        assert_eq!(table.rows, vec![cells(&["1", "2"])]);
    }

    #[test]
    fn header_only_yields_no_rows() {
        let table = parse("Id,Propriedade\n").unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let table = parse("\n\na,b\n\n   \n1,2\n\n3,4\n").unwrap();
        assert_eq!(table.headers, cells(&["a", "b"]));
        assert_eq!(table.rows, vec![cells(&["1", "2"]), cells(&["3", "4"])]);
    }

    #[test]
    fn cells_are_trimmed_and_unquoted() {
        let table = parse("\"Id\" , \"Nome Cultura\"\r\n \"1\",  Soja \r\n").unwrap();
        assert_eq!(table.headers, cells(&["Id", "Nome Cultura"]));
        assert_eq!(table.rows, vec![cells(&["1", "Soja"])]);
    }

    #[test]
    fn quoted_commas_split_in_simple_mode() {
        let table = parse("a,b\n\"x,y\",z").unwrap();
        assert_eq!(table.rows, vec![cells(&["x", "y", "z"])]);
        assert_eq!(table.mismatched_rows().count(), 1);
    }

    #[test]
    fn widths_are_not_repaired() {
        let table = parse("a,b,c\n1,2\n1,2,3,4\n1,2,3").unwrap();
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[1].len(), 4);
        assert_eq!(table.mismatched_rows().count(), 2);
    }

    #[test]
    fn empty_cells_are_kept() {
        let table = parse("a,b,c\n,,").unwrap();
        assert_eq!(table.rows, vec![cells(&["", "", ""])]);
    }

    #[test]
    fn strict_mode_keeps_quoted_commas() {
        let table = parse_with("a,b\n\"x,y\",z\n", ParserMode::Rfc4180).unwrap();
        assert_eq!(table.rows, vec![cells(&["x,y", "z"])]);
        assert_eq!(table.mismatched_rows().count(), 0);
    }

    #[test]
    fn strict_mode_handles_escaped_quotes_and_newlines() {
        let text = "Id,Obs\n1,\"disse \"\"ok\"\"\"\n2,\"linha\numa\"\n";
        let table = parse_with(text, ParserMode::Rfc4180).unwrap();
        assert_eq!(table.rows[0], cells(&["1", "disse \"ok\""]));
        assert_eq!(table.rows[1], cells(&["2", "linha\numa"]));
    }

    #[test]
    fn strict_mode_skips_blank_lines_and_keeps_widths() {
        let table = parse_with("a,b\n\n  \n1\n1,2,3\n,,\n", ParserMode::Rfc4180).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], cells(&["1"]));
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.rows[2], cells(&["", "", ""]));
    }

    #[test]
    fn byte_order_mark_is_dropped_in_both_modes() {
        for mode in [ParserMode::Simple, ParserMode::Rfc4180] {
            let table = parse_with("\u{feff}Id,b\n1,2", mode).unwrap();
            assert_eq!(table.headers, cells(&["Id", "b"]), "{mode}");
            assert_eq!(table.rows, vec![cells(&["1", "2"])], "{mode}");
        }
    }

    #[test]
    fn strict_mode_empty_input_fails() {
        assert_eq!(parse_with("", ParserMode::Rfc4180), Err(ParseError::EmptyFile));
        assert_eq!(
            parse_with(" \n\n ", ParserMode::Rfc4180),
            Err(ParseError::EmptyFile)
        );
    }

    #[test]
    fn parser_mode_names() {
        assert_eq!(ParserMode::Simple.as_str(), "simple");
        assert_eq!(ParserMode::Rfc4180.to_string(), "rfc4180");
    }
}
