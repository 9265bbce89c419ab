//! User-facing message catalog.
//!
//! English is the default. The Brazilian Portuguese copy matches the text
//! the upload page has always shown, so existing UI strings keep working
//! when `locale = "pt-br"` is configured.

use crate::config::Locale;
use crate::format::format_file_size;

pub(crate) fn invalid_format(locale: Locale) -> String {
    match locale {
        Locale::En => "Invalid file format. Only CSV files are accepted.".into(),
        Locale::PtBr => "Formato de arquivo inválido. Apenas arquivos CSV são aceitos.".into(),
    }
}

pub(crate) fn file_too_large(locale: Locale, limit_bytes: u64) -> String {
    let limit = format_file_size(limit_bytes);
    match locale {
        Locale::En => format!("File too large. Maximum allowed size: {limit}."),
        Locale::PtBr => format!("Arquivo muito grande. Tamanho máximo permitido: {limit}."),
    }
}

pub(crate) fn invalid_file_type(locale: Locale) -> String {
    match locale {
        Locale::En => "Invalid file type.".into(),
        Locale::PtBr => "Tipo de arquivo inválido.".into(),
    }
}

pub(crate) fn missing_columns(locale: Locale, missing: &[&str]) -> String {
    let list = missing.join(", ");
    match locale {
        Locale::En => format!("Missing required columns: {list}"),
        Locale::PtBr => format!("Colunas obrigatórias ausentes: {list}"),
    }
}

pub(crate) fn no_data(locale: Locale) -> String {
    match locale {
        Locale::En => "File contains no data.".into(),
        Locale::PtBr => "Arquivo não contém dados.".into(),
    }
}

pub(crate) fn width_mismatch(locale: Locale, rows: usize) -> String {
    match locale {
        Locale::En => format!("{rows} row(s) with an incorrect number of columns."),
        Locale::PtBr => format!("{rows} linha(s) com número incorreto de colunas."),
    }
}

pub(crate) fn read_failed(locale: Locale, err: &std::io::Error) -> String {
    match locale {
        Locale::En => format!("Failed to read file: {err}"),
        Locale::PtBr => format!("Erro ao ler arquivo: {err}"),
    }
}

pub(crate) fn parse_failed(locale: Locale, err: &crate::error::ParseError) -> String {
    use crate::error::ParseError;
    match (locale, err) {
        (Locale::En, ParseError::EmptyFile) => "Empty CSV file".into(),
        (Locale::PtBr, ParseError::EmptyFile) => "Arquivo CSV vazio".into(),
        (Locale::En, ParseError::Malformed { line, detail }) => {
            format!("Malformed CSV at line {line}: {detail}")
        }
        (Locale::PtBr, ParseError::Malformed { line, detail }) => {
            format!("CSV malformado na linha {line}: {detail}")
        }
    }
}

/// Singular or plural record unit.
pub(crate) const fn record_unit(locale: Locale, count: u64) -> &'static str {
    match (locale, count == 1) {
        (Locale::En, true) => "record",
        (Locale::En, false) => "records",
        (Locale::PtBr, true) => "registro",
        (Locale::PtBr, false) => "registros",
    }
}
