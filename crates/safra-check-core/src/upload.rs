//! The pre-upload pipeline: guard, read, parse, validate, hand off.
//!
//! [`prepare_upload`] is the only entry point the surrounding workflow
//! needs. It stops at the first failing stage and never touches the
//! network; on success it gives the source back together with the parsed
//! table, ready for the upload collaborator.
//!
//! ```
//! use safra_check_core::upload::{InMemoryCsv, UploadOptions, prepare_upload};
//!
//! let file = InMemoryCsv::new(
//!     "amostragem.csv",
//!     "Id,DataAvaliacao,Propriedade,NomeCultura\n1,2024-03-01,Fazenda Sul,Milho\n",
//! );
//! let upload = prepare_upload(file, &UploadOptions::default()).unwrap();
//! assert_eq!(upload.row_count(), 1);
//! ```

use std::io;

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::{Config, Locale};
use crate::error::{UploadError, UploadResult};
use crate::guard::{self, FileDescriptor, MAX_FILE_BYTES};
use crate::history::UploadRecord;
use crate::messages;
use crate::parse::{self, ParsedTable, ParserMode};
use crate::structure::{self, StructureRules};

/// A file offered for upload.
///
/// `read_text` is called at most once per pipeline run, and only after the
/// guard has accepted [`descriptor`](Self::descriptor).
pub trait CsvSource {
    /// Name, size and declared type, available without reading content.
    fn descriptor(&self) -> FileDescriptor;

    /// The full content as text.
    fn read_text(&self) -> io::Result<String>;
}

/// A CSV file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalCsvFile {
    path: Utf8PathBuf,
    size: u64,
    content_type: Option<String>,
}

impl LocalCsvFile {
    /// Stat `path`. The content is not read.
    pub fn open(path: impl AsRef<Utf8Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(path.as_std_path())?;
        Ok(Self {
            path,
            size: metadata.len(),
            content_type: None,
        })
    }

    /// Declare a MIME type for the guard to check.
    #[must_use]
    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl CsvSource for LocalCsvFile {
    fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            name: self
                .path
                .file_name()
                .unwrap_or(self.path.as_str())
                .to_string(),
            size: self.size,
            content_type: self.content_type.clone(),
        }
    }

    /// Invalid UTF-8 (e.g. Windows-1252 exports) is replaced, not rejected.
    fn read_text(&self) -> io::Result<String> {
        let bytes = std::fs::read(self.path.as_std_path())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// CSV content already held in memory (request bodies, tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryCsv {
    name: String,
    content: String,
    content_type: Option<String>,
}

impl InMemoryCsv {
    /// Wrap `content` under the file name `name`.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            content_type: None,
        }
    }

    /// Declare a MIME type for the guard to check.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl CsvSource for InMemoryCsv {
    fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            name: self.name.clone(),
            size: self.content.len() as u64,
            content_type: self.content_type.clone(),
        }
    }

    fn read_text(&self) -> io::Result<String> {
        Ok(self.content.clone())
    }
}

/// Everything the pipeline needs to know besides the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Largest accepted file in bytes.
    pub max_file_bytes: u64,
    /// Tokenizer for the content.
    pub parser: ParserMode,
    /// Structural rules, including the message locale.
    pub rules: StructureRules,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_BYTES,
            parser: ParserMode::default(),
            rules: StructureRules::default(),
        }
    }
}

impl UploadOptions {
    /// Options described by a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_file_bytes: config.effective_max_file_bytes(),
            parser: config.parser.unwrap_or_default(),
            rules: config.structure_rules(),
        }
    }

    /// Override the tokenizer.
    #[must_use]
    pub fn with_parser(mut self, parser: ParserMode) -> Self {
        self.parser = parser;
        self
    }

    /// Language of produced messages.
    pub const fn locale(&self) -> Locale {
        self.rules.locale
    }
}

/// A file that passed every check, ready for the upload collaborator.
#[derive(Debug, Clone)]
pub struct ValidatedUpload<S> {
    source: S,
    descriptor: FileDescriptor,
    table: ParsedTable,
}

impl<S> ValidatedUpload<S> {
    /// The original file.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Metadata the guard accepted.
    pub const fn descriptor(&self) -> &FileDescriptor {
        &self.descriptor
    }

    /// The parsed content.
    pub const fn table(&self) -> &ParsedTable {
        &self.table
    }

    /// Data rows in the file.
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// A pending history record carrying this file's row count.
    pub fn pending_record(&self) -> UploadRecord {
        UploadRecord::with_record_count(&self.descriptor, self.row_count())
    }

    /// Give back the original file and the parsed table.
    pub fn into_parts(self) -> (S, ParsedTable) {
        (self.source, self.table)
    }
}

/// Run the pre-upload checks on `source`.
///
/// Stages run in order and the first failing stage ends the run:
/// 1. the guard, on metadata only; a rejected file is never read
/// 2. reading the content
/// 3. parsing, whose message is passed through unchanged
/// 4. structural validation, with every violation collected
#[tracing::instrument(skip_all, fields(parser = %options.parser))]
pub fn prepare_upload<S: CsvSource>(
    source: S,
    options: &UploadOptions,
) -> UploadResult<ValidatedUpload<S>> {
    let locale = options.locale();
    let descriptor = source.descriptor();
    tracing::debug!(name = %descriptor.name, size = descriptor.size, "checking upload");

    let admitted = guard::check_file_with(&descriptor, options.max_file_bytes, locale);
    if !admitted.is_valid() {
        tracing::debug!(name = %descriptor.name, errors = admitted.errors().len(), "file rejected by guard");
        return Err(UploadError::Rejected(admitted));
    }

    let text = source
        .read_text()
        .map_err(|e| UploadError::read(locale, e))?;

    let table = parse::parse_with(&text, options.parser).map_err(|e| UploadError::Parse {
        message: messages::parse_failed(locale, &e),
        source: e,
    })?;

    let outcome = structure::validate_structure_with(&table, &options.rules);
    if !outcome.is_valid() {
        tracing::debug!(name = %descriptor.name, errors = outcome.errors().len(), "file failed structural validation");
        return Err(UploadError::Structure(outcome));
    }

    tracing::debug!(name = %descriptor.name, rows = table.row_count(), "file ready for upload");
    Ok(ValidatedUpload {
        source,
        descriptor,
        table,
    })
}
