//! Core library for safra-check.
//!
//! Decides whether a pest-sampling CSV file can be sent to the analysis
//! service, before anything goes over the network.
//!
//! # Modules
//!
//! - [`guard`] - Extension, size and MIME type admissibility
//! - [`parse`] - Raw text to headers and rows
//! - [`structure`] - Required columns, non-empty data, row widths
//! - [`upload`] - The guard → read → parse → validate pipeline
//! - [`history`] - Upload records and their lifecycle
//! - [`format`] - Byte sizes and record counts for display
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! use safra_check_core::{parse, validate_structure};
//!
//! let table = parse("Id,DataAvaliacao,Propriedade,NomeCultura\n7,2024-02-10,Sítio Boa Vista,Café")
//!     .expect("non-empty input");
//! let outcome = validate_structure(&table);
//! assert!(outcome.is_valid());
//! ```
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod format;
pub mod guard;
pub mod history;
mod messages;
pub mod outcome;
pub mod parse;
pub mod structure;
pub mod upload;

pub use config::{Config, ConfigLoader, ConfigSources, Locale, LogLevel};
pub use error::{ConfigError, ConfigResult, HistoryError, ParseError, UploadError, UploadResult};
pub use format::{format_file_size, format_record_count};
pub use guard::{FileDescriptor, MAX_FILE_BYTES, check_file};
pub use history::{UploadHistory, UploadId, UploadRecord, UploadStatus};
pub use outcome::ValidationOutcome;
pub use parse::{ParsedTable, ParserMode, parse};
pub use structure::{ColumnMatch, REQUIRED_COLUMNS, validate_structure};
pub use upload::{CsvSource, InMemoryCsv, LocalCsvFile, UploadOptions, ValidatedUpload, prepare_upload};
