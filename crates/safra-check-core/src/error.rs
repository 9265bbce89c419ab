//! Error types for safra-check-core.

use thiserror::Error;

use crate::config::Locale;
use crate::history::{UploadId, UploadStatus};
use crate::messages;
use crate::outcome::ValidationOutcome;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while turning raw text into a table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input has no non-blank lines.
    #[error("empty CSV file")]
    EmptyFile,

    /// The strict reader could not tokenize the input.
    #[error("malformed CSV at line {line}: {detail}")]
    Malformed {
        /// 1-based line where the reader gave up.
        line: u64,
        /// Reader diagnostic.
        detail: String,
    },
}

/// Result type alias using [`ParseError`].
pub type ParseResult<T> = Result<T, ParseError>;

/// Reasons an upload attempt stops before reaching the upload collaborator.
///
/// Every variant displays as a single user-facing message, already rendered
/// in the locale the pipeline ran with.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The file failed the size/type guard; its content was never read.
    #[error("{}", .0.joined())]
    Rejected(ValidationOutcome),

    /// The file passed the guard but its content could not be read.
    #[error("{message}")]
    Read {
        /// Localized message shown to the user.
        message: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The content could not be tokenized into a table.
    #[error("{message}")]
    Parse {
        /// Localized message shown to the user.
        message: String,
        /// Underlying parser failure.
        #[source]
        source: ParseError,
    },

    /// The table parsed but violates one or more structural rules.
    #[error("{}", .0.joined())]
    Structure(ValidationOutcome),
}

impl UploadError {
    /// A read failure with its message rendered in `locale`.
    pub fn read(locale: Locale, source: std::io::Error) -> Self {
        Self::Read {
            message: messages::read_failed(locale, &source),
            source,
        }
    }

    /// Short machine-readable label for the failure kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "rejected",
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
            Self::Structure(_) => "structure",
        }
    }

    /// The individual messages behind this failure, in report order.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Rejected(outcome) | Self::Structure(outcome) => outcome.errors().to_vec(),
            Self::Read { message, .. } | Self::Parse { message, .. } => vec![message.clone()],
        }
    }
}

/// Result type alias using [`UploadError`].
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors raised by the upload history container.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The requested lifecycle transition is not allowed.
    #[error("cannot move upload from {from} to {to}")]
    InvalidTransition {
        /// Status the record was in.
        from: UploadStatus,
        /// Status that was requested.
        to: UploadStatus,
    },

    /// No record with this identity exists.
    #[error("unknown upload: {0}")]
    UnknownUpload(UploadId),
}

/// Result type alias using [`HistoryError`].
pub type HistoryResult<T> = Result<T, HistoryError>;
