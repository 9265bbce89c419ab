//! Size/type admissibility guard.
//!
//! Runs on file metadata alone, before any content is read. Every rule is
//! evaluated so the user sees all problems at once.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Locale;
use crate::messages;
use crate::outcome::ValidationOutcome;

/// Largest accepted upload: 50 MiB.
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Metadata of a candidate upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileDescriptor {
    /// File name as supplied by the user.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Declared MIME type, if the source supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileDescriptor {
    /// Describe a file with no declared content type.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: None,
        }
    }

    /// Attach a declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Check a file against the default limit and English messages.
pub fn check_file(descriptor: &FileDescriptor) -> ValidationOutcome {
    check_file_with(descriptor, MAX_FILE_BYTES, Locale::default())
}

/// Check a file's extension, size and declared type.
///
/// An absent or empty content type passes: browsers and file systems often
/// leave it blank for `.csv` files.
#[tracing::instrument(skip(descriptor), fields(name = %descriptor.name, size = descriptor.size))]
pub fn check_file_with(
    descriptor: &FileDescriptor,
    max_bytes: u64,
    locale: Locale,
) -> ValidationOutcome {
    let mut errors = Vec::new();

    if !descriptor.name.to_lowercase().ends_with(".csv") {
        errors.push(messages::invalid_format(locale));
    }

    errors.extend(check_size(descriptor.size, max_bytes, locale));

    if let Some(content_type) = descriptor.content_type.as_deref()
        && !content_type.is_empty()
        && !content_type.contains("csv")
        && !content_type.contains("text")
    {
        errors.push(messages::invalid_file_type(locale));
    }

    tracing::debug!(errors = errors.len(), "guard evaluated");
    ValidationOutcome::from_errors(errors)
}

/// The size rule alone, for read paths that do not need the full guard.
///
/// Returns the "too large" message when `size` exceeds `max_bytes`.
pub fn check_size(size: u64, max_bytes: u64, locale: Locale) -> Option<String> {
    (size > max_bytes).then(|| messages::file_too_large(locale, max_bytes))
}
