//! The result snapshot shared by the guard and the structural validator.

use schemars::JsonSchema;
use serde::Serialize;

/// Outcome of one validation call.
///
/// Valid exactly when no errors were collected. The snapshot cannot be
/// changed after construction; callers inspect it and drop it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ValidationOutcome {
    is_valid: bool,
    errors: Vec<String>,
}

impl ValidationOutcome {
    /// Build an outcome from the errors a check collected.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// An outcome with no errors.
    pub const fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Whether the checked input passed.
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Collected error messages, in the order the rules were evaluated.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// All messages joined into one user-facing line.
    pub fn joined(&self) -> String {
        self.errors.join(" ")
    }
}
