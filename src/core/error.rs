use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort extraction or rendering.
///
/// Missing fields are never errors: they resolve to defaults. Totals that do
/// not reconcile are reported as [`Finding`]s on the record instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NirError {
    /// The document is not a traversable tree (e.g. the envelope is missing).
    #[error("structural error: {0}")]
    Structure(String),

    /// A lookup path was empty or contained an empty segment.
    #[error("invalid path '{0}'")]
    InvalidPath(String),

    /// The document has more lines than the configured bound.
    #[error("document has {count} lines, limit is {max}")]
    TooManyLines { count: usize, max: usize },

    /// XML could not be read into a tree.
    #[error("XML error: {0}")]
    Xml(String),

    /// PDF or workbook generation failed.
    #[error("render error: {0}")]
    Render(String),
}

/// How serious a reconciliation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A non-fatal problem detected while reconciling a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity.as_str(), self.message)
    }
}

impl Finding {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
