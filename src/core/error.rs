use thiserror::Error;

/// Errors that can occur while building, exporting, validating or
/// importing an invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// An argument violated a model invariant at the call that set it
    /// (e.g. more than 3 address lines, base quantity <= 0, removal
    /// index out of bounds).
    #[error("range error: {0}")]
    Range(String),

    /// A field required to emit a compliant document is missing.
    #[error("export error: [{rule}] {message}")]
    Export {
        /// EN 16931 business rule the document would violate (e.g. "BR-6").
        rule: String,
        /// Human-readable description.
        message: String,
    },

    /// A business rule of the invoice's rule set failed.
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// Malformed XML or an unparsable scalar during import.
    #[error("parse error: {0}")]
    Parse(String),
}

impl InvoiceError {
    pub(crate) fn export(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Export {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Stable business rule identifier, if the error carries one.
    ///
    /// Range and parse errors have no rule: the document is not yet a
    /// valid invoice to evaluate rules against.
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            Self::Export { rule, .. } => Some(rule),
            Self::Validation(e) => Some(&e.rule),
            Self::Range(_) | Self::Parse(_) => None,
        }
    }
}

impl From<ValidationError> for InvoiceError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

/// A single failed business rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier (e.g. "BR-16", "PEPPOL-EN16931-R003").
    pub rule: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Shorthand for the range error returned by collection removals.
pub(crate) fn index_out_of_range(what: &str, index: usize, len: usize) -> InvoiceError {
    InvoiceError::Range(format!(
        "{what} index {index} out of range (collection has {len} items)"
    ))
}
