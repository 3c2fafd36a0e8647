//! Domain error types.

/// Top-level error type for tradebounds.
#[derive(Debug, thiserror::Error)]
pub enum TradeBoundsError {
    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    #[error("unknown field: {name}")]
    UnknownField { name: String },

    #[error("variable {variable} is missing from the store")]
    MissingVariable { variable: String },

    #[error("variable {variable} appears more than once")]
    DuplicateVariable { variable: String },

    #[error("field {field} is derived and only written by recompute")]
    DerivedField { field: String },

    #[error("invalid value {value:?}: {reason}")]
    InvalidValue { value: String, reason: String },

    #[error("calculation error in {operation}: {reason}")]
    Calculation {
        operation: &'static str,
        reason: String,
    },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error("import error at line {line}: {reason}")]
    Import { line: usize, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradeBoundsError {
    pub fn calculation(operation: &'static str, reason: impl Into<String>) -> Self {
        TradeBoundsError::Calculation {
            operation,
            reason: reason.into(),
        }
    }

    /// True for the lookup failures: unknown names and absent rows.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TradeBoundsError::UnknownVariable { .. }
                | TradeBoundsError::UnknownField { .. }
                | TradeBoundsError::MissingVariable { .. }
        )
    }

    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            TradeBoundsError::Database { .. }
                | TradeBoundsError::DatabaseQuery { .. }
                | TradeBoundsError::Export { .. }
                | TradeBoundsError::Import { .. }
                | TradeBoundsError::DuplicateVariable { .. }
        )
    }
}

impl From<&TradeBoundsError> for std::process::ExitCode {
    fn from(err: &TradeBoundsError) -> Self {
        let code: u8 = match err {
            TradeBoundsError::Io(_) => 1,
            TradeBoundsError::ConfigParse { .. }
            | TradeBoundsError::ConfigMissing { .. }
            | TradeBoundsError::ConfigInvalid { .. } => 2,
            TradeBoundsError::Database { .. }
            | TradeBoundsError::DatabaseQuery { .. }
            | TradeBoundsError::Export { .. }
            | TradeBoundsError::Import { .. }
            | TradeBoundsError::DuplicateVariable { .. } => 3,
            TradeBoundsError::UnknownVariable { .. }
            | TradeBoundsError::UnknownField { .. }
            | TradeBoundsError::MissingVariable { .. }
            | TradeBoundsError::DerivedField { .. }
            | TradeBoundsError::InvalidValue { .. } => 4,
            TradeBoundsError::Calculation { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
