//! Export port trait.

use crate::domain::error::TradeBoundsError;
use crate::domain::store::VariableStore;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Sql,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Sql => "sql",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = TradeBoundsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "sql" => Ok(ExportFormat::Sql),
            other => Err(TradeBoundsError::Export {
                reason: format!("unsupported export format: {other}"),
            }),
        }
    }
}

/// Renders a store in one serialization format.
pub trait ExportPort {
    fn format(&self) -> ExportFormat;

    fn render(&self, store: &VariableStore) -> Result<Vec<u8>, TradeBoundsError>;
}
