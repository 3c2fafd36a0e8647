//! CSV store adapter.
//!
//! One row per variable under the header
//! `variable,maximum,minimum,returnmin,returnmax`. Decimals are written in
//! plain notation with their stored scale, so a file read back compares
//! equal field for field.

use crate::domain::error::TradeBoundsError;
use crate::domain::store::{VariableRecord, VariableStore};
use crate::domain::variable::{Field, Variable};
use crate::ports::export_port::{ExportFormat, ExportPort};
use crate::ports::store_port::StorePort;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CSV_HEADER: [&str; 5] = ["variable", "maximum", "minimum", "returnmin", "returnmax"];

pub fn write_csv(store: &VariableStore) -> Result<Vec<u8>, TradeBoundsError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER).map_err(export_error)?;

    for (variable, record) in store.records() {
        let mut row = vec![variable.name().to_string()];
        row.extend(Field::ALL.iter().map(|f| record.field(*f).to_string()));
        wtr.write_record(&row).map_err(export_error)?;
    }

    wtr.into_inner().map_err(|e| TradeBoundsError::Export {
        reason: format!("CSV flush error: {}", e),
    })
}

pub fn read_csv(bytes: &[u8]) -> Result<VariableStore, TradeBoundsError> {
    let mut rdr = csv::Reader::from_reader(bytes);

    let headers = rdr.headers().map_err(|e| TradeBoundsError::Import {
        line: 1,
        reason: format!("CSV header error: {}", e),
    })?;
    let names: Vec<&str> = headers.iter().map(str::trim).collect();
    if names != CSV_HEADER {
        return Err(TradeBoundsError::Import {
            line: 1,
            reason: format!("unexpected header: {}", names.join(",")),
        });
    }

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let line = i + 2;
        let record = result.map_err(|e| TradeBoundsError::Import {
            line,
            reason: format!("CSV parse error: {}", e),
        })?;

        let name = record.get(0).ok_or_else(|| TradeBoundsError::Import {
            line,
            reason: "missing variable column".into(),
        })?;
        let variable: Variable = name.parse()?;

        let column = |idx: usize| -> Result<Decimal, TradeBoundsError> {
            let raw = record.get(idx).ok_or_else(|| TradeBoundsError::Import {
                line,
                reason: format!("missing {} column", CSV_HEADER[idx]),
            })?;
            Decimal::from_str(raw.trim()).map_err(|e| TradeBoundsError::Import {
                line,
                reason: format!("invalid {} value {:?}: {}", CSV_HEADER[idx], raw, e),
            })
        };

        rows.push((
            variable,
            VariableRecord {
                maximum: column(1)?,
                minimum: column(2)?,
                returnmin: column(3)?,
                returnmax: column(4)?,
            },
        ));
    }

    VariableStore::from_records(rows)
}

fn export_error(e: csv::Error) -> TradeBoundsError {
    TradeBoundsError::Export {
        reason: format!("CSV write error: {}", e),
    }
}

/// A store kept in a single CSV file.
pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorePort for CsvAdapter {
    fn load(&self) -> Result<VariableStore, TradeBoundsError> {
        let content = fs::read(&self.path).map_err(|e| TradeBoundsError::Import {
            line: 0,
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let store = read_csv(&content)?;
        tracing::debug!(path = %self.path.display(), "loaded store from CSV");
        Ok(store)
    }

    fn persist(&self, store: &VariableStore) -> Result<(), TradeBoundsError> {
        let bytes = write_csv(store)?;
        fs::write(&self.path, bytes).map_err(|e| TradeBoundsError::Export {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })?;
        tracing::debug!(path = %self.path.display(), "persisted store to CSV");
        Ok(())
    }

    fn reset(&self) -> Result<(), TradeBoundsError> {
        self.persist(&VariableStore::new())
    }
}

impl ExportPort for CsvAdapter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn render(&self, store: &VariableStore) -> Result<Vec<u8>, TradeBoundsError> {
        write_csv(store)
    }
}
