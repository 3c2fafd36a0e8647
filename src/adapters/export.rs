//! Format dispatch for store exports.

use crate::adapters::csv_adapter;
use crate::adapters::sql_dump_adapter::SqlDumpAdapter;
use crate::domain::error::TradeBoundsError;
use crate::domain::store::VariableStore;
use crate::ports::export_port::{ExportFormat, ExportPort};
use std::fs;
use std::path::{Path, PathBuf};

/// Renders `store` with the default table name for SQL dumps.
pub fn export(format: ExportFormat, store: &VariableStore) -> Result<Vec<u8>, TradeBoundsError> {
    match format {
        ExportFormat::Csv => csv_adapter::write_csv(store),
        ExportFormat::Sql => SqlDumpAdapter::default().render(store),
    }
}

/// `<directory>/<basename>.<extension>`
pub fn default_export_path(directory: &Path, basename: &str, format: ExportFormat) -> PathBuf {
    directory.join(format!("{basename}.{}", format.extension()))
}

/// Renders with `port` and writes the bytes to `path`.
pub fn export_to_file(
    port: &dyn ExportPort,
    store: &VariableStore,
    path: &Path,
) -> Result<usize, TradeBoundsError> {
    let bytes = port.render(store)?;
    fs::write(path, &bytes).map_err(|e| TradeBoundsError::Export {
        reason: format!("failed to write {}: {}", path.display(), e),
    })?;
    tracing::info!(format = %port.format(), path = %path.display(), bytes = bytes.len(), "store exported");
    Ok(bytes.len())
}
