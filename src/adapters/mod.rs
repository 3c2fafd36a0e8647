//! Concrete adapter implementations for ports.

#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod console_report;
pub mod csv_adapter;
pub mod export;
pub mod file_config_adapter;
pub mod sql_dump_adapter;
