//! SQLite store adapter.
//!
//! Decimals are written as TEXT so values keep their exact digits and scale.
//! Tables created by older tools with numeric `DECIMAL(20,8)` columns and no
//! key on `variable` are read and written as well.

use crate::adapters::sql_dump_adapter::DEFAULT_TABLE;
use crate::domain::config_validation::{is_identifier, MAX_POOL_SIZE};
use crate::domain::error::TradeBoundsError;
use crate::domain::store::{VariableRecord, VariableStore};
use crate::domain::variable::{Field, Variable};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use rusqlite::types::ValueRef;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const DEFAULT_DB_PATH: &str = "ConsoleDataBase.db";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
    table: String,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradeBoundsError> {
        let db_path = config
            .get_string("sqlite", "path")
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let pool_size = pool_size(config)?;
        let table = config
            .get_string("sqlite", "table")
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| TradeBoundsError::Database {
                    reason: e.to_string(),
                })?;

        tracing::debug!(path = %db_path, pool_size, table = %table, "opened sqlite store");
        Self::with_table(pool, table)
    }

    pub fn in_memory() -> Result<Self, TradeBoundsError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TradeBoundsError::Database {
                reason: e.to_string(),
            })?;

        Self::with_table(pool, DEFAULT_TABLE.to_string())
    }

    fn with_table(
        pool: Pool<SqliteConnectionManager>,
        table: String,
    ) -> Result<Self, TradeBoundsError> {
        if !is_identifier(&table) {
            return Err(TradeBoundsError::ConfigInvalid {
                section: "sqlite".into(),
                key: "table".into(),
                reason: format!("{table:?} is not a plain identifier"),
            });
        }
        Ok(Self { pool, table })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, TradeBoundsError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| TradeBoundsError::Database {
                reason: e.to_string(),
            })
    }

    /// Creates the table unless one with this name already exists.
    pub fn initialize_schema(&self) -> Result<(), TradeBoundsError> {
        let conn = self.conn()?;

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {t} (
                variable TEXT PRIMARY KEY,
                maximum TEXT NOT NULL DEFAULT '0',
                minimum TEXT NOT NULL DEFAULT '0',
                returnmin TEXT NOT NULL DEFAULT '0',
                returnmax TEXT NOT NULL DEFAULT '0'
            );",
            t = self.table
        ))
        .map_err(query_error)?;

        Ok(())
    }

    pub fn row_count(&self) -> Result<usize, TradeBoundsError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| {
                row.get(0)
            })
            .map_err(query_error)?;
        Ok(count as usize)
    }

    /// Writes the defaults when the table holds no rows yet. Returns true if it did.
    pub fn seed_defaults_if_empty(&self) -> Result<bool, TradeBoundsError> {
        if self.row_count()? > 0 {
            return Ok(false);
        }
        self.persist(&VariableStore::new())?;
        tracing::info!(table = %self.table, "seeded default variables");
        Ok(true)
    }
}

fn pool_size(config: &dyn ConfigPort) -> Result<u32, TradeBoundsError> {
    let raw = config.get_int("sqlite", "pool_size", 1);
    u32::try_from(raw)
        .ok()
        .filter(|size| (1..=MAX_POOL_SIZE).contains(size))
        .ok_or_else(|| TradeBoundsError::ConfigInvalid {
            section: "sqlite".into(),
            key: "pool_size".into(),
            reason: format!("pool_size must be between 1 and {MAX_POOL_SIZE}, got {raw}"),
        })
}

impl StorePort for SqliteAdapter {
    fn load(&self) -> Result<VariableStore, TradeBoundsError> {
        let conn = self.conn()?;

        let query = format!(
            "SELECT variable, maximum, minimum, returnmin, returnmax FROM {}",
            self.table
        );
        let mut stmt = conn.prepare(&query).map_err(query_error)?;
        let mut rows = stmt.query([]).map_err(query_error)?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let name: String = row.get(0).map_err(query_error)?;
            let variable: Variable = name.parse()?;

            let cell = |idx: usize, field: Field| -> Result<Decimal, TradeBoundsError> {
                let value = row.get_ref(idx).map_err(query_error)?;
                cell_decimal(variable, field, value)
            };
            records.push((
                variable,
                VariableRecord {
                    maximum: cell(1, Field::Maximum)?,
                    minimum: cell(2, Field::Minimum)?,
                    returnmin: cell(3, Field::ReturnMin)?,
                    returnmax: cell(4, Field::ReturnMax)?,
                },
            ));
        }

        VariableStore::from_records(records)
    }

    fn persist(&self, store: &VariableStore) -> Result<(), TradeBoundsError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;
        write_rows(&tx, &self.table, store)?;
        tx.commit().map_err(query_error)?;

        tracing::debug!(table = %self.table, "persisted store");
        Ok(())
    }

    /// Deletes every row and re-creates the five variables with defaults.
    fn reset(&self) -> Result<(), TradeBoundsError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        tx.execute(&format!("DELETE FROM {}", self.table), [])
            .map_err(query_error)?;
        write_rows(&tx, &self.table, &VariableStore::new())?;

        tx.commit().map_err(query_error)?;
        tracing::info!(table = %self.table, "store reset to defaults");
        Ok(())
    }
}

/// Replaces each variable's row. Delete-then-insert keeps one row per
/// variable even when the table has no key on `variable`.
fn write_rows(
    tx: &rusqlite::Transaction<'_>,
    table: &str,
    store: &VariableStore,
) -> Result<(), TradeBoundsError> {
    let delete = format!("DELETE FROM {table} WHERE variable = ?1");
    let insert = format!(
        "INSERT INTO {table} (variable, maximum, minimum, returnmin, returnmax)
         VALUES (?1, ?2, ?3, ?4, ?5)"
    );
    for (variable, r) in store.records() {
        tx.execute(&delete, params![variable.name()])
            .map_err(query_error)?;
        tx.execute(
            &insert,
            params![
                variable.name(),
                r.maximum.to_string(),
                r.minimum.to_string(),
                r.returnmin.to_string(),
                r.returnmax.to_string()
            ],
        )
        .map_err(query_error)?;
    }
    Ok(())
}

/// Accepts TEXT, INTEGER and REAL cells. REAL goes through its shortest
/// round-trip rendering so `17.7055` reads back as `17.7055`.
fn cell_decimal(
    variable: Variable,
    field: Field,
    value: ValueRef<'_>,
) -> Result<Decimal, TradeBoundsError> {
    let raw = match value {
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Integer(i) => return Ok(Decimal::from(i)),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Null | ValueRef::Blob(_) => {
            return Err(TradeBoundsError::Database {
                reason: format!(
                    "{variable}.{field} holds {:?}, not a decimal",
                    value.data_type()
                ),
            });
        }
    };
    Decimal::from_str(raw.trim()).map_err(|e| TradeBoundsError::Database {
        reason: format!("{variable}.{field} holds {raw:?}, not a decimal: {e}"),
    })
}

fn query_error(e: rusqlite::Error) -> TradeBoundsError {
    TradeBoundsError::DatabaseQuery {
        reason: e.to_string(),
    }
}
