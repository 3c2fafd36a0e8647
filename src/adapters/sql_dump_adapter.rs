//! SQL dump export adapter.

use crate::domain::config_validation::is_identifier;
use crate::domain::error::TradeBoundsError;
use crate::domain::store::VariableStore;
use crate::ports::export_port::{ExportFormat, ExportPort};

pub const DEFAULT_TABLE: &str = "ConsoleDataBase";

pub struct SqlDumpAdapter {
    table: String,
}

impl SqlDumpAdapter {
    pub fn new(table: &str) -> Result<Self, TradeBoundsError> {
        if !is_identifier(table) {
            return Err(TradeBoundsError::Export {
                reason: format!("invalid table name {table:?}"),
            });
        }
        Ok(Self {
            table: table.to_string(),
        })
    }

    pub fn dump(&self, store: &VariableStore) -> String {
        let t = &self.table;
        let mut lines = vec![
            format!("DROP TABLE IF EXISTS {t};"),
            String::new(),
            format!("CREATE TABLE {t} ("),
            "    variable VARCHAR(50) DEFAULT '0',".to_string(),
            "    maximum DECIMAL(20,8) DEFAULT 0,".to_string(),
            "    minimum DECIMAL(20,8) DEFAULT 0,".to_string(),
            "    returnmin DECIMAL(20,8) DEFAULT 0,".to_string(),
            "    returnmax DECIMAL(20,8) DEFAULT 0".to_string(),
            ");".to_string(),
            String::new(),
            "-- Insert data".to_string(),
        ];
        for (variable, r) in store.records() {
            lines.push(format!(
                "INSERT INTO {t} (variable, maximum, minimum, returnmin, returnmax) \
                 VALUES ('{variable}', {}, {}, {}, {});",
                r.maximum, r.minimum, r.returnmin, r.returnmax
            ));
        }
        lines.push(String::new());
        lines.push("-- End of export".to_string());

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl Default for SqlDumpAdapter {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl ExportPort for SqlDumpAdapter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Sql
    }

    fn render(&self, store: &VariableStore) -> Result<Vec<u8>, TradeBoundsError> {
        Ok(self.dump(store).into_bytes())
    }
}
