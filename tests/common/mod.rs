#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::Write;
use std::path::Path;
use tradebounds::domain::error::TradeBoundsError;
use tradebounds::domain::store::VariableStore;
use tradebounds::ports::store_port::StorePort;

/// In-memory store port with optional failure injection.
pub struct MockStorePort {
    pub store: RefCell<VariableStore>,
    pub persist_calls: Cell<usize>,
    pub reset_calls: Cell<usize>,
    pub load_error: Option<String>,
    pub persist_error: Option<String>,
}

impl MockStorePort {
    pub fn new() -> Self {
        Self::with_store(VariableStore::new())
    }

    pub fn with_store(store: VariableStore) -> Self {
        Self {
            store: RefCell::new(store),
            persist_calls: Cell::new(0),
            reset_calls: Cell::new(0),
            load_error: None,
            persist_error: None,
        }
    }

    pub fn failing_load(mut self, reason: &str) -> Self {
        self.load_error = Some(reason.to_string());
        self
    }

    pub fn failing_persist(mut self, reason: &str) -> Self {
        self.persist_error = Some(reason.to_string());
        self
    }

    pub fn snapshot(&self) -> VariableStore {
        self.store.borrow().clone()
    }
}

impl StorePort for MockStorePort {
    fn load(&self) -> Result<VariableStore, TradeBoundsError> {
        if let Some(reason) = &self.load_error {
            return Err(TradeBoundsError::Database {
                reason: reason.clone(),
            });
        }
        Ok(self.store.borrow().clone())
    }

    fn persist(&self, store: &VariableStore) -> Result<(), TradeBoundsError> {
        if let Some(reason) = &self.persist_error {
            return Err(TradeBoundsError::DatabaseQuery {
                reason: reason.clone(),
            });
        }
        self.persist_calls.set(self.persist_calls.get() + 1);
        *self.store.borrow_mut() = store.clone();
        Ok(())
    }

    fn reset(&self) -> Result<(), TradeBoundsError> {
        if let Some(reason) = &self.persist_error {
            return Err(TradeBoundsError::DatabaseQuery {
                reason: reason.clone(),
            });
        }
        self.reset_calls.set(self.reset_calls.get() + 1);
        self.store.borrow_mut().reset();
        Ok(())
    }
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// INI text pointing the SQLite store and exports into `dir`.
pub fn sqlite_ini(dir: &Path, trade: &str) -> String {
    format!(
        "[trade]\n{trade}\n\n[sqlite]\npath = {db}\ntable = ConsoleDataBase\n\n[export]\ndirectory = {dir}\nbasename = bounds\n",
        db = dir.join("bounds.db").display(),
        dir = dir.display(),
    )
}
