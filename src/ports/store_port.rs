//! Variable store persistence port trait.

use crate::domain::error::TradeBoundsError;
use crate::domain::store::VariableStore;

/// Backing storage for the variable store.
pub trait StorePort {
    fn load(&self) -> Result<VariableStore, TradeBoundsError>;

    /// Writes all five variables as one unit.
    fn persist(&self, store: &VariableStore) -> Result<(), TradeBoundsError>;

    /// Discards whatever is stored, including unreadable rows, and writes the defaults.
    fn reset(&self) -> Result<(), TradeBoundsError>;
}
