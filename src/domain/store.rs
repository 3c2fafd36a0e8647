//! In-memory variable store.
//!
//! Exactly one record per [`Variable`], kept in a fixed array so a store can
//! never be missing an entry. Persistence lives behind
//! [`StorePort`](crate::ports::store_port::StorePort).

use crate::domain::error::TradeBoundsError;
use crate::domain::variable::{Field, Variable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableRecord {
    pub maximum: Decimal,
    pub minimum: Decimal,
    pub returnmin: Decimal,
    pub returnmax: Decimal,
}

impl VariableRecord {
    pub fn with_bounds(minimum: Decimal, maximum: Decimal) -> Self {
        VariableRecord {
            maximum,
            minimum,
            returnmin: Decimal::ZERO,
            returnmax: Decimal::ZERO,
        }
    }

    pub fn field(&self, field: Field) -> Decimal {
        match field {
            Field::Maximum => self.maximum,
            Field::Minimum => self.minimum,
            Field::ReturnMin => self.returnmin,
            Field::ReturnMax => self.returnmax,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut Decimal {
        match field {
            Field::Maximum => &mut self.maximum,
            Field::Minimum => &mut self.minimum,
            Field::ReturnMin => &mut self.returnmin,
            Field::ReturnMax => &mut self.returnmax,
        }
    }
}

/// Output range produced for one variable by a recompute pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedBounds {
    pub min: Decimal,
    pub max: Decimal,
}

/// Documented `(minimum, maximum)` defaults.
pub fn default_bounds(variable: Variable) -> (Decimal, Decimal) {
    match variable {
        Variable::TradeProfit => (dec!(-88.000000000), dec!(-88.000000000)),
        Variable::TradeAmount => (dec!(10000), dec!(10000)),
        Variable::BuyVariable => (dec!(17.7055), dec!(17.7055)),
        Variable::SellVariable => (dec!(17.6967), dec!(17.6967)),
        Variable::ProfitFactor => (dec!(-0.000497021), dec!(-0.000497021)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableStore {
    records: [VariableRecord; 5],
}

impl VariableStore {
    /// A store holding the documented defaults.
    pub fn new() -> Self {
        VariableStore {
            records: Variable::ALL.map(|v| {
                let (min, max) = default_bounds(v);
                VariableRecord::with_bounds(min, max)
            }),
        }
    }

    /// Builds a store from persisted rows. Every variable must appear exactly once.
    pub fn from_records<I>(rows: I) -> Result<Self, TradeBoundsError>
    where
        I: IntoIterator<Item = (Variable, VariableRecord)>,
    {
        let mut slots: [Option<VariableRecord>; 5] = [None; 5];
        for (variable, record) in rows {
            let slot = &mut slots[variable.index()];
            if slot.is_some() {
                return Err(TradeBoundsError::DuplicateVariable {
                    variable: variable.to_string(),
                });
            }
            *slot = Some(record);
        }

        let mut records = [VariableRecord::with_bounds(Decimal::ZERO, Decimal::ZERO); 5];
        for variable in Variable::ALL {
            records[variable.index()] =
                slots[variable.index()].ok_or_else(|| TradeBoundsError::MissingVariable {
                    variable: variable.to_string(),
                })?;
        }
        Ok(VariableStore { records })
    }

    pub fn get(&self, variable: Variable, field: Field) -> Decimal {
        self.records[variable.index()].field(field)
    }

    pub fn set(&mut self, variable: Variable, field: Field, value: Decimal) {
        *self.records[variable.index()].field_mut(field) = value;
    }

    pub fn record(&self, variable: Variable) -> &VariableRecord {
        &self.records[variable.index()]
    }

    /// Records in canonical storage order.
    pub fn records(&self) -> impl Iterator<Item = (Variable, &VariableRecord)> {
        Variable::ALL
            .into_iter()
            .map(move |v| (v, &self.records[v.index()]))
    }

    /// String-keyed read.
    pub fn lookup(&self, variable: &str, field: &str) -> Result<Decimal, TradeBoundsError> {
        let variable: Variable = variable.parse()?;
        let field: Field = field.parse()?;
        Ok(self.get(variable, field))
    }

    /// String-keyed write of a single field.
    pub fn assign(
        &mut self,
        variable: &str,
        field: &str,
        value: Decimal,
    ) -> Result<(), TradeBoundsError> {
        let variable: Variable = variable.parse()?;
        let field: Field = field.parse()?;
        self.set(variable, field, value);
        Ok(())
    }

    /// Changes one configured bound. Derived fields are rejected.
    pub fn update_bound(
        &mut self,
        variable: Variable,
        field: Field,
        value: Decimal,
    ) -> Result<(), TradeBoundsError> {
        if field.is_derived() {
            return Err(TradeBoundsError::DerivedField {
                field: field.to_string(),
            });
        }
        self.set(variable, field, value);
        Ok(())
    }

    pub fn set_derived(&mut self, variable: Variable, bounds: DerivedBounds) {
        let record = &mut self.records[variable.index()];
        record.returnmin = bounds.min;
        record.returnmax = bounds.max;
    }

    pub fn reset(&mut self) {
        *self = VariableStore::new();
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        VariableStore::new()
    }
}
