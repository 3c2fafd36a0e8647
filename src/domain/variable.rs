//! The five tracked quantities and the four columns kept for each.

use crate::domain::error::TradeBoundsError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    TradeProfit,
    TradeAmount,
    BuyVariable,
    SellVariable,
    ProfitFactor,
}

impl Variable {
    /// Canonical storage order.
    pub const ALL: [Variable; 5] = [
        Variable::TradeProfit,
        Variable::TradeAmount,
        Variable::BuyVariable,
        Variable::SellVariable,
        Variable::ProfitFactor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variable::TradeProfit => "tradeprofit",
            Variable::TradeAmount => "tradeamount",
            Variable::BuyVariable => "buyvariable",
            Variable::SellVariable => "sellvariable",
            Variable::ProfitFactor => "profitfactor",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = TradeBoundsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Variable::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TradeBoundsError::UnknownVariable {
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Maximum,
    Minimum,
    ReturnMin,
    ReturnMax,
}

impl Field {
    /// Column order used by every export format.
    pub const ALL: [Field; 4] = [
        Field::Maximum,
        Field::Minimum,
        Field::ReturnMin,
        Field::ReturnMax,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Field::Maximum => "maximum",
            Field::Minimum => "minimum",
            Field::ReturnMin => "returnmin",
            Field::ReturnMax => "returnmax",
        }
    }

    /// Derived fields are owned by the recompute pass.
    pub fn is_derived(self) -> bool {
        matches!(self, Field::ReturnMin | Field::ReturnMax)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Field {
    type Err = TradeBoundsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Field::ALL
            .into_iter()
            .find(|f| f.column().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TradeBoundsError::UnknownField {
                name: s.to_string(),
            })
    }
}
