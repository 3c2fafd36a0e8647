//! Recompute orchestrator.
//!
//! Derives `returnmin`/`returnmax` for every variable from the configured
//! bounds of the others. Worst case and best case use a fixed pairing of
//! extremes per target:
//!
//! | target       | returnmin                        | returnmax                        |
//! |--------------|----------------------------------|----------------------------------|
//! | tradeprofit  | amount=min, sell=min, buy=max    | amount=max, sell=max, buy=min    |
//! | profitfactor | sell=min, buy=max                | sell=max, buy=min                |
//! | tradeamount  | profit=min, sell=min, buy=max    | profit=max, sell=max, buy=min    |
//! | sellvariable | amount=max, profit=min, buy=min  | amount=min, profit=max, buy=max  |
//! | buyvariable  | amount=max, profit=min, sell=min | amount=min, profit=max, sell=max |
//!
//! A pass either writes all five derived intervals or none of them.

use crate::domain::error::TradeBoundsError;
use crate::domain::store::{DerivedBounds, VariableStore};
use crate::domain::trade_function::TradeFunction;
use crate::domain::variable::{Field, Variable};
use rust_decimal::Decimal;

/// Evaluation order of one pass.
pub const RECOMPUTE_ORDER: [Variable; 5] = [
    Variable::TradeProfit,
    Variable::ProfitFactor,
    Variable::TradeAmount,
    Variable::SellVariable,
    Variable::BuyVariable,
];

#[derive(Debug, Clone, Copy)]
struct Interval {
    min: Decimal,
    max: Decimal,
}

impl Interval {
    fn of(store: &VariableStore, variable: Variable) -> Self {
        Interval {
            min: store.get(variable, Field::Minimum),
            max: store.get(variable, Field::Maximum),
        }
    }
}

/// Configured intervals read once at the start of a pass.
#[derive(Debug, Clone, Copy)]
struct Inputs {
    profit: Interval,
    amount: Interval,
    buy: Interval,
    sell: Interval,
}

impl Inputs {
    fn read(store: &VariableStore) -> Self {
        Inputs {
            profit: Interval::of(store, Variable::TradeProfit),
            amount: Interval::of(store, Variable::TradeAmount),
            buy: Interval::of(store, Variable::BuyVariable),
            sell: Interval::of(store, Variable::SellVariable),
        }
    }
}

/// Result of one pass, in [`RECOMPUTE_ORDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecomputePass {
    pub results: Vec<(Variable, DerivedBounds)>,
}

impl RecomputePass {
    pub fn bounds(&self, variable: Variable) -> Option<DerivedBounds> {
        self.results
            .iter()
            .find(|(v, _)| *v == variable)
            .map(|(_, b)| *b)
    }
}

/// Derived bounds for one target.
pub fn derive(
    target: Variable,
    store: &VariableStore,
    engine: &TradeFunction,
) -> Result<DerivedBounds, TradeBoundsError> {
    derive_from(target, &Inputs::read(store), engine)
}

fn derive_from(
    target: Variable,
    i: &Inputs,
    engine: &TradeFunction,
) -> Result<DerivedBounds, TradeBoundsError> {
    let (min, max) = match target {
        Variable::TradeProfit => (
            engine.return_profit(i.amount.min, i.sell.min, i.buy.max)?,
            engine.return_profit(i.amount.max, i.sell.max, i.buy.min)?,
        ),
        Variable::ProfitFactor => (
            engine.return_profit_factor(i.sell.min, i.buy.max)?,
            engine.return_profit_factor(i.sell.max, i.buy.min)?,
        ),
        Variable::TradeAmount => (
            engine.return_trade_amount(i.profit.min, i.sell.min, i.buy.max)?,
            engine.return_trade_amount(i.profit.max, i.sell.max, i.buy.min)?,
        ),
        Variable::SellVariable => (
            engine.return_sell_variable(i.amount.max, i.profit.min, i.buy.min)?,
            engine.return_sell_variable(i.amount.min, i.profit.max, i.buy.max)?,
        ),
        Variable::BuyVariable => (
            engine.return_buy_variable(i.amount.max, i.profit.min, i.sell.min)?,
            engine.return_buy_variable(i.amount.min, i.profit.max, i.sell.max)?,
        ),
    };
    Ok(DerivedBounds { min, max })
}

/// Computes every derived interval without touching the store.
pub fn derive_all(
    store: &VariableStore,
    engine: &TradeFunction,
) -> Result<RecomputePass, TradeBoundsError> {
    let inputs = Inputs::read(store);
    let mut results = Vec::with_capacity(RECOMPUTE_ORDER.len());
    for target in RECOMPUTE_ORDER {
        let bounds = derive_from(target, &inputs, engine).inspect_err(|e| {
            tracing::error!(variable = %target, error = %e, "recompute pass aborted");
        })?;
        tracing::debug!(
            variable = %target,
            returnmin = %bounds.min,
            returnmax = %bounds.max,
            "derived bounds"
        );
        if bounds.min > bounds.max {
            tracing::warn!(
                variable = %target,
                returnmin = %bounds.min,
                returnmax = %bounds.max,
                "derived interval is inverted"
            );
        }
        results.push((target, bounds));
    }
    Ok(RecomputePass { results })
}

/// Runs one pass and writes the results. On error the store is unchanged.
pub fn recompute_all(
    store: &mut VariableStore,
    engine: &TradeFunction,
) -> Result<RecomputePass, TradeBoundsError> {
    let pass = derive_all(store, engine)?;
    for (variable, bounds) in &pass.results {
        store.set_derived(*variable, *bounds);
    }
    tracing::info!(
        basis = ?engine.basis(),
        variables = pass.results.len(),
        "recompute pass applied"
    );
    Ok(pass)
}
