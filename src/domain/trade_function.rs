//! Trade formula engine.
//!
//! One underlying relation between trade amount, buy rate, sell rate and
//! profit, solved for each of its terms. Every function here is pure; the
//! engine only carries the cost constants and the rate basis.
//!
//! With effective rates `B' = buy * bm` and `S' = sell * sm` and margin
//! `M = S' - B'`:
//!
//! - profit        = amount * M
//! - profit factor = M / B'
//! - trade amount  = profit / M
//! - sell rate     = (profit / amount + B') / sm
//! - buy rate      = (S' - profit / amount) / bm
//!
//! Leg multipliers depend on [`RateBasis`]:
//!
//! | basis     | bm                          | sm                          |
//! |-----------|-----------------------------|-----------------------------|
//! | Execution | 1 + rate_ka                 | 1 - rate_pn                 |
//! | Market    | (1 + spread)(1 + rate_ka)   | (1 - spread)(1 - rate_pn)   |

use crate::domain::error::TradeBoundsError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept after every division.
pub const DIVISION_SCALE: u32 = 10;

/// Which rates the caller supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateBasis {
    /// Rates are the executed rates; only the leg charges apply.
    #[default]
    Execution,
    /// Rates are market mid rates; the spread widens both legs.
    Market,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeFunction {
    spread: Decimal,
    rate_ka: Decimal,
    rate_pn: Decimal,
    basis: RateBasis,
}

impl TradeFunction {
    pub fn new(spread: Decimal, rate_ka: Decimal, rate_pn: Decimal) -> Self {
        TradeFunction {
            spread,
            rate_ka,
            rate_pn,
            basis: RateBasis::default(),
        }
    }

    pub fn with_basis(mut self, basis: RateBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn spread(&self) -> Decimal {
        self.spread
    }

    pub fn rate_ka(&self) -> Decimal {
        self.rate_ka
    }

    pub fn rate_pn(&self) -> Decimal {
        self.rate_pn
    }

    pub fn basis(&self) -> RateBasis {
        self.basis
    }

    pub fn set_basis(&mut self, basis: RateBasis) {
        self.basis = basis;
    }

    pub fn based_on_market_rate(&self) -> bool {
        self.basis == RateBasis::Market
    }

    pub fn set_based_on_market_rate(&mut self, based_on_market_rate: bool) {
        self.basis = if based_on_market_rate {
            RateBasis::Market
        } else {
            RateBasis::Execution
        };
    }

    /// Profit of trading `trade_amount` bought at `buy_rate` and sold at `sell_rate`.
    pub fn return_profit(
        &self,
        trade_amount: Decimal,
        sell_rate: Decimal,
        buy_rate: Decimal,
    ) -> Result<Decimal, TradeBoundsError> {
        const OP: &str = "return_profit";
        let margin = self.margin(OP, sell_rate, buy_rate)?;
        multiply(OP, trade_amount, margin)
    }

    /// Profit per unit of quote currency spent on the buy leg.
    pub fn return_profit_factor(
        &self,
        sell_rate: Decimal,
        buy_rate: Decimal,
    ) -> Result<Decimal, TradeBoundsError> {
        const OP: &str = "return_profit_factor";
        let margin = self.margin(OP, sell_rate, buy_rate)?;
        let effective_buy = self.effective_buy(OP, buy_rate)?;
        divide(OP, margin, effective_buy)
    }

    /// Trade amount that yields `profit` at the given rates.
    pub fn return_trade_amount(
        &self,
        profit: Decimal,
        sell_rate: Decimal,
        buy_rate: Decimal,
    ) -> Result<Decimal, TradeBoundsError> {
        const OP: &str = "return_trade_amount";
        let margin = self.margin(OP, sell_rate, buy_rate)?;
        divide(OP, profit, margin)
    }

    /// Sell rate that yields `profit` on `trade_amount` bought at `buy_rate`.
    pub fn return_sell_variable(
        &self,
        trade_amount: Decimal,
        profit: Decimal,
        buy_rate: Decimal,
    ) -> Result<Decimal, TradeBoundsError> {
        const OP: &str = "return_sell_variable";
        let per_unit = divide(OP, profit, trade_amount)?;
        let effective_buy = self.effective_buy(OP, buy_rate)?;
        let effective_sell = add(OP, per_unit, effective_buy)?;
        divide(OP, effective_sell, self.sell_multiplier(OP)?)
    }

    /// Buy rate that yields `profit` on `trade_amount` sold at `sell_rate`.
    pub fn return_buy_variable(
        &self,
        trade_amount: Decimal,
        profit: Decimal,
        sell_rate: Decimal,
    ) -> Result<Decimal, TradeBoundsError> {
        const OP: &str = "return_buy_variable";
        let per_unit = divide(OP, profit, trade_amount)?;
        let effective_sell = self.effective_sell(OP, sell_rate)?;
        let effective_buy = subtract(OP, effective_sell, per_unit)?;
        divide(OP, effective_buy, self.buy_multiplier(OP)?)
    }

    fn buy_multiplier(&self, op: &'static str) -> Result<Decimal, TradeBoundsError> {
        let charge = add(op, Decimal::ONE, self.rate_ka)?;
        match self.basis {
            RateBasis::Execution => Ok(charge),
            RateBasis::Market => multiply(op, add(op, Decimal::ONE, self.spread)?, charge),
        }
    }

    fn sell_multiplier(&self, op: &'static str) -> Result<Decimal, TradeBoundsError> {
        let charge = subtract(op, Decimal::ONE, self.rate_pn)?;
        match self.basis {
            RateBasis::Execution => Ok(charge),
            RateBasis::Market => multiply(op, subtract(op, Decimal::ONE, self.spread)?, charge),
        }
    }

    fn effective_buy(&self, op: &'static str, buy_rate: Decimal) -> Result<Decimal, TradeBoundsError> {
        ensure_positive_rate(op, "buy", buy_rate)?;
        multiply(op, buy_rate, self.buy_multiplier(op)?)
    }

    fn effective_sell(
        &self,
        op: &'static str,
        sell_rate: Decimal,
    ) -> Result<Decimal, TradeBoundsError> {
        ensure_positive_rate(op, "sell", sell_rate)?;
        multiply(op, sell_rate, self.sell_multiplier(op)?)
    }

    fn margin(
        &self,
        op: &'static str,
        sell_rate: Decimal,
        buy_rate: Decimal,
    ) -> Result<Decimal, TradeBoundsError> {
        let effective_sell = self.effective_sell(op, sell_rate)?;
        let effective_buy = self.effective_buy(op, buy_rate)?;
        subtract(op, effective_sell, effective_buy)
    }
}

impl Default for TradeFunction {
    fn default() -> Self {
        TradeFunction::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    }
}

fn ensure_positive_rate(
    op: &'static str,
    leg: &str,
    rate: Decimal,
) -> Result<(), TradeBoundsError> {
    if rate <= Decimal::ZERO {
        return Err(TradeBoundsError::calculation(
            op,
            format!("{leg} rate must be positive, got {rate}"),
        ));
    }
    Ok(())
}

fn multiply(op: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, TradeBoundsError> {
    a.checked_mul(b)
        .ok_or_else(|| TradeBoundsError::calculation(op, format!("overflow computing {a} * {b}")))
}

fn add(op: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, TradeBoundsError> {
    a.checked_add(b)
        .ok_or_else(|| TradeBoundsError::calculation(op, format!("overflow computing {a} + {b}")))
}

fn subtract(op: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, TradeBoundsError> {
    a.checked_sub(b)
        .ok_or_else(|| TradeBoundsError::calculation(op, format!("overflow computing {a} - {b}")))
}

fn divide(
    op: &'static str,
    numerator: Decimal,
    denominator: Decimal,
) -> Result<Decimal, TradeBoundsError> {
    if denominator.is_zero() {
        return Err(TradeBoundsError::calculation(
            op,
            format!("division by zero ({numerator} / 0)"),
        ));
    }
    numerator
        .checked_div(denominator)
        .map(|q| q.round_dp_with_strategy(DIVISION_SCALE, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| {
            TradeBoundsError::calculation(
                op,
                format!("overflow computing {numerator} / {denominator}"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn plain() -> TradeFunction {
        TradeFunction::default()
    }

    fn charged() -> TradeFunction {
        TradeFunction::new(dec!(0.002), dec!(0.01), dec!(0.005))
    }

    #[test]
    fn default_basis_is_execution() {
        let f = charged();
        assert_eq!(f.basis(), RateBasis::Execution);
        assert!(!f.based_on_market_rate());
    }

    #[test]
    fn market_rate_flag_toggles_basis() {
        let mut f = charged();
        f.set_based_on_market_rate(true);
        assert_eq!(f.basis(), RateBasis::Market);
        f.set_based_on_market_rate(false);
        assert_eq!(f.basis(), RateBasis::Execution);
    }

    #[test]
    fn profit_on_default_values() {
        let profit = plain()
            .return_profit(dec!(10000), dec!(17.6967), dec!(17.7055))
            .unwrap();
        assert_eq!(profit, dec!(-88));
    }

    #[test]
    fn profit_factor_on_default_values() {
        let factor = plain()
            .return_profit_factor(dec!(17.6967), dec!(17.7055))
            .unwrap();
        assert_eq!(factor, dec!(-0.0004970207));
    }

    #[test]
    fn profit_factor_rounds_to_division_scale() {
        let factor = plain().return_profit_factor(dec!(2), dec!(3)).unwrap();
        assert_eq!(factor, dec!(-0.3333333333));
        assert_eq!(factor.scale(), DIVISION_SCALE);
    }

    #[test]
    fn buy_charge_raises_effective_buy() {
        let f = TradeFunction::new(dec!(0), dec!(0.01), dec!(0));
        let profit = f
            .return_profit(dec!(10000), dec!(17.6967), dec!(17.7055))
            .unwrap();
        assert_eq!(profit, dec!(-1858.55));
    }

    #[test]
    fn sell_charge_lowers_effective_sell() {
        let f = TradeFunction::new(dec!(0), dec!(0), dec!(0.01));
        let profit = f.return_profit(dec!(100), dec!(20), dec!(10)).unwrap();
        assert_eq!(profit, dec!(980));
    }

    #[test]
    fn spread_only_applies_on_market_basis() {
        let execution = TradeFunction::new(dec!(0.01), dec!(0), dec!(0));
        let market = execution.clone().with_basis(RateBasis::Market);

        let p_exec = execution.return_profit(dec!(100), dec!(20), dec!(10)).unwrap();
        let p_market = market.return_profit(dec!(100), dec!(20), dec!(10)).unwrap();

        assert_eq!(p_exec, dec!(1000));
        // 100 * (20 * 0.99 - 10 * 1.01)
        assert_eq!(p_market, dec!(970));
    }

    #[test]
    fn trade_amount_inverts_profit() {
        let f = charged();
        let profit = f.return_profit(dec!(2500), dec!(18.10), dec!(17.90)).unwrap();
        let amount = f.return_trade_amount(profit, dec!(18.10), dec!(17.90)).unwrap();
        assert_eq!(amount, dec!(2500));
    }

    #[test]
    fn sell_variable_inverts_profit() {
        let f = charged().with_basis(RateBasis::Market);
        let profit = f.return_profit(dec!(2500), dec!(18.10), dec!(17.90)).unwrap();
        let sell = f.return_sell_variable(dec!(2500), profit, dec!(17.90)).unwrap();
        assert!((sell - dec!(18.10)).abs() <= dec!(0.00000001), "got {sell}");
    }

    #[test]
    fn buy_variable_inverts_profit() {
        let f = charged();
        let profit = f.return_profit(dec!(2500), dec!(18.10), dec!(17.90)).unwrap();
        let buy = f.return_buy_variable(dec!(2500), profit, dec!(18.10)).unwrap();
        assert!((buy - dec!(17.90)).abs() <= dec!(0.00000001), "got {buy}");
    }

    #[test]
    fn zero_buy_rate_is_a_calculation_error() {
        let err = plain()
            .return_profit(dec!(10000), dec!(17.6967), dec!(0))
            .unwrap_err();
        assert!(matches!(
            err,
            TradeBoundsError::Calculation {
                operation: "return_profit",
                ..
            }
        ));
    }

    #[test]
    fn negative_sell_rate_is_a_calculation_error() {
        let err = plain()
            .return_profit_factor(dec!(-1), dec!(17.7055))
            .unwrap_err();
        assert!(matches!(err, TradeBoundsError::Calculation { .. }));
    }

    #[test]
    fn zero_margin_trade_amount_fails() {
        let err = plain()
            .return_trade_amount(dec!(-88), dec!(17.7), dec!(17.7))
            .unwrap_err();
        assert!(err.to_string().contains("division by zero"));
    }

    #[test]
    fn zero_amount_rate_inverses_fail() {
        let f = plain();
        assert!(f.return_sell_variable(dec!(0), dec!(-88), dec!(17.7055)).is_err());
        assert!(f.return_buy_variable(dec!(0), dec!(-88), dec!(17.6967)).is_err());
    }

    #[test]
    fn full_sell_charge_makes_sell_inverse_fail() {
        let f = TradeFunction::new(dec!(0), dec!(0), dec!(1));
        let err = f
            .return_sell_variable(dec!(100), dec!(5), dec!(10))
            .unwrap_err();
        assert!(matches!(
            err,
            TradeBoundsError::Calculation {
                operation: "return_sell_variable",
                ..
            }
        ));
    }

    #[test]
    fn overflow_is_reported_not_panicked() {
        let err = plain()
            .return_profit(Decimal::MAX, dec!(20), dec!(10))
            .unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }
}
