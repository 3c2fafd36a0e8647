//! End-to-end tests of the store pipeline.
//!
//! Tests cover:
//! - Recompute through a store port, golden values on the default store
//! - All-or-nothing passes when a calculation or persist fails
//! - Bound updates and derived-field protection
//! - SQLite persistence, reset and CSV export/import parity

mod common;

use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tradebounds::cli;
use tradebounds::domain::error::TradeBoundsError;
use tradebounds::domain::store::VariableStore;
use tradebounds::domain::trade_function::{RateBasis, TradeFunction};
use tradebounds::domain::variable::{Field, Variable};
use tradebounds::ports::store_port::StorePort;

fn derived(store: &VariableStore, variable: Variable) -> (Decimal, Decimal) {
    (
        store.get(variable, Field::ReturnMin),
        store.get(variable, Field::ReturnMax),
    )
}

mod recompute_pipeline {
    use super::*;

    #[test]
    fn default_store_recompute_through_port() {
        let port = MockStorePort::new();
        let (store, pass) = cli::recompute(&port, &TradeFunction::default()).unwrap();

        assert_eq!(pass.results.len(), 5);
        assert_eq!(derived(&store, Variable::TradeProfit), (dec!(-88), dec!(-88)));
        assert_eq!(
            derived(&store, Variable::ProfitFactor),
            (dec!(-0.0004970207), dec!(-0.0004970207))
        );
        assert_eq!(derived(&store, Variable::TradeAmount), (dec!(10000), dec!(10000)));
        assert_eq!(derived(&store, Variable::SellVariable), (dec!(17.6967), dec!(17.6967)));
        assert_eq!(derived(&store, Variable::BuyVariable), (dec!(17.7055), dec!(17.7055)));

        assert_eq!(port.persist_calls.get(), 1);
        assert_eq!(port.snapshot(), store);
    }

    #[test]
    fn calculation_failure_persists_nothing() {
        let mut seeded = VariableStore::new();
        seeded.set(Variable::SellVariable, Field::Minimum, dec!(-1));
        let port = MockStorePort::with_store(seeded.clone());

        let err = cli::recompute(&port, &TradeFunction::default()).unwrap_err();
        assert!(matches!(err, TradeBoundsError::Calculation { .. }));
        assert_eq!(port.persist_calls.get(), 0);
        assert_eq!(port.snapshot(), seeded);
    }

    #[test]
    fn persist_failure_surfaces_as_persistence_error() {
        let port = MockStorePort::new().failing_persist("disk full");
        let err = cli::recompute(&port, &TradeFunction::default()).unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(port.snapshot(), VariableStore::new());
    }

    #[test]
    fn load_failure_stops_before_calculation() {
        let port = MockStorePort::new().failing_load("locked");
        let err = cli::recompute(&port, &TradeFunction::default()).unwrap_err();
        assert!(matches!(err, TradeBoundsError::Database { .. }));
        assert_eq!(port.persist_calls.get(), 0);
    }

    #[test]
    fn market_basis_widens_the_loss() {
        let engine = TradeFunction::new(dec!(0.0005), dec!(0.0001), dec!(0.0001));
        let execution = MockStorePort::new();
        let market = MockStorePort::new();

        let (exec_store, _) = cli::recompute(&execution, &engine).unwrap();
        let (market_store, _) =
            cli::recompute(&market, &engine.clone().with_basis(RateBasis::Market)).unwrap();

        let (exec_profit, _) = derived(&exec_store, Variable::TradeProfit);
        let (market_profit, _) = derived(&market_store, Variable::TradeProfit);
        assert!(market_profit < exec_profit);
        assert!(exec_profit < dec!(-88));
    }

    #[test]
    fn widened_bounds_give_ordered_intervals() {
        let port = MockStorePort::new();
        cli::set_bound(&port, "tradeamount", "minimum", "5000").unwrap();
        cli::set_bound(&port, "tradeamount", "maximum", "20000").unwrap();
        cli::set_bound(&port, "sellvariable", "maximum", "17.9").unwrap();
        cli::set_bound(&port, "buyvariable", "minimum", "17.5").unwrap();

        let (store, _) = cli::recompute(&port, &TradeFunction::default()).unwrap();
        let (lo, hi) = derived(&store, Variable::TradeProfit);
        assert_eq!(lo, dec!(5000) * (dec!(17.6967) - dec!(17.7055)));
        assert_eq!(hi, dec!(20000) * (dec!(17.9) - dec!(17.5)));
        assert!(lo < hi);
    }
}

mod bound_updates {
    use super::*;

    #[test]
    fn set_bound_persists_parsed_value() {
        let port = MockStorePort::new();
        let value = cli::set_bound(&port, "TradeProfit", "Maximum", " -12.50 ").unwrap();

        assert_eq!(value, dec!(-12.50));
        assert_eq!(
            port.snapshot().get(Variable::TradeProfit, Field::Maximum),
            dec!(-12.5)
        );
        assert_eq!(
            cli::get_value(&port, "tradeprofit", "maximum").unwrap(),
            dec!(-12.5)
        );
    }

    #[test]
    fn derived_fields_are_read_only() {
        let port = MockStorePort::new();
        let err = cli::set_bound(&port, "tradeprofit", "returnmin", "1").unwrap_err();
        assert!(matches!(err, TradeBoundsError::DerivedField { .. }));
        assert_eq!(port.persist_calls.get(), 0);
    }

    #[test]
    fn unknown_names_are_not_found() {
        let port = MockStorePort::new();
        assert!(cli::get_value(&port, "spotrate", "minimum")
            .unwrap_err()
            .is_not_found());
        assert!(cli::get_value(&port, "tradeprofit", "median")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn non_decimal_value_is_rejected() {
        let port = MockStorePort::new();
        let err = cli::set_bound(&port, "tradeamount", "minimum", "1e3x").unwrap_err();
        assert!(matches!(err, TradeBoundsError::InvalidValue { ref value, .. } if value == "1e3x"));
        assert_eq!(port.persist_calls.get(), 0);
    }

    #[test]
    fn reset_store_does_not_read_first() {
        let port = MockStorePort::new().failing_load("garbled row");
        port.store
            .borrow_mut()
            .set(Variable::TradeAmount, Field::Maximum, dec!(1));

        cli::reset_store(&port).unwrap();
        assert_eq!(port.reset_calls.get(), 1);
        assert_eq!(port.snapshot(), VariableStore::new());
    }
}

#[cfg(feature = "sqlite")]
mod sqlite_pipeline {
    use super::*;
    use tempfile::TempDir;
    use tradebounds::adapters::csv_adapter::CsvAdapter;
    use tradebounds::adapters::file_config_adapter::FileConfigAdapter;
    use tradebounds::adapters::sqlite_adapter::SqliteAdapter;
    use tradebounds::ports::export_port::ExportFormat;

    fn open(dir: &TempDir) -> SqliteAdapter {
        let config = FileConfigAdapter::from_string(&sqlite_ini(dir.path(), "")).unwrap();
        cli::open_sqlite(&config).unwrap()
    }

    #[test]
    fn init_seeds_defaults_once() {
        let dir = TempDir::new().unwrap();
        let adapter = open(&dir);
        assert_eq!(adapter.row_count().unwrap(), 5);
        cli::set_bound(&adapter, "tradeamount", "maximum", "25000").unwrap();

        let reopened = open(&dir);
        assert_eq!(
            reopened.load().unwrap().get(Variable::TradeAmount, Field::Maximum),
            dec!(25000)
        );
    }

    #[test]
    fn recompute_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let (store, _) = cli::recompute(&open(&dir), &TradeFunction::default()).unwrap();

        let loaded = open(&dir).load().unwrap();
        assert_eq!(loaded, store);
        assert_eq!(
            loaded.get(Variable::ProfitFactor, Field::ReturnMin),
            dec!(-0.0004970207)
        );
    }

    #[test]
    fn reset_clears_derived_fields() {
        let dir = TempDir::new().unwrap();
        let adapter = open(&dir);
        cli::set_bound(&adapter, "buyvariable", "minimum", "17.1").unwrap();
        cli::recompute(&adapter, &TradeFunction::default()).unwrap();

        adapter.reset().unwrap();
        let store = adapter.load().unwrap();
        assert_eq!(store, VariableStore::new());
        for variable in Variable::ALL {
            assert_eq!(derived(&store, variable), (Decimal::ZERO, Decimal::ZERO));
        }
    }

    #[test]
    fn csv_export_then_import_restores_store() {
        let dir = TempDir::new().unwrap();
        let source = open(&dir);
        cli::set_bound(&source, "tradeamount", "minimum", "7500.25").unwrap();
        let (expected, _) = cli::recompute(&source, &TradeFunction::default()).unwrap();

        let csv_path = dir.path().join("bounds.csv");
        let exporter = CsvAdapter::new(csv_path.clone());
        let written = cli::export_store(&source, &exporter, &csv_path).unwrap();
        assert!(written > 0);

        let target = SqliteAdapter::in_memory().unwrap();
        target.initialize_schema().unwrap();
        target.seed_defaults_if_empty().unwrap();
        let imported = cli::import_csv(&target, &csv_path).unwrap();

        assert_eq!(imported, expected);
        assert_eq!(target.load().unwrap(), expected);
        assert_eq!(
            target.load().unwrap().get(Variable::TradeAmount, Field::Minimum).to_string(),
            "7500.25"
        );
    }

    #[test]
    fn sql_export_goes_to_configured_directory() {
        let dir = TempDir::new().unwrap();
        let config = FileConfigAdapter::from_string(&sqlite_ini(dir.path(), "")).unwrap();
        let adapter = cli::open_sqlite(&config).unwrap();

        let path = cli::resolve_export_path(&config, ExportFormat::Sql, None);
        assert_eq!(path, dir.path().join("bounds.sql"));

        let exporter = cli::exporter_for(&config, ExportFormat::Sql, &path).unwrap();
        cli::export_store(&adapter, exporter.as_ref(), &path).unwrap();

        let sql = std::fs::read_to_string(&path).unwrap();
        assert!(sql.starts_with("DROP TABLE IF EXISTS ConsoleDataBase;"));
        assert_eq!(sql.matches("INSERT INTO").count(), 5);
    }

    #[test]
    fn import_of_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let adapter = open(&dir);
        let err = cli::import_csv(&adapter, &dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, TradeBoundsError::Io(_)));
        assert_eq!(adapter.load().unwrap(), VariableStore::new());
    }
}
