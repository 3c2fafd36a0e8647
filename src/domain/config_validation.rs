//! Configuration validation.
//!
//! Validates all config fields before the store is opened.

use crate::domain::error::TradeBoundsError;
use crate::ports::config_port::ConfigPort;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const TRADE_CONSTANT_KEYS: [&str; 3] = ["spread", "rate_ka", "rate_pn"];

/// Upper bound on `[sqlite] pool_size`.
pub const MAX_POOL_SIZE: u32 = 64;

pub fn validate_trade_config(config: &dyn ConfigPort) -> Result<(), TradeBoundsError> {
    for key in TRADE_CONSTANT_KEYS {
        validate_unit_fraction(config, key)?;
    }
    validate_bool(config, "trade", "based_on_market_rate")?;
    Ok(())
}

pub fn validate_store_config(config: &dyn ConfigPort) -> Result<(), TradeBoundsError> {
    validate_pool_size(config)?;
    validate_table_name(config)?;
    validate_export_basename(config)?;
    Ok(())
}

/// Reads a `[trade]` constant, defaulting to zero when absent.
pub fn trade_constant(config: &dyn ConfigPort, key: &str) -> Result<Decimal, TradeBoundsError> {
    match config.get_string("trade", key) {
        None => Ok(Decimal::ZERO),
        Some(raw) => Decimal::from_str(raw.trim()).map_err(|e| TradeBoundsError::ConfigInvalid {
            section: "trade".to_string(),
            key: key.to_string(),
            reason: format!("{raw:?} is not a decimal: {e}"),
        }),
    }
}

fn validate_unit_fraction(config: &dyn ConfigPort, key: &str) -> Result<(), TradeBoundsError> {
    let value = trade_constant(config, key)?;
    if value < Decimal::ZERO || value >= Decimal::ONE {
        return Err(TradeBoundsError::ConfigInvalid {
            section: "trade".to_string(),
            key: key.to_string(),
            reason: format!("{key} must be in [0, 1), got {value}"),
        });
    }
    Ok(())
}

fn validate_bool(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), TradeBoundsError> {
    match config.get_string(section, key) {
        None => Ok(()),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "false" | "no" | "0" => Ok(()),
            _ => Err(TradeBoundsError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("{raw:?} is not a boolean"),
            }),
        },
    }
}

fn validate_pool_size(config: &dyn ConfigPort) -> Result<(), TradeBoundsError> {
    let value = config.get_int("sqlite", "pool_size", 1);
    if value < 1 || value > i64::from(MAX_POOL_SIZE) {
        return Err(TradeBoundsError::ConfigInvalid {
            section: "sqlite".to_string(),
            key: "pool_size".to_string(),
            reason: format!("pool_size must be between 1 and {MAX_POOL_SIZE}, got {value}"),
        });
    }
    Ok(())
}

fn validate_table_name(config: &dyn ConfigPort) -> Result<(), TradeBoundsError> {
    match config.get_string("sqlite", "table") {
        None => Ok(()),
        Some(name) if is_identifier(&name) => Ok(()),
        Some(name) => Err(TradeBoundsError::ConfigInvalid {
            section: "sqlite".to_string(),
            key: "table".to_string(),
            reason: format!("{name:?} is not a plain identifier"),
        }),
    }
}

fn validate_export_basename(config: &dyn ConfigPort) -> Result<(), TradeBoundsError> {
    match config.get_string("export", "basename") {
        Some(name) if name.trim().is_empty() || name.contains(['/', '\\']) => {
            Err(TradeBoundsError::ConfigInvalid {
                section: "export".to_string(),
                key: "basename".to_string(),
                reason: "basename must be a non-empty file name".to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
