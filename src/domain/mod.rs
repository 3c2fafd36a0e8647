//! Core domain types and logic.

pub mod variable;
pub mod store;
pub mod trade_function;
pub mod recompute;
pub mod config_validation;
pub mod error;
