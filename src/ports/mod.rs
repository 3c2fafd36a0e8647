//! Port traits implemented by [`crate::adapters`].

pub mod config_port;
pub mod export_port;
pub mod store_port;
