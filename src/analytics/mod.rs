//! Query log and usage reporting.

pub mod logger;
pub mod reporter;
