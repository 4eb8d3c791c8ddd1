//! Command implementations

pub mod query;
pub mod seal;
