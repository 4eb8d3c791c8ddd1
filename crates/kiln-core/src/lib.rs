//! Kiln Core - Foundational types for the Kiln asset resolver
//!
//! This crate provides the error taxonomy that all other Kiln crates
//! depend on: `KilnError` and the `Result` alias.

mod error;

pub use error::{KilnError, Result};
