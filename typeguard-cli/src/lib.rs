//! # typeguard-cli
//!
//! Library surface of the `typeguard` CLI: error types shared by the
//! binary and its tests.

pub mod error;

pub use error::{CliError, CliResult};
