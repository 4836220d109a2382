//! Command-line interface module
//!
//! Handles argument parsing and the mapping of arguments to operations

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::*;
