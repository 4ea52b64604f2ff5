//! CLI subcommands.

pub mod common;
pub mod load;
pub mod probe;
