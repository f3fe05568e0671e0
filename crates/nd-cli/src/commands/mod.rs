//! CLI subcommand implementations.

pub mod countries;
pub mod peak;
pub mod report;
pub mod status;
pub mod util;
