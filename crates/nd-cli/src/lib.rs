//! Travel day tracker CLI library.
//!
//! This crate provides the `nd` command-line interface over `nd-core` and
//! `nd-db`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, WindowArgs};
pub use config::Config;
