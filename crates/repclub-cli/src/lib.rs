//! Library side of the `repclub-import` binary: argument definitions,
//! config loading, logging setup and the command implementations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod overrides;
pub mod summary;
