//! Subcommand handlers

pub mod install;
pub mod uninstall;
