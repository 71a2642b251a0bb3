//! Command modules for the `rill` CLI.
//!
//! Each subcommand is a thin wrapper over `rillc_par::parse` and
//! `rillc_eval::evaluate_with_config`; this module also holds the shared
//! diagnostic-rendering helper both subcommands use to report errors.

pub mod diagnostics;
pub mod repl;
pub mod run;
