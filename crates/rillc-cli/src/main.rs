//! `rill` - command-line interface for the language's tree-walking
//! interpreter.
//!
//! Parses command-line arguments, initializes logging, loads configuration,
//! and dispatches to either the `run` or `repl` subcommand. Both are thin
//! wrappers over `rillc_par::parse` and `rillc_eval::evaluate_with_config`;
//! this binary owns no interpreter logic of its own.

mod commands;
mod config;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::repl;
use commands::run::{self, RunArgs};
use config::Config;

/// rill - run or explore programs in the language
#[derive(Parser, Debug)]
#[command(name = "rill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run or explore rill scripts", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, env = "RILL_VERBOSE")]
    verbose: bool,

    /// Path to a configuration file overriding evaluator resource bounds.
    #[arg(short, long, global = true, env = "RILL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a script file.
    Run(RunCommand),

    /// Start an interactive read-eval-print loop.
    Repl,
}

#[derive(Parser, Debug)]
struct RunCommand {
    /// Path to the script file to run.
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => {
            run::run(RunArgs { path: args.path }, config.eval_config())?;
        }
        Commands::Repl => {
            repl::run(config.eval_config(), config.repl.clone());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}

fn load_config(config_path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_run() {
        let cli = Cli::parse_from(["rill", "run", "script.rill"]);
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn cli_parse_run_with_path() {
        let cli = Cli::parse_from(["rill", "run", "script.rill"]);
        if let Commands::Run(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("script.rill"));
        } else {
            panic!("expected Run command");
        }
    }

    #[test]
    fn cli_parse_repl() {
        let cli = Cli::parse_from(["rill", "repl"]);
        assert!(matches!(cli.command, Commands::Repl));
    }

    #[test]
    fn cli_parse_global_verbose() {
        let cli = Cli::parse_from(["rill", "--verbose", "repl"]);
        assert!(cli.verbose);
    }

    #[test]
    fn cli_parse_global_config() {
        let cli = Cli::parse_from(["rill", "--config", "/path/to/rill.toml", "repl"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/rill.toml")));
    }
}
