//! The `run` subcommand: execute a script file end to end.

use std::path::PathBuf;

use rillc_eval::{evaluate_with_config, new_environment, EvalConfig};
use rillc_par::parse;
use rillc_util::Handler;
use tracing::{debug, info};

use crate::commands::diagnostics;
use crate::error::{CliError, Result};

/// Arguments for the `run` subcommand.
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Path to the script file to execute.
    pub path: PathBuf,
}

/// Reads, parses, and evaluates the script at `args.path`.
///
/// Parse errors are reported and short-circuit before evaluation begins;
/// a runtime error is reported and returned as `CliError::EvalFailed`.
pub fn run(args: RunArgs, config: EvalConfig) -> Result<()> {
    let source = std::fs::read_to_string(&args.path).map_err(|e| {
        CliError::FileOperation(format!("failed to read {}: {}", args.path.display(), e))
    })?;
    info!(path = %args.path.display(), "loaded script");

    let handler = Handler::new();
    let program = parse(&source, &handler);

    if handler.has_errors() {
        let count = diagnostics::report(&handler);
        return Err(CliError::ParseFailed(count));
    }
    debug!(statements = program.len(), "parsed program");

    let env = new_environment(None);
    match evaluate_with_config(&program, &env, config) {
        Ok(value) => {
            debug!(result = %value.inspect(), "evaluation finished");
            Ok(())
        }
        Err(err) => {
            let source_line = source.lines().nth(err.position.line.saturating_sub(1) as usize).unwrap_or("");
            err.emit(&handler, source_line);
            diagnostics::report(&handler);
            Err(CliError::EvalFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_script(dir: &TempDir, name: &str, source: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn runs_a_well_formed_script() {
        let dir = TempDir::new().unwrap();
        let path = write_script(&dir, "ok.rill", "let x = 1 + 2; println(x);");
        let result = run(RunArgs { path }, EvalConfig::default());
        assert!(result.is_ok());
    }

    #[test]
    fn reports_parse_errors_without_evaluating() {
        let dir = TempDir::new().unwrap();
        let path = write_script(&dir, "bad.rill", "let = ;");
        let result = run(RunArgs { path }, EvalConfig::default());
        assert!(matches!(result, Err(CliError::ParseFailed(_))));
    }

    #[test]
    fn reports_runtime_errors() {
        let dir = TempDir::new().unwrap();
        let path = write_script(&dir, "div0.rill", "1 / 0;");
        let result = run(RunArgs { path }, EvalConfig::default());
        assert!(matches!(result, Err(CliError::EvalFailed)));
    }

    #[test]
    fn missing_file_is_a_file_operation_error() {
        let result = run(
            RunArgs { path: PathBuf::from("/nonexistent/script.rill") },
            EvalConfig::default(),
        );
        assert!(matches!(result, Err(CliError::FileOperation(_))));
    }
}
