//! The `repl` subcommand: an interactive read-parse-evaluate-print loop.
//!
//! Each line is parsed and evaluated independently against a persistent
//! environment, so `let`/`const`/`class` bindings from earlier lines stay
//! visible to later ones. A leading `:` marks a REPL meta-command (`:quit`,
//! `:help`) rather than language source, per the language's own
//! out-of-scope note that `:`-prefixed input is never part of the grammar.

use std::io::{self, Write};

use rillc_eval::{evaluate_with_config, new_environment, EvalConfig, Value};
use rillc_par::parse;
use rillc_util::Handler;

use crate::commands::diagnostics;
use crate::config::ReplConfig;

const HELP_TEXT: &str = "Meta-commands: :help (show this message), :quit (exit)";

/// Runs the interactive loop against stdin/stdout until `:quit` or EOF.
pub fn run(config: EvalConfig, repl: ReplConfig) {
    println!("rill REPL — {}", HELP_TEXT);
    let env = new_environment(None);
    let mut input = String::new();

    loop {
        print!("{}", repl.prompt);
        let _ = io::stdout().flush();

        input.clear();
        let bytes_read = match io::stdin().read_line(&mut input) {
            Ok(n) => n,
            Err(e) => {
                eprintln!("error reading input: {}", e);
                continue;
            }
        };
        if bytes_read == 0 {
            println!();
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix(':') {
            if !handle_meta_command(command) {
                break;
            }
            continue;
        }

        eval_line(line, &env, config, &repl);
    }
}

/// Returns `false` when the REPL should exit.
fn handle_meta_command(command: &str) -> bool {
    match command.trim() {
        "quit" | "q" | "exit" => false,
        "help" | "h" => {
            println!("{}", HELP_TEXT);
            true
        }
        other => {
            eprintln!("unknown meta-command ':{}', try :help", other);
            true
        }
    }
}

fn eval_line(
    line: &str,
    env: &std::rc::Rc<std::cell::RefCell<rillc_eval::Environment>>,
    config: EvalConfig,
    repl: &ReplConfig,
) {
    let handler = Handler::new();
    let program = parse(line, &handler);

    if handler.has_errors() {
        diagnostics::report(&handler);
        return;
    }

    match evaluate_with_config(&program, env, config) {
        Ok(value) => print_result(&value, repl),
        Err(err) => {
            err.emit(&handler, line);
            diagnostics::report(&handler);
        }
    }
}

fn print_result(value: &Value, repl: &ReplConfig) {
    if matches!(value, Value::Null) {
        return;
    }
    if repl.show_type {
        println!("{}: {}", value.inspect(), value.type_name());
    } else {
        println!("{}", value.inspect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_meta_command_keeps_the_loop_running() {
        assert!(handle_meta_command("help"));
    }

    #[test]
    fn quit_meta_command_stops_the_loop() {
        assert!(!handle_meta_command("quit"));
    }

    #[test]
    fn unknown_meta_command_keeps_the_loop_running() {
        assert!(handle_meta_command("bogus"));
    }

    #[test]
    fn eval_line_persists_bindings_across_calls() {
        let env = new_environment(None);
        let repl = ReplConfig::default();
        eval_line("let x = 40;", &env, EvalConfig::default(), &repl);
        eval_line("x + 2;", &env, EvalConfig::default(), &repl);
        assert!(matches!(env.borrow().get("x"), Some(Value::Int(40))));
    }
}
