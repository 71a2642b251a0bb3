//! Renders a `Handler`'s collected diagnostics to stderr.
//!
//! Neither `rillc_util::Diagnostic` nor `Handler` implements `Display`
//! directly (the crate only supplies the pieces: level, code, snippet
//! formatting) so the CLI boundary is responsible for assembling them into
//! the bordered, captioned report readers expect from a compiler-style tool.

use rillc_util::{Diagnostic, Handler, Level};

/// Prints every diagnostic collected on `handler`, in the order they were
/// recorded, and returns how many were errors.
pub fn report(handler: &Handler) -> usize {
    for diag in handler.diagnostics() {
        print_one(&diag);
    }
    handler.error_count()
}

fn print_one(diag: &Diagnostic) {
    let level = match diag.level {
        Level::Error => "error",
        Level::Warning => "warning",
        Level::Note => "note",
        Level::Help => "help",
    };

    match &diag.code {
        Some(code) => eprintln!("{}[{}]: {}", level, code, diag.message),
        None => eprintln!("{}: {}", level, diag.message),
    }

    if diag.span != Default::default() {
        eprintln!("  --> line {}, column {}", diag.span.line, diag.span.column);
    }

    for snippet in &diag.snippets {
        for line in snippet.format().lines() {
            eprintln!("  {}", line);
        }
    }

    for note in &diag.notes {
        eprintln!("  note: {}", note);
    }

    for help in &diag.helps {
        eprintln!("  help: {}", help);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rillc_util::{DiagnosticBuilder, Span};

    #[test]
    fn report_counts_only_errors() {
        let handler = Handler::new();
        handler.emit_diagnostic(
            DiagnosticBuilder::error("bad thing").span(Span::point(1, 1)).build(),
        );
        handler.emit_diagnostic(
            rillc_util::Diagnostic::warning("heads up", Span::point(2, 1)),
        );
        assert_eq!(report(&handler), 1);
    }
}
