//! F-string body rescanning.
//!
//! The lexer captures an f-string's raw body (between the opening `f"` and
//! the closing `"`) without decoding escapes or interpreting `{...}`
//! sections, so two layers don't each try to own escape handling. This
//! module walks that raw body, decoding escapes in the static text runs and
//! extracting and parsing each balanced-brace expression with a fresh
//! lexer/parser pair.

use rillc_lex::{Lexer, Position};

use crate::ast::{Expr, FStringExpr};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_fstring_body(&mut self, raw: &str, position: Position) -> FStringExpr {
        let chars: Vec<char> = raw.chars().collect();
        let mut static_parts = Vec::new();
        let mut expressions = Vec::new();
        let mut current = String::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '\\' if i + 1 < chars.len() => {
                    current.push(decode_escape(chars[i + 1], self, position));
                    i += 2;
                }
                '{' => {
                    let expr_start = i + 1;
                    let mut depth = 1;
                    let mut j = expr_start;
                    while j < chars.len() && depth > 0 {
                        match chars[j] {
                            '{' => depth += 1,
                            '}' => depth -= 1,
                            '"' | '\'' => {
                                let quote = chars[j];
                                j += 1;
                                while j < chars.len() && chars[j] != quote {
                                    if chars[j] == '\\' {
                                        j += 1;
                                    }
                                    j += 1;
                                }
                            }
                            _ => {}
                        }
                        if depth > 0 {
                            j += 1;
                        }
                    }

                    if depth != 0 {
                        self.error_at("unterminated f-string expression", position);
                        static_parts.push(std::mem::take(&mut current));
                        return FStringExpr {
                            static_parts,
                            expressions,
                            position,
                        };
                    }

                    let source: String = chars[expr_start..j].iter().collect();
                    if source.trim().is_empty() {
                        self.error_at("empty f-string expression", position);
                    } else {
                        let handler = self.handler;
                        let tokens: Vec<_> = Lexer::new(&source, handler).collect();
                        let mut nested = Parser::new(tokens, handler);
                        if let Some(expr) = nested.parse_expression() {
                            expressions.push(expr);
                        } else {
                            expressions.push(Expr::Null(position));
                        }
                    }

                    static_parts.push(std::mem::take(&mut current));
                    i = j + 1;
                }
                c => {
                    current.push(c);
                    i += 1;
                }
            }
        }

        static_parts.push(current);

        FStringExpr {
            static_parts,
            expressions,
            position,
        }
    }
}

fn decode_escape(c: char, parser: &Parser<'_>, position: Position) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'f' => '\u{000C}',
        'b' => '\u{0008}',
        '\'' => '\'',
        '"' => '"',
        '\\' => '\\',
        '{' => '{',
        '}' => '}',
        other => {
            parser.error_at(format!("unknown escape sequence: \\{}", other), position);
            other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rillc_util::Handler;

    fn parse(source: &str) -> (Expr, Handler) {
        let handler = Handler::new();
        let tokens: Vec<_> = Lexer::new(source, &handler).collect();
        let mut parser = Parser::new(tokens, &handler);
        (parser.parse_expression().unwrap(), handler)
    }

    #[test]
    fn static_text_only() {
        let (expr, handler) = parse(r#"f"hello""#);
        assert!(!handler.has_errors());
        if let Expr::FString(f) = expr {
            assert_eq!(f.static_parts, vec!["hello".to_string()]);
            assert!(f.expressions.is_empty());
        } else {
            panic!("expected f-string");
        }
    }

    #[test]
    fn single_interpolation() {
        let (expr, handler) = parse(r#"f"hello {name}""#);
        assert!(!handler.has_errors());
        if let Expr::FString(f) = expr {
            assert_eq!(f.static_parts, vec!["hello ".to_string(), "".to_string()]);
            assert_eq!(f.expressions.len(), 1);
            assert!(matches!(&f.expressions[0], Expr::Identifier(i) if i.name == "name"));
        } else {
            panic!("expected f-string");
        }
    }

    #[test]
    fn multiple_interpolations() {
        let (expr, handler) = parse(r#"f"{a} and {b}""#);
        assert!(!handler.has_errors());
        if let Expr::FString(f) = expr {
            assert_eq!(f.static_parts.len(), 3);
            assert_eq!(f.expressions.len(), 2);
        } else {
            panic!("expected f-string");
        }
    }

    #[test]
    fn nested_quoted_string_inside_expression() {
        let (expr, handler) = parse(r#"f"{greet(\"hi\")}""#);
        assert!(!handler.has_errors());
        if let Expr::FString(f) = expr {
            assert_eq!(f.expressions.len(), 1);
            assert!(matches!(&f.expressions[0], Expr::Call(_)));
        } else {
            panic!("expected f-string");
        }
    }

    #[test]
    fn empty_braces_is_an_error() {
        let (_expr, handler) = parse(r#"f"{}""#);
        assert!(handler.has_errors());
    }

    #[test]
    fn decodes_escapes_in_static_text() {
        let (expr, handler) = parse(r#"f"line1\nline2""#);
        assert!(!handler.has_errors());
        if let Expr::FString(f) = expr {
            assert_eq!(f.static_parts[0], "line1\nline2");
        } else {
            panic!("expected f-string");
        }
    }
}
