//! CST-aware lexer that preserves all trivia (whitespace, comments)
//!
//! The lexer preserves ALL source information to enable lossless
//! round-tripping: every input byte lands in exactly one token, including
//! whitespace, comments, newlines, and backslash line continuations.

use crate::cst::PySyntaxKind;
use std::ops::Range;

/// Simple span representing a range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: PySyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: PySyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex input preserving ALL trivia for CST construction
///
/// Whitespace, comments, newlines, and line continuations become trivia
/// tokens rather than being skipped, so `parse(source).text() == source`.
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    let len = input.len();
    let mut i = 0usize;

    while i < len {
        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        match current {
            // Newlines (kept separate from whitespace so the parser can see
            // logical line boundaries)
            '\n' => {
                tokens.push(CstToken::new(PySyntaxKind::Newline, "\n", span(start, i + size)));
                i += size;
            }
            '\r' => {
                let mut end = i + size;
                if let Some(('\n', nl_size)) = next_char(input, end) {
                    end += nl_size;
                }
                tokens.push(CstToken::new(
                    PySyntaxKind::Newline,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }

            // Whitespace (spaces, tabs, form feeds) - PRESERVE IT!
            c if c.is_whitespace() && c != '\n' && c != '\r' => {
                let mut end = i + size;
                while let Some((next_ch, next_size)) = next_char(input, end) {
                    if next_ch.is_whitespace() && next_ch != '\n' && next_ch != '\r' {
                        end += next_size;
                    } else {
                        break;
                    }
                }
                tokens.push(CstToken::new(
                    PySyntaxKind::Whitespace,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }

            // Comments - PRESERVE THEM!
            '#' => {
                let mut end = i + size;
                while let Some((c, step)) = next_char(input, end) {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                    end += step;
                }
                tokens.push(CstToken::new(
                    PySyntaxKind::Comment,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }

            // Backslash line continuation (trivia); a stray backslash is an
            // error token
            '\\' => {
                let mut end = i + size;
                match next_char(input, end) {
                    Some(('\n', nl)) => {
                        end += nl;
                        tokens.push(CstToken::new(
                            PySyntaxKind::LineContinuation,
                            &input[start..end],
                            span(start, end),
                        ));
                    }
                    Some(('\r', cr)) => {
                        end += cr;
                        if let Some(('\n', nl)) = next_char(input, end) {
                            end += nl;
                        }
                        tokens.push(CstToken::new(
                            PySyntaxKind::LineContinuation,
                            &input[start..end],
                            span(start, end),
                        ));
                    }
                    _ => {
                        errors.push(LexerError::new(
                            "unexpected character after line continuation character",
                            span(start, end),
                        ));
                        tokens.push(CstToken::new(
                            PySyntaxKind::Error,
                            &input[start..end],
                            span(start, end),
                        ));
                    }
                }
                i = end;
            }

            // String literals
            '\'' | '"' => {
                let (end, err) = lex_string(input, start, start);
                if let Some(err) = err {
                    errors.push(err);
                }
                tokens.push(CstToken::new(
                    PySyntaxKind::String,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }

            // Numbers
            c if c.is_ascii_digit() => {
                let end = lex_number(input, start);
                tokens.push(CstToken::new(
                    PySyntaxKind::Number,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }
            '.' if next_char(input, i + size).is_some_and(|(c, _)| c.is_ascii_digit()) => {
                let end = lex_number(input, start);
                tokens.push(CstToken::new(
                    PySyntaxKind::Number,
                    &input[start..end],
                    span(start, end),
                ));
                i = end;
            }

            // Names, keywords, and prefixed strings (r"...", b'...', f"...")
            c if c.is_alphabetic() || c == '_' => {
                let mut end = i + size;
                while let Some((next_ch, next_size)) = next_char(input, end) {
                    if next_ch.is_alphanumeric() || next_ch == '_' {
                        end += next_size;
                    } else {
                        break;
                    }
                }
                let word = &input[start..end];

                // A string prefix immediately followed by a quote starts a
                // string literal, not a name
                let is_prefix = word.len() <= 3
                    && word.chars().all(|c| matches!(c, 'r' | 'b' | 'u' | 'f' | 'R' | 'B' | 'U' | 'F'));
                if is_prefix && matches!(next_char(input, end), Some(('\'' | '"', _))) {
                    let (str_end, err) = lex_string(input, start, end);
                    if let Some(err) = err {
                        errors.push(err);
                    }
                    tokens.push(CstToken::new(
                        PySyntaxKind::String,
                        &input[start..str_end],
                        span(start, str_end),
                    ));
                    i = str_end;
                    continue;
                }

                let kind = PySyntaxKind::keyword_kind(word).unwrap_or(PySyntaxKind::Name);
                tokens.push(CstToken::new(kind, word, span(start, end)));
                i = end;
            }

            // Operators and punctuation
            _ => {
                let (kind, end) = lex_operator(input, start);
                if kind == PySyntaxKind::Error {
                    errors.push(LexerError::new(
                        format!("unexpected character `{current}`"),
                        span(start, end),
                    ));
                }
                tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
                i = end;
            }
        }
    }

    (tokens, errors)
}

/// Lex a string literal starting at `quote_pos` (the first quote), with the
/// token text beginning at `start` (which may include a prefix like `r` or
/// `b`). Returns the end offset and an error for unterminated strings.
fn lex_string(input: &str, start: usize, quote_pos: usize) -> (usize, Option<LexerError>) {
    let Some((quote, qsize)) = next_char(input, quote_pos) else {
        return (quote_pos, None);
    };
    let mut i = quote_pos + qsize;

    // Triple-quoted?
    let triple = input[i..].starts_with(match quote {
        '\'' => "''",
        _ => "\"\"",
    });
    if triple {
        i += 2;
        let closer = if quote == '\'' { "'''" } else { "\"\"\"" };
        while i < input.len() {
            if input[i..].starts_with(closer) {
                return (i + 3, None);
            }
            if input[i..].starts_with('\\') && i + 1 < input.len() {
                i += 1;
            }
            let step = next_char(input, i).map(|(_, s)| s).unwrap_or(1);
            i += step;
        }
        return (
            input.len(),
            Some(LexerError::new(
                "unterminated triple-quoted string",
                span(start, input.len()),
            )),
        );
    }

    while let Some((c, step)) = next_char(input, i) {
        match c {
            '\\' => {
                i += step;
                // Skip the escaped character (including escaped newlines)
                if let Some((_, esc)) = next_char(input, i) {
                    i += esc;
                }
            }
            '\n' | '\r' => {
                return (
                    i,
                    Some(LexerError::new("unterminated string literal", span(start, i))),
                );
            }
            c if c == quote => {
                return (i + step, None);
            }
            _ => i += step,
        }
    }
    (
        input.len(),
        Some(LexerError::new(
            "unterminated string literal",
            span(start, input.len()),
        )),
    )
}

/// Lex a numeric literal (integers, floats, hex/oct/bin, exponents, imaginary)
fn lex_number(input: &str, start: usize) -> usize {
    let mut i = start;
    let mut prev = '\0';
    while let Some((c, step)) = next_char(input, i) {
        let ok = c.is_ascii_alphanumeric()
            || c == '_'
            || c == '.'
            || ((c == '+' || c == '-') && matches!(prev, 'e' | 'E'));
        if !ok {
            break;
        }
        prev = c;
        i += step;
    }
    i
}

/// Lex an operator or punctuation token, longest match first
fn lex_operator(input: &str, start: usize) -> (PySyntaxKind, usize) {
    let rest = &input[start..];

    // Three-character operators
    for (text, kind) in [
        ("**=", PySyntaxKind::AugAssign),
        ("//=", PySyntaxKind::AugAssign),
        ("<<=", PySyntaxKind::AugAssign),
        (">>=", PySyntaxKind::AugAssign),
    ] {
        if rest.starts_with(text) {
            return (kind, start + text.len());
        }
    }

    // Two-character operators
    for (text, kind) in [
        ("==", PySyntaxKind::EqEq),
        ("!=", PySyntaxKind::NotEq),
        ("<=", PySyntaxKind::LtEq),
        (">=", PySyntaxKind::GtEq),
        ("<<", PySyntaxKind::Shl),
        (">>", PySyntaxKind::Shr),
        ("**", PySyntaxKind::DoubleStar),
        ("//", PySyntaxKind::DoubleSlash),
        ("->", PySyntaxKind::Arrow),
        (":=", PySyntaxKind::Walrus),
        ("+=", PySyntaxKind::AugAssign),
        ("-=", PySyntaxKind::AugAssign),
        ("*=", PySyntaxKind::AugAssign),
        ("/=", PySyntaxKind::AugAssign),
        ("%=", PySyntaxKind::AugAssign),
        ("&=", PySyntaxKind::AugAssign),
        ("|=", PySyntaxKind::AugAssign),
        ("^=", PySyntaxKind::AugAssign),
        ("@=", PySyntaxKind::AugAssign),
    ] {
        if rest.starts_with(text) {
            return (kind, start + text.len());
        }
    }

    let Some((c, size)) = next_char(input, start) else {
        return (PySyntaxKind::Error, start);
    };
    let kind = match c {
        '(' => PySyntaxKind::LParen,
        ')' => PySyntaxKind::RParen,
        '[' => PySyntaxKind::LBracket,
        ']' => PySyntaxKind::RBracket,
        '{' => PySyntaxKind::LBrace,
        '}' => PySyntaxKind::RBrace,
        ',' => PySyntaxKind::Comma,
        ':' => PySyntaxKind::Colon,
        ';' => PySyntaxKind::Semicolon,
        '.' => PySyntaxKind::Dot,
        '@' => PySyntaxKind::At,
        '=' => PySyntaxKind::Assign,
        '<' => PySyntaxKind::Lt,
        '>' => PySyntaxKind::Gt,
        '+' => PySyntaxKind::Plus,
        '-' => PySyntaxKind::Minus,
        '*' => PySyntaxKind::Star,
        '/' => PySyntaxKind::Slash,
        '%' => PySyntaxKind::Percent,
        '&' => PySyntaxKind::Amp,
        '|' => PySyntaxKind::Pipe,
        '^' => PySyntaxKind::Caret,
        '~' => PySyntaxKind::Tilde,
        _ => PySyntaxKind::Error,
    };
    (kind, start + size)
}

fn next_char(input: &str, pos: usize) -> Option<(char, usize)> {
    input[pos..].chars().next().map(|c| (c, c.len_utf8()))
}

/// Create a span from start to end
fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<PySyntaxKind> {
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty(), "unexpected lexer errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_every_byte_is_covered() {
        let input = "not a == b  # compare\nx = dict([(k, v) for k, v in items])\n";
        let (tokens, _) = lex_with_trivia(input);
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn test_keywords_vs_names() {
        let kinds = kinds("not None in items");
        assert_eq!(
            kinds,
            vec![
                PySyntaxKind::NotKw,
                PySyntaxKind::Whitespace,
                PySyntaxKind::Name, // None is a plain name in this grammar
                PySyntaxKind::Whitespace,
                PySyntaxKind::InKw,
                PySyntaxKind::Whitespace,
                PySyntaxKind::Name,
            ]
        );
    }

    #[test]
    fn test_comparison_operators() {
        let kinds = kinds("a<=b!=c");
        assert_eq!(
            kinds,
            vec![
                PySyntaxKind::Name,
                PySyntaxKind::LtEq,
                PySyntaxKind::Name,
                PySyntaxKind::NotEq,
                PySyntaxKind::Name,
            ]
        );
    }

    #[test]
    fn test_aug_assign_is_single_token() {
        assert_eq!(
            kinds("x += 1"),
            vec![
                PySyntaxKind::Name,
                PySyntaxKind::Whitespace,
                PySyntaxKind::AugAssign,
                PySyntaxKind::Whitespace,
                PySyntaxKind::Number,
            ]
        );
    }

    #[test]
    fn test_strings() {
        let (tokens, errors) = lex_with_trivia(r#"x = "he\"llo" + r'raw' + b"bytes""#);
        assert!(errors.is_empty());
        let strings: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == PySyntaxKind::String)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(strings, vec![r#""he\"llo""#, "r'raw'", r#"b"bytes""#]);
    }

    #[test]
    fn test_triple_quoted_string() {
        let input = "s = '''line1\nline2'''\n";
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty());
        assert!(
            tokens
                .iter()
                .any(|t| t.kind == PySyntaxKind::String && t.text.contains("line2"))
        );
    }

    #[test]
    fn test_unterminated_string_is_reported() {
        let (_, errors) = lex_with_trivia("x = 'oops\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unterminated"));
    }

    #[test]
    fn test_comment_excludes_newline() {
        let (tokens, _) = lex_with_trivia("x  # trailing\ny");
        let comment = tokens
            .iter()
            .find(|t| t.kind == PySyntaxKind::Comment)
            .unwrap();
        assert_eq!(comment.text, "# trailing");
        assert!(tokens.iter().any(|t| t.kind == PySyntaxKind::Newline));
    }

    #[test]
    fn test_line_continuation_is_trivia() {
        let (tokens, errors) = lex_with_trivia("x = 1 + \\\n    2");
        assert!(errors.is_empty());
        let cont = tokens
            .iter()
            .find(|t| t.kind == PySyntaxKind::LineContinuation)
            .unwrap();
        assert!(cont.kind.is_trivia());
        assert_eq!(cont.text, "\\\n");
    }

    #[test]
    fn test_numbers() {
        for src in ["42", "3.14", "0x1f", "1_000", "1e-3", "2j", ".5"] {
            let (tokens, errors) = lex_with_trivia(src);
            assert!(errors.is_empty(), "{src}");
            assert_eq!(tokens.len(), 1, "{src}");
            assert_eq!(tokens[0].kind, PySyntaxKind::Number, "{src}");
            assert_eq!(tokens[0].text, src);
        }
    }
}
