//! Compilation of textual patterns into [`Pattern`] trees

use pysweep_core::cst::PySyntaxKind;
use pysweep_core::error::SweepError;
use pysweep_core::result::Result;

use super::{Pattern, TokenClass};

/// Compile a pattern expression
///
/// The result matches exactly one element at a time; top-level optional or
/// repeated patterns are rejected because they could match nothing.
pub fn compile_pattern(text: &str) -> Result<Pattern> {
    let tokens = tokenize(text)?;
    let mut parser = PatternParser {
        source: text,
        tokens,
        pos: 0,
    };
    let alternatives = parser.parse_alternatives()?;
    if !parser.at_end() {
        return Err(parser.error(format!("unexpected {}", parser.peek_name())));
    }

    let pattern = if alternatives.len() == 1 {
        let mut seq = alternatives.into_iter().next().unwrap_or_default();
        if seq.len() != 1 {
            return Err(SweepError::pattern_syntax(
                text,
                "top-level pattern must be a single unit",
            ));
        }
        seq.remove(0)
    } else {
        Pattern::Alt(alternatives)
    };

    if matches!(pattern, Pattern::Optional(_) | Pattern::Repeat(_)) {
        return Err(SweepError::pattern_syntax(
            text,
            "top-level pattern must always consume an element",
        ));
    }
    Ok(pattern)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatToken {
    Ident(String),
    Str(String),
    Lt,
    Gt,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Pipe,
    Eq,
    Star,
}

impl PatToken {
    fn name(&self) -> String {
        match self {
            Self::Ident(s) => format!("'{s}'"),
            Self::Str(s) => format!("{s:?}"),
            Self::Lt => "'<'".into(),
            Self::Gt => "'>'".into(),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::LBracket => "'['".into(),
            Self::RBracket => "']'".into(),
            Self::Pipe => "'|'".into(),
            Self::Eq => "'='".into(),
            Self::Star => "'*'".into(),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<PatToken>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            c if c.is_whitespace() => i += 1,
            '<' => {
                tokens.push(PatToken::Lt);
                i += 1;
            }
            '>' => {
                tokens.push(PatToken::Gt);
                i += 1;
            }
            '(' => {
                tokens.push(PatToken::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(PatToken::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(PatToken::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(PatToken::RBracket);
                i += 1;
            }
            '|' => {
                tokens.push(PatToken::Pipe);
                i += 1;
            }
            '=' => {
                tokens.push(PatToken::Eq);
                i += 1;
            }
            '*' => {
                tokens.push(PatToken::Star);
                i += 1;
            }
            '"' | '\'' => {
                let quote = bytes[i];
                let start = i + 1;
                let mut j = start;
                while j < bytes.len() && bytes[j] != quote {
                    j += 1;
                }
                if j == bytes.len() {
                    return Err(SweepError::pattern_syntax(text, "unterminated literal"));
                }
                tokens.push(PatToken::Str(text[start..j].to_string()));
                i = j + 1;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                tokens.push(PatToken::Ident(text[start..i].to_string()));
            }
            other => {
                return Err(SweepError::pattern_syntax(
                    text,
                    format!("unexpected character {other:?}"),
                ));
            }
        }
    }
    Ok(tokens)
}

struct PatternParser<'a> {
    source: &'a str,
    tokens: Vec<PatToken>,
    pos: usize,
}

impl PatternParser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PatToken> {
        self.tokens.get(self.pos)
    }

    fn peek_name(&self) -> String {
        self.peek()
            .map(PatToken::name)
            .unwrap_or_else(|| "end of pattern".into())
    }

    fn bump(&mut self) -> Option<PatToken> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &PatToken) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: PatToken) -> Result<()> {
        if self.eat(&tok) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}, found {}", tok.name(), self.peek_name())))
        }
    }

    fn error(&self, message: impl Into<String>) -> SweepError {
        SweepError::pattern_syntax(self.source, message)
    }

    /// alternatives: sequence ('|' sequence)*
    fn parse_alternatives(&mut self) -> Result<Vec<Vec<Pattern>>> {
        let mut alternatives = vec![self.parse_sequence()?];
        while self.eat(&PatToken::Pipe) {
            alternatives.push(self.parse_sequence()?);
        }
        Ok(alternatives)
    }

    /// sequence: unit* (stops at '|', '>', ')', ']', or end)
    fn parse_sequence(&mut self) -> Result<Vec<Pattern>> {
        let mut seq = Vec::new();
        loop {
            match self.peek() {
                None
                | Some(PatToken::Pipe)
                | Some(PatToken::Gt)
                | Some(PatToken::RParen)
                | Some(PatToken::RBracket) => break,
                _ => seq.push(self.parse_unit()?),
            }
        }
        Ok(seq)
    }

    /// unit: [name '='] base ['*']
    fn parse_unit(&mut self) -> Result<Pattern> {
        // capture binding: ident followed by '='
        if let Some(PatToken::Ident(name)) = self.peek()
            && self.tokens.get(self.pos + 1) == Some(&PatToken::Eq)
        {
            let name = name.clone();
            self.pos += 2;
            let inner = self.parse_unit()?;
            return Ok(Pattern::Capture {
                name,
                inner: Box::new(inner),
            });
        }

        let base = match self.bump() {
            Some(PatToken::Str(text)) => Pattern::Leaf(text),
            Some(PatToken::Ident(word)) => self.parse_ident(word)?,
            Some(PatToken::LParen) => {
                let alternatives = self.parse_alternatives()?;
                self.expect(PatToken::RParen)?;
                if alternatives.len() == 1 && alternatives[0].len() == 1 {
                    let mut seq = alternatives.into_iter().next().unwrap_or_default();
                    seq.remove(0)
                } else {
                    Pattern::Alt(alternatives)
                }
            }
            Some(PatToken::LBracket) => {
                let seq = self.parse_sequence()?;
                self.expect(PatToken::RBracket)?;
                if seq.is_empty() {
                    return Err(self.error("empty optional group"));
                }
                Pattern::Optional(seq)
            }
            other => {
                let found = other
                    .map(|t| t.name())
                    .unwrap_or_else(|| "end of pattern".into());
                return Err(self.error(format!("expected pattern unit, found {found}")));
            }
        };

        if self.eat(&PatToken::Star) {
            Ok(Pattern::Repeat(Box::new(base)))
        } else {
            Ok(base)
        }
    }

    fn parse_ident(&mut self, word: String) -> Result<Pattern> {
        if word == "any" {
            if self.eat(&PatToken::Lt) {
                let children = self.parse_children()?;
                return Ok(Pattern::AnyNode { children });
            }
            return Ok(Pattern::Any);
        }
        if let Some(class) = TokenClass::from_keyword(&word) {
            return Ok(Pattern::TokenClass(class));
        }
        let Some(kind) = PySyntaxKind::from_category_name(&word) else {
            return Err(self.error(format!("unknown category '{word}'")));
        };
        if self.eat(&PatToken::Lt) {
            let children = self.parse_children()?;
            if children.is_empty() {
                return Err(self.error(format!("empty child sequence for '{word}'")));
            }
            Ok(Pattern::Node { kind, children })
        } else {
            Ok(Pattern::Kind(kind))
        }
    }

    /// children: alternatives '>'
    ///
    /// The content of `< ... >` is a full alternation of sequences, so
    /// `comparison< (a b) | (b a) >` describes two child shapes without an
    /// extra grouping layer.
    fn parse_children(&mut self) -> Result<Vec<Pattern>> {
        let alternatives = self.parse_alternatives()?;
        self.expect(PatToken::Gt)?;
        if alternatives.len() == 1 {
            Ok(alternatives.into_iter().next().unwrap_or_default())
        } else {
            Ok(vec![Pattern::Alt(alternatives)])
        }
    }
}
