//! Recursive-descent parser for the Python-subset grammar
//!
//! Builds a lossless hierarchical CST from the trivia-preserving token
//! stream. The tree mirrors the lib2to3 productions the rewrite rules are
//! written against: a production node is only created when it is
//! non-trivial (a bare `a` stays a Name token; `a == b` becomes a
//! `comparison` node), which is what makes category patterns meaningful.
//!
//! Statements form a flat list under the `Module` root. Indentation is
//! trivia; suite nesting is irrelevant to structural rewriting and is not
//! represented (scope analysis is out of scope for this engine).

use super::builder::CstBuilder;
use super::lexer::{CstToken, lex_with_trivia};
use super::{PySyntaxKind, PySyntaxNode, line_col};
use crate::error::SweepError;
use crate::result::Result;

/// A parse error with its byte offset in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Parse source text into a lossless CST, collecting errors
///
/// The returned tree always reproduces the input exactly
/// (`tree.text() == source`), even in the presence of errors.
pub fn parse_with_errors(source: &str) -> (PySyntaxNode, Vec<ParseError>) {
    let (tokens, lex_errors) = lex_with_trivia(source);
    let mut errors: Vec<ParseError> = lex_errors
        .into_iter()
        .map(|e| ParseError::new(e.message, e.span.start))
        .collect();

    let mut parser = Parser::new(&tokens);
    parser.parse_module();
    errors.extend(parser.errors.clone());
    errors.sort_by_key(|e| e.offset);
    (parser.finish(), errors)
}

/// Parse source text, failing with [`SweepError::Syntax`] on invalid input
pub fn parse_module(source: &str) -> Result<PySyntaxNode> {
    let (tree, errors) = parse_with_errors(source);
    if let Some(first) = errors.first() {
        let (line, column) = line_col(source, first.offset);
        return Err(SweepError::syntax(first.message.clone(), line, column));
    }
    debug_assert_eq!(tree.text().to_string(), source, "round-trip violation");
    Ok(tree)
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    pos: usize,
    builder: CstBuilder,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: CstBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> PySyntaxNode {
        self.builder.finish()
    }

    /// Parse the top-level module: a flat statement list
    fn parse_module(&mut self) {
        self.builder.start_node(PySyntaxKind::Module);

        loop {
            self.flush_trivia();
            if self.at_end() {
                break;
            }
            if self.peek_kind() == PySyntaxKind::Semicolon {
                self.bump();
                continue;
            }

            let before = self.pos;
            let inline_suite_ok = self.parse_statement();

            if self.pos == before {
                // No progress: consume the offending token so the loop
                // terminates
                self.error_here("unexpected token");
                self.bump();
                continue;
            }

            // Statement boundary: end of file, a newline in the trivia gap,
            // a semicolon, or an inline suite after a `:` header
            if !inline_suite_ok && !self.at_line_end() {
                self.error_here("expected end of line after statement");
            }
        }

        self.builder.finish_node(); // MODULE
    }

    /// Parse one statement. Returns true when the statement ends with a `:`
    /// header, which permits an inline suite on the same line.
    fn parse_statement(&mut self) -> bool {
        match self.peek_kind() {
            PySyntaxKind::ReturnKw => {
                self.start(PySyntaxKind::ReturnStmt);
                self.bump();
                if !self.at_line_end() {
                    self.parse_testlist();
                }
                self.builder.finish_node();
                false
            }
            PySyntaxKind::DelKw
            | PySyntaxKind::RaiseKw
            | PySyntaxKind::AssertKw
            | PySyntaxKind::GlobalKw
            | PySyntaxKind::NonlocalKw
            | PySyntaxKind::YieldKw => {
                self.start(PySyntaxKind::KeywordStmt);
                self.bump();
                if !self.at_line_end() {
                    self.parse_testlist();
                    // raise X from Y
                    if self.peek_kind() == PySyntaxKind::FromKw {
                        self.bump();
                        self.parse_test();
                    }
                }
                self.builder.finish_node();
                false
            }
            PySyntaxKind::ImportKw | PySyntaxKind::FromKw => {
                self.parse_import_stmt();
                false
            }
            PySyntaxKind::IfKw | PySyntaxKind::ElifKw | PySyntaxKind::WhileKw => {
                self.start(PySyntaxKind::CondHeader);
                self.bump();
                self.parse_test();
                self.expect(PySyntaxKind::Colon);
                self.builder.finish_node();
                true
            }
            PySyntaxKind::ElseKw | PySyntaxKind::TryKw | PySyntaxKind::FinallyKw => {
                self.start(PySyntaxKind::BlockHeader);
                self.bump();
                self.expect(PySyntaxKind::Colon);
                self.builder.finish_node();
                true
            }
            PySyntaxKind::ExceptKw => {
                self.start(PySyntaxKind::ExceptHeader);
                self.bump();
                if self.peek_kind() != PySyntaxKind::Colon {
                    self.parse_test();
                    if self.peek_kind() == PySyntaxKind::AsKw {
                        self.bump();
                        self.expect(PySyntaxKind::Name);
                    }
                }
                self.expect(PySyntaxKind::Colon);
                self.builder.finish_node();
                true
            }
            PySyntaxKind::ForKw => {
                self.start(PySyntaxKind::ForHeader);
                self.bump();
                self.parse_exprlist();
                self.expect(PySyntaxKind::InKw);
                self.parse_testlist();
                self.expect(PySyntaxKind::Colon);
                self.builder.finish_node();
                true
            }
            PySyntaxKind::WithKw => {
                self.start(PySyntaxKind::WithHeader);
                self.bump();
                loop {
                    self.parse_test();
                    if self.peek_kind() == PySyntaxKind::AsKw {
                        self.bump();
                        self.parse_expr();
                    }
                    if self.peek_kind() == PySyntaxKind::Comma {
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.expect(PySyntaxKind::Colon);
                self.builder.finish_node();
                true
            }
            PySyntaxKind::DefKw => {
                self.start(PySyntaxKind::FuncDef);
                self.bump();
                self.expect(PySyntaxKind::Name);
                self.parse_parameters();
                if self.peek_kind() == PySyntaxKind::Arrow {
                    self.bump();
                    self.parse_test();
                }
                self.expect(PySyntaxKind::Colon);
                self.builder.finish_node();
                true
            }
            PySyntaxKind::ClassKw => {
                self.start(PySyntaxKind::ClassDef);
                self.bump();
                self.expect(PySyntaxKind::Name);
                if self.peek_kind() == PySyntaxKind::LParen {
                    self.parse_parameters();
                }
                self.expect(PySyntaxKind::Colon);
                self.builder.finish_node();
                true
            }
            PySyntaxKind::At => {
                self.start(PySyntaxKind::Decorator);
                self.bump();
                self.parse_test();
                self.builder.finish_node();
                false
            }
            _ => {
                self.parse_expr_stmt();
                false
            }
        }
    }

    /// Expression statement, with an `expr_stmt` node only when an
    /// assignment is present (bare expressions stay unwrapped)
    fn parse_expr_stmt(&mut self) {
        let cp = self.checkpoint();
        self.parse_testlist();
        if matches!(
            self.peek_kind(),
            PySyntaxKind::Assign | PySyntaxKind::AugAssign
        ) {
            self.builder.start_node_at(cp, PySyntaxKind::ExprStmt);
            while matches!(
                self.peek_kind(),
                PySyntaxKind::Assign | PySyntaxKind::AugAssign
            ) {
                self.bump();
                self.parse_testlist();
            }
            self.builder.finish_node();
        }
    }

    /// `import ...` / `from ... import ...` - operand tokens are kept flat
    /// inside the statement node; nothing rewrites import machinery
    fn parse_import_stmt(&mut self) {
        self.start(PySyntaxKind::ImportStmt);
        self.bump(); // import / from
        let mut depth = 0u32;
        loop {
            if self.at_end() || (depth == 0 && self.at_line_end()) {
                break;
            }
            match self.peek_kind() {
                PySyntaxKind::LParen => depth += 1,
                PySyntaxKind::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
        self.builder.finish_node();
    }

    // ---- expressions ----

    /// testlist: test (',' test)* [',']
    fn parse_testlist(&mut self) {
        let cp = self.checkpoint();
        self.parse_test();
        if self.peek_kind() == PySyntaxKind::Comma {
            self.builder.start_node_at(cp, PySyntaxKind::Testlist);
            while self.peek_kind() == PySyntaxKind::Comma {
                self.bump();
                if self.at_expr_start() {
                    self.parse_test();
                } else {
                    break; // trailing comma
                }
            }
            self.builder.finish_node();
        }
    }

    /// exprlist: assignment/loop targets - comparisons and `in` excluded
    fn parse_exprlist(&mut self) {
        let cp = self.checkpoint();
        self.parse_expr();
        if self.peek_kind() == PySyntaxKind::Comma {
            self.builder.start_node_at(cp, PySyntaxKind::Testlist);
            while self.peek_kind() == PySyntaxKind::Comma {
                self.bump();
                if self.at_expr_start() {
                    self.parse_expr();
                } else {
                    break;
                }
            }
            self.builder.finish_node();
        }
    }

    /// test: lambdef | or_test ['if' or_test 'else' test]
    fn parse_test(&mut self) {
        if self.peek_kind() == PySyntaxKind::LambdaKw {
            self.parse_lambdef();
            return;
        }
        let cp = self.checkpoint();
        self.parse_or_test();
        if self.peek_kind() == PySyntaxKind::IfKw {
            self.builder.start_node_at(cp, PySyntaxKind::Ternary);
            self.bump();
            self.parse_or_test();
            self.expect(PySyntaxKind::ElseKw);
            self.parse_test();
            self.builder.finish_node();
        }
    }

    fn parse_lambdef(&mut self) {
        self.start(PySyntaxKind::Lambdef);
        self.bump(); // lambda
        if self.peek_kind() != PySyntaxKind::Colon {
            self.parse_arglist_contents(PySyntaxKind::Colon);
        }
        self.expect(PySyntaxKind::Colon);
        self.parse_test();
        self.builder.finish_node();
    }

    fn parse_or_test(&mut self) {
        let cp = self.checkpoint();
        self.parse_and_test();
        if self.peek_kind() == PySyntaxKind::OrKw {
            self.builder.start_node_at(cp, PySyntaxKind::OrTest);
            while self.peek_kind() == PySyntaxKind::OrKw {
                self.bump();
                self.parse_and_test();
            }
            self.builder.finish_node();
        }
    }

    fn parse_and_test(&mut self) {
        let cp = self.checkpoint();
        self.parse_not_test();
        if self.peek_kind() == PySyntaxKind::AndKw {
            self.builder.start_node_at(cp, PySyntaxKind::AndTest);
            while self.peek_kind() == PySyntaxKind::AndKw {
                self.bump();
                self.parse_not_test();
            }
            self.builder.finish_node();
        }
    }

    fn parse_not_test(&mut self) {
        if self.peek_kind() == PySyntaxKind::NotKw {
            self.start(PySyntaxKind::NotTest);
            self.bump();
            self.parse_not_test();
            self.builder.finish_node();
        } else {
            self.parse_comparison();
        }
    }

    /// comparison: expr (comp_op expr)*
    fn parse_comparison(&mut self) {
        let cp = self.checkpoint();
        self.parse_expr();
        if self.at_comp_op() {
            self.builder.start_node_at(cp, PySyntaxKind::Comparison);
            while self.at_comp_op() {
                self.parse_comp_op();
                self.parse_expr();
            }
            self.builder.finish_node();
        }
    }

    fn at_comp_op(&self) -> bool {
        let kind = self.peek_kind();
        kind.is_comparison_op()
            || kind == PySyntaxKind::InKw
            || kind == PySyntaxKind::IsKw
            || (kind == PySyntaxKind::NotKw && self.peek_nth_kind(1) == PySyntaxKind::InKw)
    }

    /// Single-token operators stay leaves; `not in` / `is not` become a
    /// `comp_op` node, as in lib2to3
    fn parse_comp_op(&mut self) {
        match self.peek_kind() {
            PySyntaxKind::NotKw => {
                self.start(PySyntaxKind::CompOp);
                self.bump(); // not
                self.expect(PySyntaxKind::InKw);
                self.builder.finish_node();
            }
            PySyntaxKind::IsKw if self.peek_nth_kind(1) == PySyntaxKind::NotKw => {
                self.start(PySyntaxKind::CompOp);
                self.bump(); // is
                self.bump(); // not
                self.builder.finish_node();
            }
            _ => self.bump(),
        }
    }

    /// Arithmetic and bitwise binary operators as one flat chain; the
    /// engine rewrites structure, not arithmetic, so operator precedence
    /// inside the chain is deliberately not represented
    fn parse_expr(&mut self) {
        let cp = self.checkpoint();
        self.parse_factor();
        if self.at_arith_op() {
            self.builder.start_node_at(cp, PySyntaxKind::ArithExpr);
            while self.at_arith_op() {
                self.bump();
                self.parse_factor();
            }
            self.builder.finish_node();
        }
    }

    fn at_arith_op(&self) -> bool {
        matches!(
            self.peek_kind(),
            PySyntaxKind::Pipe
                | PySyntaxKind::Caret
                | PySyntaxKind::Amp
                | PySyntaxKind::Shl
                | PySyntaxKind::Shr
                | PySyntaxKind::Plus
                | PySyntaxKind::Minus
                | PySyntaxKind::Star
                | PySyntaxKind::Slash
                | PySyntaxKind::DoubleSlash
                | PySyntaxKind::Percent
                | PySyntaxKind::At
        )
    }

    /// factor: unary '+', '-', '~' (and display-context '*' / '**')
    fn parse_factor(&mut self) {
        match self.peek_kind() {
            PySyntaxKind::Plus
            | PySyntaxKind::Minus
            | PySyntaxKind::Tilde
            | PySyntaxKind::Star
            | PySyntaxKind::DoubleStar => {
                self.start(PySyntaxKind::Factor);
                self.bump();
                self.parse_factor();
                self.builder.finish_node();
            }
            _ => self.parse_power(),
        }
    }

    /// power: atom trailer* ['**' factor]
    fn parse_power(&mut self) {
        let cp = self.checkpoint();
        self.parse_atom();
        if matches!(
            self.peek_kind(),
            PySyntaxKind::LParen
                | PySyntaxKind::LBracket
                | PySyntaxKind::Dot
                | PySyntaxKind::DoubleStar
        ) {
            self.builder.start_node_at(cp, PySyntaxKind::Power);
            while matches!(
                self.peek_kind(),
                PySyntaxKind::LParen | PySyntaxKind::LBracket | PySyntaxKind::Dot
            ) {
                self.parse_trailer();
            }
            if self.peek_kind() == PySyntaxKind::DoubleStar {
                self.bump();
                self.parse_factor();
            }
            self.builder.finish_node();
        }
    }

    fn parse_trailer(&mut self) {
        self.start(PySyntaxKind::Trailer);
        match self.peek_kind() {
            PySyntaxKind::LParen => {
                self.bump();
                if self.peek_kind() != PySyntaxKind::RParen {
                    self.parse_arglist_contents(PySyntaxKind::RParen);
                }
                self.expect(PySyntaxKind::RParen);
            }
            PySyntaxKind::LBracket => {
                self.bump();
                if self.peek_kind() != PySyntaxKind::RBracket {
                    self.parse_subscript();
                }
                self.expect(PySyntaxKind::RBracket);
            }
            _ => {
                self.bump(); // '.'
                self.expect(PySyntaxKind::Name);
            }
        }
        self.builder.finish_node();
    }

    fn parse_subscript(&mut self) {
        let cp = self.checkpoint();
        self.parse_subscript_item();
        if self.peek_kind() == PySyntaxKind::Comma {
            self.builder.start_node_at(cp, PySyntaxKind::Testlist);
            while self.peek_kind() == PySyntaxKind::Comma {
                self.bump();
                if self.peek_kind() == PySyntaxKind::RBracket {
                    break;
                }
                self.parse_subscript_item();
            }
            self.builder.finish_node();
        }
    }

    fn parse_subscript_item(&mut self) {
        let cp = self.checkpoint();
        if self.peek_kind() != PySyntaxKind::Colon {
            self.parse_test();
        }
        if self.peek_kind() == PySyntaxKind::Colon {
            self.builder.start_node_at(cp, PySyntaxKind::Subscript);
            while self.peek_kind() == PySyntaxKind::Colon {
                self.bump();
                if self.at_expr_start() {
                    self.parse_test();
                }
            }
            self.builder.finish_node();
        }
    }

    fn parse_atom(&mut self) {
        match self.peek_kind() {
            PySyntaxKind::Name | PySyntaxKind::Number => self.bump(),
            PySyntaxKind::String => {
                // Adjacent strings concatenate into one atom
                let cp = self.checkpoint();
                self.bump();
                if self.peek_kind() == PySyntaxKind::String {
                    self.builder.start_node_at(cp, PySyntaxKind::Atom);
                    while self.peek_kind() == PySyntaxKind::String {
                        self.bump();
                    }
                    self.builder.finish_node();
                }
            }
            PySyntaxKind::LParen => {
                self.start(PySyntaxKind::Atom);
                self.bump();
                if self.peek_kind() != PySyntaxKind::RParen {
                    self.parse_testlist_gexp();
                }
                self.expect(PySyntaxKind::RParen);
                self.builder.finish_node();
            }
            PySyntaxKind::LBracket => {
                self.start(PySyntaxKind::Atom);
                self.bump();
                if self.peek_kind() != PySyntaxKind::RBracket {
                    self.parse_listmaker();
                }
                self.expect(PySyntaxKind::RBracket);
                self.builder.finish_node();
            }
            PySyntaxKind::LBrace => {
                self.start(PySyntaxKind::Atom);
                self.bump();
                if self.peek_kind() != PySyntaxKind::RBrace {
                    self.parse_dictsetmaker();
                }
                self.expect(PySyntaxKind::RBrace);
                self.builder.finish_node();
            }
            _ => {
                self.error_here("expected expression");
                self.builder.token(PySyntaxKind::Error, "");
            }
        }
    }

    /// Contents of parentheses: a single expression (collapsed), a tuple, or
    /// a generator expression
    fn parse_testlist_gexp(&mut self) {
        let cp = self.checkpoint();
        self.parse_test();
        match self.peek_kind() {
            PySyntaxKind::ForKw => {
                self.builder.start_node_at(cp, PySyntaxKind::TestlistGexp);
                self.parse_comp_for();
                self.builder.finish_node();
            }
            PySyntaxKind::Comma => {
                self.builder.start_node_at(cp, PySyntaxKind::TestlistGexp);
                while self.peek_kind() == PySyntaxKind::Comma {
                    self.bump();
                    if self.at_expr_start() {
                        self.parse_test();
                    } else {
                        break;
                    }
                }
                self.builder.finish_node();
            }
            _ => {}
        }
    }

    /// Contents of square brackets: list display or list comprehension
    fn parse_listmaker(&mut self) {
        let cp = self.checkpoint();
        self.parse_test();
        match self.peek_kind() {
            PySyntaxKind::ForKw => {
                self.builder.start_node_at(cp, PySyntaxKind::Listmaker);
                self.parse_comp_for();
                self.builder.finish_node();
            }
            PySyntaxKind::Comma => {
                self.builder.start_node_at(cp, PySyntaxKind::Listmaker);
                while self.peek_kind() == PySyntaxKind::Comma {
                    self.bump();
                    if self.at_expr_start() {
                        self.parse_test();
                    } else {
                        break;
                    }
                }
                self.builder.finish_node();
            }
            _ => {}
        }
    }

    /// Contents of braces: dict/set display or comprehension
    fn parse_dictsetmaker(&mut self) {
        let cp = self.checkpoint();
        self.parse_test();
        if self.peek_kind() == PySyntaxKind::Colon {
            // dict forms
            self.builder.start_node_at(cp, PySyntaxKind::DictSetMaker);
            self.bump();
            self.parse_test();
            if self.peek_kind() == PySyntaxKind::ForKw {
                self.parse_comp_for();
            } else {
                while self.peek_kind() == PySyntaxKind::Comma {
                    self.bump();
                    if !self.at_expr_start() {
                        break;
                    }
                    self.parse_test();
                    self.expect(PySyntaxKind::Colon);
                    self.parse_test();
                }
            }
            self.builder.finish_node();
        } else {
            // set forms
            match self.peek_kind() {
                PySyntaxKind::ForKw => {
                    self.builder.start_node_at(cp, PySyntaxKind::DictSetMaker);
                    self.parse_comp_for();
                    self.builder.finish_node();
                }
                PySyntaxKind::Comma => {
                    self.builder.start_node_at(cp, PySyntaxKind::DictSetMaker);
                    while self.peek_kind() == PySyntaxKind::Comma {
                        self.bump();
                        if self.at_expr_start() {
                            self.parse_test();
                        } else {
                            break;
                        }
                    }
                    self.builder.finish_node();
                }
                _ => {}
            }
        }
    }

    /// comp_for: 'for' exprlist 'in' or_test [comp_iter]
    fn parse_comp_for(&mut self) {
        self.start(PySyntaxKind::CompFor);
        self.bump(); // for
        self.parse_exprlist();
        self.expect(PySyntaxKind::InKw);
        self.parse_or_test();
        self.parse_comp_iter();
        self.builder.finish_node();
    }

    /// comp_if: 'if' or_test [comp_iter]
    fn parse_comp_if(&mut self) {
        self.start(PySyntaxKind::CompIf);
        self.bump(); // if
        self.parse_or_test();
        self.parse_comp_iter();
        self.builder.finish_node();
    }

    fn parse_comp_iter(&mut self) {
        match self.peek_kind() {
            PySyntaxKind::ForKw => self.parse_comp_for(),
            PySyntaxKind::IfKw => self.parse_comp_if(),
            _ => {}
        }
    }

    /// Call arguments, lambda parameters, and class bases: an `arglist`
    /// node when there is more than one argument; a lone positional
    /// argument collapses to its expression
    fn parse_arglist_contents(&mut self, closing: PySyntaxKind) {
        let cp = self.checkpoint();
        self.parse_argument();
        if self.peek_kind() == PySyntaxKind::Comma {
            self.builder.start_node_at(cp, PySyntaxKind::Arglist);
            while self.peek_kind() == PySyntaxKind::Comma {
                self.bump();
                if self.peek_kind() == closing || self.at_end() {
                    break;
                }
                self.parse_argument();
            }
            self.builder.finish_node();
        }
    }

    /// argument: test | test '=' test | test comp_for | '*' test | '**' test
    fn parse_argument(&mut self) {
        if matches!(
            self.peek_kind(),
            PySyntaxKind::Star | PySyntaxKind::DoubleStar
        ) {
            self.start(PySyntaxKind::Argument);
            self.bump();
            if self.at_expr_start() {
                self.parse_test();
            }
            self.builder.finish_node();
            return;
        }
        let cp = self.checkpoint();
        self.parse_test();
        match self.peek_kind() {
            PySyntaxKind::Assign => {
                self.builder.start_node_at(cp, PySyntaxKind::Argument);
                self.bump();
                self.parse_test();
                self.builder.finish_node();
            }
            PySyntaxKind::ForKw => {
                self.builder.start_node_at(cp, PySyntaxKind::Argument);
                self.parse_comp_for();
                self.builder.finish_node();
            }
            _ => {}
        }
    }

    fn parse_parameters(&mut self) {
        self.start(PySyntaxKind::Parameters);
        self.expect(PySyntaxKind::LParen);
        if self.peek_kind() != PySyntaxKind::RParen {
            self.parse_arglist_contents(PySyntaxKind::RParen);
        }
        self.expect(PySyntaxKind::RParen);
        self.builder.finish_node();
    }

    // ---- helpers ----

    fn at_end(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .all(|t| t.kind.is_trivia())
    }

    /// Kind of the next non-trivia token
    fn peek_kind(&self) -> PySyntaxKind {
        self.peek_nth_kind(0)
    }

    /// Kind of the n-th non-trivia token ahead
    fn peek_nth_kind(&self, n: usize) -> PySyntaxKind {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map(|t| t.kind)
            .unwrap_or(PySyntaxKind::Eof)
    }

    /// Byte offset of the next non-trivia token (or end of input)
    fn peek_offset(&self) -> usize {
        self.tokens[self.pos..]
            .iter()
            .find(|t| !t.kind.is_trivia())
            .map(|t| t.span.start)
            .unwrap_or_else(|| self.tokens.last().map(|t| t.span.end).unwrap_or(0))
    }

    /// True at a logical line boundary: end of input, a hard newline in the
    /// pending trivia, or a semicolon. Newlines swallowed by a backslash
    /// continuation are part of the continuation token and do not count.
    fn at_line_end(&self) -> bool {
        for tok in &self.tokens[self.pos..] {
            if tok.kind == PySyntaxKind::Newline {
                return true;
            }
            if !tok.kind.is_trivia() {
                return tok.kind == PySyntaxKind::Semicolon;
            }
        }
        true
    }

    /// True when the next token can begin an expression
    fn at_expr_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            PySyntaxKind::Name
                | PySyntaxKind::Number
                | PySyntaxKind::String
                | PySyntaxKind::LParen
                | PySyntaxKind::LBracket
                | PySyntaxKind::LBrace
                | PySyntaxKind::NotKw
                | PySyntaxKind::LambdaKw
                | PySyntaxKind::Plus
                | PySyntaxKind::Minus
                | PySyntaxKind::Tilde
                | PySyntaxKind::Star
                | PySyntaxKind::DoubleStar
        )
    }

    /// Emit pending trivia into the currently open node
    fn flush_trivia(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.builder.add_token(&self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    /// Flush pending trivia, then open a node, so the node's span starts at
    /// its first non-trivia token
    fn start(&mut self, kind: PySyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    /// Flush pending trivia, then take a checkpoint for possible wrapping
    fn checkpoint(&mut self) -> rowan::Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    /// Consume the next non-trivia token (flushing trivia before it)
    fn bump(&mut self) {
        self.flush_trivia();
        if self.pos < self.tokens.len() {
            self.builder.add_token(&self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: PySyntaxKind) {
        if self.peek_kind() == kind {
            self.bump();
        } else {
            self.errors.push(ParseError::new(
                format!("expected {kind}, found {}", self.peek_kind()),
                self.peek_offset(),
            ));
            self.builder.token(PySyntaxKind::Error, "");
        }
    }

    fn error_here(&mut self, message: impl Into<String>) {
        self.errors
            .push(ParseError::new(message, self.peek_offset()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> PySyntaxNode {
        match parse_module(source) {
            Ok(tree) => tree,
            Err(e) => panic!("failed to parse {source:?}: {e}"),
        }
    }

    fn find(tree: &PySyntaxNode, kind: PySyntaxKind) -> PySyntaxNode {
        tree.descendants()
            .find(|n| n.kind() == kind)
            .unwrap_or_else(|| panic!("no {kind} node in {tree:#?}"))
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let sources = [
            "x = 1\n",
            "# leading comment\nif x:  # trailing\n    y = f( a , b )\n",
            "result = dict([(k, v) for k, v in items])\n",
            "val = {\n    'a': 1,\n    'b': 2,\n}\n",
            "total = (1 +\n         2)\n",
            "def f(a, b=1, *args, **kwargs):\n    return a\n",
            "s = 'one' \"two\"\n",
            "x = a[1:2, ::3]\n",
        ];
        for source in sources {
            let tree = parse_ok(source);
            assert_eq!(tree.text().to_string(), source, "round-trip of {source:?}");
        }
    }

    #[test]
    fn test_comparison_shape() {
        let tree = parse_ok("a == b\n");
        let cmp = find(&tree, PySyntaxKind::Comparison);
        let kids: Vec<_> = cmp
            .children_with_tokens()
            .filter(|el| !el.kind().is_trivia())
            .map(|el| el.kind())
            .collect();
        assert_eq!(
            kids,
            vec![PySyntaxKind::Name, PySyntaxKind::EqEq, PySyntaxKind::Name]
        );
    }

    #[test]
    fn test_bare_name_has_no_comparison_node() {
        let tree = parse_ok("a\n");
        assert!(
            tree.descendants()
                .all(|n| n.kind() != PySyntaxKind::Comparison)
        );
    }

    #[test]
    fn test_not_test_wraps_comparison() {
        let tree = parse_ok("not a == b\n");
        let not_test = find(&tree, PySyntaxKind::NotTest);
        assert!(
            not_test
                .children()
                .any(|n| n.kind() == PySyntaxKind::Comparison)
        );
    }

    #[test]
    fn test_two_word_comp_op() {
        let tree = parse_ok("a is not b\n");
        let op = find(&tree, PySyntaxKind::CompOp);
        assert_eq!(op.text().to_string(), "is not");

        let tree = parse_ok("a not in b\n");
        let op = find(&tree, PySyntaxKind::CompOp);
        assert_eq!(op.text().to_string(), "not in");
    }

    #[test]
    fn test_chained_comparison_is_one_node() {
        let tree = parse_ok("a == b == c\n");
        let cmp = find(&tree, PySyntaxKind::Comparison);
        let significant = cmp
            .children_with_tokens()
            .filter(|el| !el.kind().is_trivia())
            .count();
        assert_eq!(significant, 5);
    }

    #[test]
    fn test_call_structure() {
        let tree = parse_ok("dict([(k, v) for k, v in items])\n");
        let power = find(&tree, PySyntaxKind::Power);
        assert!(power.children().any(|n| n.kind() == PySyntaxKind::Trailer));
        let listmaker = find(&tree, PySyntaxKind::Listmaker);
        assert!(
            listmaker
                .children()
                .any(|n| n.kind() == PySyntaxKind::CompFor)
        );
        // the (k, v) element is an atom wrapping a testlist_gexp
        let gexp = find(&tree, PySyntaxKind::TestlistGexp);
        assert_eq!(gexp.text().to_string(), "k, v");
    }

    #[test]
    fn test_bare_generator_argument() {
        let tree = parse_ok("dict((k, v) for k, v in items)\n");
        let arg = find(&tree, PySyntaxKind::Argument);
        assert!(arg.children().any(|n| n.kind() == PySyntaxKind::CompFor));
    }

    #[test]
    fn test_comp_if_nests_in_comp_for() {
        let tree = parse_ok("[x for x in xs if x]\n");
        let comp_for = find(&tree, PySyntaxKind::CompFor);
        assert!(
            comp_for
                .children()
                .any(|n| n.kind() == PySyntaxKind::CompIf)
        );
    }

    #[test]
    fn test_single_paren_content_collapses() {
        // (x) is an atom with a plain Name inside: no testlist_gexp node
        let tree = parse_ok("(x)\n");
        let atom = find(&tree, PySyntaxKind::Atom);
        assert!(
            atom.children()
                .all(|n| n.kind() != PySyntaxKind::TestlistGexp)
        );
    }

    #[test]
    fn test_tuple_display_keeps_testlist_gexp() {
        let tree = parse_ok("a = (b, c)\n");
        find(&tree, PySyntaxKind::TestlistGexp);
    }

    #[test]
    fn test_assignment_makes_expr_stmt() {
        let tree = parse_ok("a = b\n");
        find(&tree, PySyntaxKind::ExprStmt);
        let tree = parse_ok("a\n");
        assert!(
            tree.descendants()
                .all(|n| n.kind() != PySyntaxKind::ExprStmt)
        );
    }

    #[test]
    fn test_return_statement() {
        let tree = parse_ok("return (x)\n");
        let ret = find(&tree, PySyntaxKind::ReturnStmt);
        assert!(ret.children().any(|n| n.kind() == PySyntaxKind::Atom));
    }

    #[test]
    fn test_compound_headers_with_flat_suites() {
        let tree = parse_ok("if a:\n    b = 1\nelse:\n    c = 2\n");
        find(&tree, PySyntaxKind::CondHeader);
        find(&tree, PySyntaxKind::BlockHeader);
        assert_eq!(
            tree.descendants()
                .filter(|n| n.kind() == PySyntaxKind::ExprStmt)
                .count(),
            2
        );
    }

    #[test]
    fn test_inline_suite() {
        parse_ok("if x: y = 1\n");
    }

    #[test]
    fn test_import_statements() {
        parse_ok("import os, sys\nfrom a.b import (c,\n    d)\nfrom x import y as z\n");
    }

    #[test]
    fn test_dict_comprehension_display() {
        // this is what the dict rule produces; it must stay parseable
        let tree = parse_ok("{k: v for k, v in items}\n");
        let maker = find(&tree, PySyntaxKind::DictSetMaker);
        assert!(maker.children().any(|n| n.kind() == PySyntaxKind::CompFor));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse_module("f(\n").is_err());
        assert!(parse_module("a ==\n").is_err());
        assert!(parse_module("a b\n").is_err());
        assert!(parse_module("return )\n").is_err());
    }

    #[test]
    fn test_error_location() {
        let err = parse_module("x = 1\ny ==\n").unwrap_err();
        match err {
            SweepError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("expected syntax error, got {other}"),
        }
    }

    #[test]
    fn test_two_statements_on_one_line_need_semicolon() {
        assert!(parse_module("a; b\n").is_ok());
        assert!(parse_module("a b\n").is_err());
    }
}
