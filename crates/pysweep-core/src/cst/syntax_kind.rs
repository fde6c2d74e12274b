//! Syntax kind enumeration for the Python-subset CST
//!
//! This module defines all possible node and token types in the syntax tree.

use std::fmt;

/// Syntax kind for Python-subset language elements
///
/// This enum represents all possible types of nodes and tokens in the CST.
/// It includes:
/// - Trivia (whitespace, comments, newlines, line continuations)
/// - Keywords the grammar treats specially
/// - Punctuation and operators
/// - Structural nodes (statements, expressions, comprehension clauses)
/// - Literals and identifiers
///
/// Node category names follow the grammar productions the rewrite rules are
/// written against (`comparison`, `not_test`, `comp_for`, ...), so a pattern
/// category maps 1:1 onto a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum PySyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Whitespace (spaces, tabs)
    Whitespace = 0,
    /// Line comment starting with #
    Comment = 1,
    /// Newline character (\n, \r\n or \r)
    Newline = 2,
    /// Backslash-newline line continuation
    LineContinuation = 3,

    // ==================
    // Keywords (10-49)
    // ==================
    /// "not" keyword
    NotKw = 10,
    /// "and" keyword
    AndKw = 11,
    /// "or" keyword
    OrKw = 12,
    /// "in" keyword
    InKw = 13,
    /// "is" keyword
    IsKw = 14,
    /// "for" keyword
    ForKw = 15,
    /// "if" keyword
    IfKw = 16,
    /// "else" keyword
    ElseKw = 17,
    /// "elif" keyword
    ElifKw = 18,
    /// "while" keyword
    WhileKw = 19,
    /// "return" keyword
    ReturnKw = 20,
    /// "def" keyword
    DefKw = 21,
    /// "class" keyword
    ClassKw = 22,
    /// "lambda" keyword
    LambdaKw = 23,
    /// "import" keyword
    ImportKw = 24,
    /// "from" keyword
    FromKw = 25,
    /// "as" keyword
    AsKw = 26,
    /// "with" keyword
    WithKw = 27,
    /// "try" keyword
    TryKw = 28,
    /// "except" keyword
    ExceptKw = 29,
    /// "finally" keyword
    FinallyKw = 30,
    /// "del" keyword
    DelKw = 31,
    /// "raise" keyword
    RaiseKw = 32,
    /// "assert" keyword
    AssertKw = 33,
    /// "global" keyword
    GlobalKw = 34,
    /// "nonlocal" keyword
    NonlocalKw = 35,
    /// "yield" keyword
    YieldKw = 36,

    // ==================
    // Punctuation & Operators (60-119)
    // ==================
    /// Left parenthesis "("
    LParen = 60,
    /// Right parenthesis ")"
    RParen = 61,
    /// Left bracket "["
    LBracket = 62,
    /// Right bracket "]"
    RBracket = 63,
    /// Left brace "{"
    LBrace = 64,
    /// Right brace "}"
    RBrace = 65,
    /// Comma ","
    Comma = 66,
    /// Colon ":"
    Colon = 67,
    /// Semicolon ";"
    Semicolon = 68,
    /// Dot "."
    Dot = 69,
    /// Arrow "->" (return annotation)
    Arrow = 70,
    /// At "@" (decorator, matrix multiply)
    At = 71,
    /// Assignment "="
    Assign = 72,
    /// Augmented assignment ("+=", "-=", "*=", ...)
    AugAssign = 73,
    /// Walrus ":="
    Walrus = 74,
    /// Equality "=="
    EqEq = 80,
    /// Inequality "!="
    NotEq = 81,
    /// Less than "<"
    Lt = 82,
    /// Greater than ">"
    Gt = 83,
    /// Less or equal "<="
    LtEq = 84,
    /// Greater or equal ">="
    GtEq = 85,
    /// Plus "+"
    Plus = 90,
    /// Minus "-"
    Minus = 91,
    /// Star "*"
    Star = 92,
    /// Double star "**"
    DoubleStar = 93,
    /// Slash "/"
    Slash = 94,
    /// Double slash "//"
    DoubleSlash = 95,
    /// Percent "%"
    Percent = 96,
    /// Ampersand "&"
    Amp = 97,
    /// Pipe "|"
    Pipe = 98,
    /// Caret "^"
    Caret = 99,
    /// Tilde "~"
    Tilde = 100,
    /// Left shift "<<"
    Shl = 101,
    /// Right shift ">>"
    Shr = 102,

    // ==================
    // Literals & Identifiers (130-149)
    // ==================
    /// Identifier (includes `None`, `True`, `pass`, ... - words the grammar
    /// does not treat specially)
    Name = 130,
    /// Numeric literal
    Number = 131,
    /// String literal (any prefix, single or triple quoted)
    String = 132,

    // ==================
    // Statement nodes (200-249)
    // ==================
    /// Root node: a flat sequence of statements
    Module = 200,
    /// Expression statement, including assignments
    ExprStmt = 210,
    /// "return [testlist]"
    ReturnStmt = 211,
    /// "del"/"raise"/"assert"/"global"/"nonlocal"/"yield" + operand list
    KeywordStmt = 212,
    /// "import ..." / "from ... import ..." (operands kept flat)
    ImportStmt = 213,
    /// "if"/"elif"/"while" header
    CondHeader = 214,
    /// "for target in iterable:" header
    ForHeader = 215,
    /// "def name(params):" header
    FuncDef = 216,
    /// "class name[(bases)]:" header
    ClassDef = 217,
    /// "with expr [as target]:" header
    WithHeader = 218,
    /// "else:"/"try:"/"finally:" header
    BlockHeader = 219,
    /// "except [expr [as name]]:" header
    ExceptHeader = 220,
    /// "@decorator" line
    Decorator = 221,

    // ==================
    // Expression nodes (250-319)
    // ==================
    /// Comma-separated expression list
    Testlist = 250,
    /// Conditional expression "a if c else b"
    Ternary = 251,
    /// "or" chain
    OrTest = 252,
    /// "and" chain
    AndTest = 253,
    /// "not" applied to a comparison or not_test
    NotTest = 254,
    /// Binary relational chain "a < b == c"
    Comparison = 255,
    /// Two-word comparison operator ("not in", "is not")
    CompOp = 256,
    /// Arithmetic/bitwise binary chain
    ArithExpr = 257,
    /// Unary "+x", "-x", "~x"
    Factor = 258,
    /// Primary with trailers: "f(x)", "a.b", "a[i]", "a ** b"
    Power = 259,
    /// Call/index/attribute trailer
    Trailer = 260,
    /// Bracketed or parenthesized display
    Atom = 261,
    /// Contents of "[...]": list display or list comprehension
    Listmaker = 262,
    /// Contents of "(...)": tuple or generator expression
    TestlistGexp = 263,
    /// Contents of "{...}": dict/set display or comprehension
    DictSetMaker = 264,
    /// Single call argument ("k=v", "*args", "x for x in y")
    Argument = 265,
    /// Call argument list
    Arglist = 266,
    /// Comprehension "for" clause
    CompFor = 267,
    /// Comprehension "if" clause
    CompIf = 268,
    /// Subscript content, possibly a slice
    Subscript = 269,
    /// "lambda [params]: body"
    Lambdef = 270,
    /// Function definition parameter list "(a, b=1, *args)"
    Parameters = 271,

    // ==================
    // Special (400+)
    // ==================
    /// Error node/token (for recovery)
    Error = 400,
    /// End of file
    Eof = 401,
}

impl PySyntaxKind {
    /// Check if this is a trivia kind (whitespace, comments, newlines)
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Comment | Self::Newline | Self::LineContinuation
        )
    }

    /// Check if this is a keyword
    pub const fn is_keyword(self) -> bool {
        (self as u16) >= 10 && (self as u16) < 50
    }

    /// Check if this is punctuation or an operator token
    pub const fn is_punct(self) -> bool {
        (self as u16) >= 60 && (self as u16) < 130
    }

    /// Check if this is a structural node
    pub const fn is_node(self) -> bool {
        (self as u16) >= 200 && (self as u16) < 400
    }

    /// Check if this is a single-token comparison operator
    pub const fn is_comparison_op(self) -> bool {
        matches!(
            self,
            Self::EqEq | Self::NotEq | Self::Lt | Self::Gt | Self::LtEq | Self::GtEq
        )
    }

    /// Map a keyword's source text to its kind
    pub fn keyword_kind(text: &str) -> Option<PySyntaxKind> {
        let kind = match text {
            "not" => Self::NotKw,
            "and" => Self::AndKw,
            "or" => Self::OrKw,
            "in" => Self::InKw,
            "is" => Self::IsKw,
            "for" => Self::ForKw,
            "if" => Self::IfKw,
            "else" => Self::ElseKw,
            "elif" => Self::ElifKw,
            "while" => Self::WhileKw,
            "return" => Self::ReturnKw,
            "def" => Self::DefKw,
            "class" => Self::ClassKw,
            "lambda" => Self::LambdaKw,
            "import" => Self::ImportKw,
            "from" => Self::FromKw,
            "as" => Self::AsKw,
            "with" => Self::WithKw,
            "try" => Self::TryKw,
            "except" => Self::ExceptKw,
            "finally" => Self::FinallyKw,
            "del" => Self::DelKw,
            "raise" => Self::RaiseKw,
            "assert" => Self::AssertKw,
            "global" => Self::GlobalKw,
            "nonlocal" => Self::NonlocalKw,
            "yield" => Self::YieldKw,
            _ => return None,
        };
        Some(kind)
    }

    /// The grammar-category name used by the pattern language, if any
    pub const fn category_name(self) -> Option<&'static str> {
        match self {
            Self::Module => Some("file_input"),
            Self::ExprStmt => Some("expr_stmt"),
            Self::ReturnStmt => Some("return_stmt"),
            Self::Testlist => Some("testlist"),
            Self::Ternary => Some("test"),
            Self::OrTest => Some("or_test"),
            Self::AndTest => Some("and_test"),
            Self::NotTest => Some("not_test"),
            Self::Comparison => Some("comparison"),
            Self::CompOp => Some("comp_op"),
            Self::ArithExpr => Some("arith_expr"),
            Self::Factor => Some("factor"),
            Self::Power => Some("power"),
            Self::Trailer => Some("trailer"),
            Self::Atom => Some("atom"),
            Self::Listmaker => Some("listmaker"),
            Self::TestlistGexp => Some("testlist_gexp"),
            Self::DictSetMaker => Some("dictsetmaker"),
            Self::Argument => Some("argument"),
            Self::Arglist => Some("arglist"),
            Self::CompFor => Some("comp_for"),
            Self::CompIf => Some("comp_if"),
            Self::Subscript => Some("subscript"),
            Self::Lambdef => Some("lambdef"),
            Self::Parameters => Some("parameters"),
            _ => None,
        }
    }

    /// Inverse of [`category_name`](Self::category_name)
    pub fn from_category_name(name: &str) -> Option<PySyntaxKind> {
        let kind = match name {
            "file_input" => Self::Module,
            "expr_stmt" => Self::ExprStmt,
            "return_stmt" => Self::ReturnStmt,
            "testlist" => Self::Testlist,
            "test" => Self::Ternary,
            "or_test" => Self::OrTest,
            "and_test" => Self::AndTest,
            "not_test" => Self::NotTest,
            "comparison" => Self::Comparison,
            "comp_op" => Self::CompOp,
            "arith_expr" => Self::ArithExpr,
            "factor" => Self::Factor,
            "power" => Self::Power,
            "trailer" => Self::Trailer,
            "atom" => Self::Atom,
            "listmaker" => Self::Listmaker,
            "testlist_gexp" => Self::TestlistGexp,
            "dictsetmaker" => Self::DictSetMaker,
            "argument" => Self::Argument,
            "arglist" => Self::Arglist,
            "comp_for" => Self::CompFor,
            "comp_if" => Self::CompIf,
            "subscript" => Self::Subscript,
            "lambdef" => Self::Lambdef,
            "parameters" => Self::Parameters,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for PySyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<PySyntaxKind> for rowan::SyntaxKind {
    fn from(kind: PySyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(PySyntaxKind::Whitespace.is_trivia());
        assert!(PySyntaxKind::Comment.is_trivia());
        assert!(PySyntaxKind::Newline.is_trivia());
        assert!(!PySyntaxKind::NotKw.is_trivia());
    }

    #[test]
    fn test_keyword_classification() {
        assert!(PySyntaxKind::NotKw.is_keyword());
        assert!(PySyntaxKind::ForKw.is_keyword());
        assert!(!PySyntaxKind::Name.is_keyword());
        assert!(!PySyntaxKind::Whitespace.is_keyword());
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(PySyntaxKind::keyword_kind("not"), Some(PySyntaxKind::NotKw));
        assert_eq!(PySyntaxKind::keyword_kind("in"), Some(PySyntaxKind::InKw));
        // None/True/pass are plain names in this grammar
        assert_eq!(PySyntaxKind::keyword_kind("None"), None);
        assert_eq!(PySyntaxKind::keyword_kind("pass"), None);
    }

    #[test]
    fn test_category_names_round_trip() {
        for kind in [
            PySyntaxKind::NotTest,
            PySyntaxKind::Comparison,
            PySyntaxKind::CompFor,
            PySyntaxKind::TestlistGexp,
            PySyntaxKind::Power,
        ] {
            let name = kind.category_name().unwrap();
            assert_eq!(PySyntaxKind::from_category_name(name), Some(kind));
        }
    }

    #[test]
    fn test_node_classification() {
        assert!(PySyntaxKind::Comparison.is_node());
        assert!(PySyntaxKind::Atom.is_node());
        assert!(!PySyntaxKind::Name.is_node());
    }
}
