//! Rowan language implementation for the Python-subset grammar
//!
//! This module implements the `rowan::Language` trait, which connects
//! our PySyntaxKind enum to Rowan's generic CST infrastructure.

use rowan::Language;

use super::PySyntaxKind;

/// Language implementation for the Python subset
///
/// This is a zero-sized type that implements `rowan::Language` to provide
/// the connection between our syntax kinds and Rowan's generic tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PyLanguage;

impl Language for PyLanguage {
    type Kind = PySyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match raw.0 {
            // Trivia
            0 => PySyntaxKind::Whitespace,
            1 => PySyntaxKind::Comment,
            2 => PySyntaxKind::Newline,
            3 => PySyntaxKind::LineContinuation,

            // Keywords (10-49)
            10 => PySyntaxKind::NotKw,
            11 => PySyntaxKind::AndKw,
            12 => PySyntaxKind::OrKw,
            13 => PySyntaxKind::InKw,
            14 => PySyntaxKind::IsKw,
            15 => PySyntaxKind::ForKw,
            16 => PySyntaxKind::IfKw,
            17 => PySyntaxKind::ElseKw,
            18 => PySyntaxKind::ElifKw,
            19 => PySyntaxKind::WhileKw,
            20 => PySyntaxKind::ReturnKw,
            21 => PySyntaxKind::DefKw,
            22 => PySyntaxKind::ClassKw,
            23 => PySyntaxKind::LambdaKw,
            24 => PySyntaxKind::ImportKw,
            25 => PySyntaxKind::FromKw,
            26 => PySyntaxKind::AsKw,
            27 => PySyntaxKind::WithKw,
            28 => PySyntaxKind::TryKw,
            29 => PySyntaxKind::ExceptKw,
            30 => PySyntaxKind::FinallyKw,
            31 => PySyntaxKind::DelKw,
            32 => PySyntaxKind::RaiseKw,
            33 => PySyntaxKind::AssertKw,
            34 => PySyntaxKind::GlobalKw,
            35 => PySyntaxKind::NonlocalKw,
            36 => PySyntaxKind::YieldKw,

            // Punctuation (60-79)
            60 => PySyntaxKind::LParen,
            61 => PySyntaxKind::RParen,
            62 => PySyntaxKind::LBracket,
            63 => PySyntaxKind::RBracket,
            64 => PySyntaxKind::LBrace,
            65 => PySyntaxKind::RBrace,
            66 => PySyntaxKind::Comma,
            67 => PySyntaxKind::Colon,
            68 => PySyntaxKind::Semicolon,
            69 => PySyntaxKind::Dot,
            70 => PySyntaxKind::Arrow,
            71 => PySyntaxKind::At,
            72 => PySyntaxKind::Assign,
            73 => PySyntaxKind::AugAssign,
            74 => PySyntaxKind::Walrus,

            // Comparison operators (80-89)
            80 => PySyntaxKind::EqEq,
            81 => PySyntaxKind::NotEq,
            82 => PySyntaxKind::Lt,
            83 => PySyntaxKind::Gt,
            84 => PySyntaxKind::LtEq,
            85 => PySyntaxKind::GtEq,

            // Arithmetic/bitwise operators (90-129)
            90 => PySyntaxKind::Plus,
            91 => PySyntaxKind::Minus,
            92 => PySyntaxKind::Star,
            93 => PySyntaxKind::DoubleStar,
            94 => PySyntaxKind::Slash,
            95 => PySyntaxKind::DoubleSlash,
            96 => PySyntaxKind::Percent,
            97 => PySyntaxKind::Amp,
            98 => PySyntaxKind::Pipe,
            99 => PySyntaxKind::Caret,
            100 => PySyntaxKind::Tilde,
            101 => PySyntaxKind::Shl,
            102 => PySyntaxKind::Shr,

            // Literals & identifiers (130-149)
            130 => PySyntaxKind::Name,
            131 => PySyntaxKind::Number,
            132 => PySyntaxKind::String,

            // Statement nodes (200-249)
            200 => PySyntaxKind::Module,
            210 => PySyntaxKind::ExprStmt,
            211 => PySyntaxKind::ReturnStmt,
            212 => PySyntaxKind::KeywordStmt,
            213 => PySyntaxKind::ImportStmt,
            214 => PySyntaxKind::CondHeader,
            215 => PySyntaxKind::ForHeader,
            216 => PySyntaxKind::FuncDef,
            217 => PySyntaxKind::ClassDef,
            218 => PySyntaxKind::WithHeader,
            219 => PySyntaxKind::BlockHeader,
            220 => PySyntaxKind::ExceptHeader,
            221 => PySyntaxKind::Decorator,

            // Expression nodes (250-319)
            250 => PySyntaxKind::Testlist,
            251 => PySyntaxKind::Ternary,
            252 => PySyntaxKind::OrTest,
            253 => PySyntaxKind::AndTest,
            254 => PySyntaxKind::NotTest,
            255 => PySyntaxKind::Comparison,
            256 => PySyntaxKind::CompOp,
            257 => PySyntaxKind::ArithExpr,
            258 => PySyntaxKind::Factor,
            259 => PySyntaxKind::Power,
            260 => PySyntaxKind::Trailer,
            261 => PySyntaxKind::Atom,
            262 => PySyntaxKind::Listmaker,
            263 => PySyntaxKind::TestlistGexp,
            264 => PySyntaxKind::DictSetMaker,
            265 => PySyntaxKind::Argument,
            266 => PySyntaxKind::Arglist,
            267 => PySyntaxKind::CompFor,
            268 => PySyntaxKind::CompIf,
            269 => PySyntaxKind::Subscript,
            270 => PySyntaxKind::Lambdef,
            271 => PySyntaxKind::Parameters,

            // Special
            401 => PySyntaxKind::Eof,
            _ => PySyntaxKind::Error,
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            PySyntaxKind::Whitespace,
            PySyntaxKind::NotKw,
            PySyntaxKind::EqEq,
            PySyntaxKind::Name,
            PySyntaxKind::Module,
            PySyntaxKind::Comparison,
            PySyntaxKind::CompFor,
            PySyntaxKind::Parameters,
            PySyntaxKind::Eof,
        ] {
            let raw = PyLanguage::kind_to_raw(kind);
            assert_eq!(PyLanguage::kind_from_raw(raw), kind);
        }
    }

    #[test]
    fn test_unknown_raw_maps_to_error() {
        assert_eq!(
            PyLanguage::kind_from_raw(rowan::SyntaxKind(9999)),
            PySyntaxKind::Error
        );
    }
}
